use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::utils::get_monotonic_time;

/// Shareable frame clock used by transitions to measure elapsed time.
///
/// The clock reads the monotonic time once and keeps returning it until cleared with
/// [`Clock::clear`]. Frame schedulers clear it at the start of every frame, so all animations
/// ticking in the same frame observe the same time.
///
/// The clock can also run at a different rate than real time, which is how animation slowdown
/// is implemented.
#[derive(Debug, Default, Clone)]
pub struct Clock {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Debug)]
struct Inner {
    /// Real time fetched for the current frame, if any.
    fetched: Option<Duration>,
    /// Time as seen by the animations, advancing at `rate`.
    current_time: Duration,
    /// Real time at the moment `current_time` was last advanced.
    last_seen_time: Duration,
    rate: f64,
    complete_instantly: bool,
}

impl Clock {
    /// Creates a frozen clock at the given time.
    ///
    /// The time only changes through [`Clock::set_unadjusted`].
    pub fn with_time(time: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::new(Some(time)))),
        }
    }

    /// Returns the current time, adjusted for the clock rate.
    pub fn now(&self) -> Duration {
        self.inner.borrow_mut().now()
    }

    /// Returns the underlying time not adjusted for rate change.
    pub fn now_unadjusted(&self) -> Duration {
        self.inner.borrow_mut().fetch()
    }

    /// Sets the unadjusted clock time.
    pub fn set_unadjusted(&mut self, time: Duration) {
        self.inner.borrow_mut().fetched = Some(time);
    }

    /// Clears the stored time so it's re-fetched again next.
    pub fn clear(&mut self) {
        self.inner.borrow_mut().fetched = None;
    }

    pub fn rate(&self) -> f64 {
        self.inner.borrow().rate
    }

    /// Sets the clock rate, clamped to `0..=1000`.
    pub fn set_rate(&mut self, rate: f64) {
        self.inner.borrow_mut().rate = rate.clamp(0., 1000.);
    }

    /// Returns whether transitions should jump straight to their end.
    pub fn should_complete_instantly(&self) -> bool {
        self.inner.borrow().complete_instantly
    }

    pub fn set_complete_instantly(&mut self, value: bool) {
        self.inner.borrow_mut().complete_instantly = value;
    }

    /// Applies the animation settings from the config.
    pub fn apply_config(&mut self, config: &elastic_pane_config::Animations) {
        let slowdown = config.slowdown.0;
        self.set_complete_instantly(config.off || slowdown == 0.);
        if slowdown > 0. {
            self.set_rate(1. / slowdown);
        }
    }
}

impl PartialEq for Clock {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Clock {}

impl Inner {
    fn new(fetched: Option<Duration>) -> Self {
        let mut rv = Self {
            fetched,
            current_time: Duration::ZERO,
            last_seen_time: Duration::ZERO,
            rate: 1.,
            complete_instantly: false,
        };

        let time = rv.fetch();
        rv.current_time = time;
        rv.last_seen_time = time;
        rv
    }

    fn fetch(&mut self) -> Duration {
        *self.fetched.get_or_insert_with(get_monotonic_time)
    }

    fn now(&mut self) -> Duration {
        let time = self.fetch();

        if self.last_seen_time == time {
            return self.current_time;
        }

        // Real time can also appear to go back, e.g. when a test rewinds a frozen clock.
        if self.last_seen_time < time {
            let delta = (time - self.last_seen_time).mul_f64(self.rate);
            self.current_time = self.current_time.saturating_add(delta);
        } else {
            let delta = (self.last_seen_time - time).mul_f64(self.rate);
            self.current_time = self.current_time.saturating_sub(delta);
        }

        self.last_seen_time = time;
        self.current_time
    }
}

impl Default for Inner {
    fn default() -> Self {
        Self::new(None)
    }
}
