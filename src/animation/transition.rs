use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::{Animation, AnimationCallbacks, Clock, Curve};
use crate::frame_scheduler::FrameScheduler;
use crate::movable::{Axis, SharedMovable};

type Hook = Rc<RefCell<Option<Box<dyn FnMut()>>>>;

/// Duration and curve used by moves that don't set their own.
#[derive(Debug, Clone, Copy)]
pub struct TransitionDefaults {
    pub duration: Duration,
    pub curve: Curve,
    /// Makes every move complete on its first frame.
    pub off: bool,
}

/// A single move request.
#[derive(Debug, Clone, Copy)]
pub struct MoveTo {
    pub location: f64,
    pub duration: Option<Duration>,
    pub ease: Option<Curve>,
}

/// Animates one axis of a movable to a target position.
pub struct Transition {
    movable: SharedMovable,
    axis: Axis,
    clock: Clock,
    scheduler: Rc<dyn FrameScheduler>,
    defaults: TransitionDefaults,
    on_end: Hook,
    on_cancel: Hook,
    current: Option<CurrentMove>,
}

struct CurrentMove {
    animation: Animation,
    motion: Motion,
    /// Elapsed time as of the last tick.
    ticked_at: Rc<Cell<Option<Duration>>>,
}

/// Timing of one move, fixed when the move starts.
#[derive(Debug, Clone, Copy)]
struct Motion {
    initial: f64,
    delta: f64,
    duration: Duration,
    start_time: Duration,
    curve: Curve,
}

impl Default for TransitionDefaults {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            curve: Curve::EaseOutQuad,
            off: false,
        }
    }
}

impl From<elastic_pane_config::TransitionAnim> for TransitionDefaults {
    fn from(value: elastic_pane_config::TransitionAnim) -> Self {
        Self {
            duration: Duration::from_millis(u64::from(value.duration_ms)),
            curve: Curve::from(value.curve),
            off: value.off,
        }
    }
}

impl MoveTo {
    pub fn new(location: f64) -> Self {
        Self {
            location,
            duration: None,
            ease: None,
        }
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn ease(mut self, curve: Curve) -> Self {
        self.ease = Some(curve);
        self
    }
}

impl Motion {
    fn time_passed(&self, clock: &Clock) -> Duration {
        clock
            .now()
            .saturating_sub(self.start_time)
            .min(self.duration)
    }

    fn is_done(&self, clock: &Clock) -> bool {
        clock.should_complete_instantly() || self.time_passed(clock) >= self.duration
    }

    fn value(&self, clock: &Clock) -> f64 {
        if clock.should_complete_instantly() {
            return self.initial + self.delta;
        }

        self.curve.ease(
            as_millis_f64(self.time_passed(clock)),
            self.initial,
            self.delta,
            as_millis_f64(self.duration),
        )
    }
}

fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.
}

fn call_hook(hook: &Hook) {
    if let Some(f) = hook.borrow_mut().as_mut() {
        f();
    }
}

impl Transition {
    pub fn new(
        movable: SharedMovable,
        axis: Axis,
        clock: Clock,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> Self {
        Self::with_defaults(movable, axis, clock, scheduler, TransitionDefaults::default())
    }

    pub fn with_defaults(
        movable: SharedMovable,
        axis: Axis,
        clock: Clock,
        scheduler: Rc<dyn FrameScheduler>,
        defaults: TransitionDefaults,
    ) -> Self {
        Self {
            movable,
            axis,
            clock,
            scheduler,
            defaults,
            on_end: Rc::default(),
            on_cancel: Rc::default(),
            current: None,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn defaults(&self) -> TransitionDefaults {
        self.defaults
    }

    /// Sets the callback for moves that reach their target.
    pub fn on_end(&mut self, f: impl FnMut() + 'static) {
        *self.on_end.borrow_mut() = Some(Box::new(f));
    }

    /// Sets the callback for [`Transition::cancel`], including the implicit cancel when a move
    /// replaces a running one.
    pub fn on_cancel(&mut self, f: impl FnMut() + 'static) {
        *self.on_cancel.borrow_mut() = Some(Box::new(f));
    }

    /// Starts moving the axis from its current position to `options.location`.
    ///
    /// A move that is still running is cancelled first. The position is written on every frame
    /// from the next one on, and the last frame writes exactly `options.location`.
    pub fn move_to(&mut self, options: MoveTo) {
        let _span = tracy_client::span!("Transition::move_to");

        if let Some(current) = &self.current {
            if current.animation.is_running() {
                debug!("{} transition replaced while running", self.axis);
                current.animation.cancel();
            }
        }

        let initial = self.movable.borrow().position(self.axis);
        let mut duration = options.duration.unwrap_or(self.defaults.duration);
        if self.defaults.off {
            duration = Duration::ZERO;
        }

        let motion = Motion {
            initial,
            delta: options.location - initial,
            duration,
            start_time: self.clock.now(),
            curve: options.ease.unwrap_or(self.defaults.curve),
        };

        trace!(
            "{} transition from {} to {} over {:?}",
            self.axis,
            initial,
            options.location,
            duration
        );

        let ticked_at = Rc::new(Cell::new(None));
        let tick = {
            let movable = self.movable.clone();
            let clock = self.clock.clone();
            let axis = self.axis;
            let ticked_at = ticked_at.clone();
            move || {
                ticked_at.set(Some(motion.time_passed(&clock)));
                let value = motion.value(&clock);
                movable.borrow_mut().move_axis(axis, value);
            }
        };
        let done = {
            let clock = self.clock.clone();
            move || motion.is_done(&clock)
        };

        let on_end = self.on_end.clone();
        let on_cancel = self.on_cancel.clone();
        let callbacks = AnimationCallbacks::new(tick, done)
            .on_end(move || call_hook(&on_end))
            .on_cancel(move || call_hook(&on_cancel));

        let animation = Animation::new(self.scheduler.clone(), callbacks);
        animation.start();
        self.current = Some(CurrentMove {
            animation,
            motion,
            ticked_at,
        });
    }

    /// Stops the current move where it is and calls the cancel callback.
    ///
    /// Cancelling a finished move, or when there was no move at all, only calls the callback.
    pub fn cancel(&self) {
        match &self.current {
            Some(current) => current.animation.cancel(),
            None => call_hook(&self.on_cancel),
        }
    }

    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| current.animation.is_running())
    }

    /// Time elapsed in the current move, capped at its duration.
    pub fn time_passed(&self) -> Option<Duration> {
        let current = self.current.as_ref()?;
        Some(current.motion.time_passed(&self.clock))
    }

    /// Elapsed time in the current move as seen by its most recent frame.
    ///
    /// Unlike [`Transition::time_passed`], this does not read the clock, so it stays stable
    /// between frames. `None` until the first frame of the move.
    pub fn last_frame_time(&self) -> Option<Duration> {
        self.current.as_ref()?.ticked_at.get()
    }

    /// Returns whether the current move has used up its duration.
    ///
    /// Also `true` when no move was ever started.
    pub fn done(&self) -> bool {
        self.current
            .as_ref()
            .map_or(true, |current| current.motion.is_done(&self.clock))
    }

    /// Number of frames the current move has ticked.
    pub fn frames(&self) -> u64 {
        self.current
            .as_ref()
            .map_or(0, |current| current.animation.frames())
    }

    /// Target of the most recent move.
    pub fn target(&self) -> Option<f64> {
        let motion = &self.current.as_ref()?.motion;
        Some(motion.initial + motion.delta)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("axis", &self.axis)
            .field("defaults", &self.defaults)
            .field("motion", &self.current.as_ref().map(|c| c.motion))
            .field("animation", &self.current.as_ref().map(|c| &c.animation))
            .finish_non_exhaustive()
    }
}
