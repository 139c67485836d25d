//! Frame scheduling for animations.
//!
//! Animations never drive themselves: they ask a [`FrameScheduler`] to run a callback at the next
//! frame. The host picks the implementation. All callbacks scheduled before a frame run together
//! in that frame, in the order they were scheduled.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::LoopHandle;
use elastic_pane_config::{FrameSchedulerKind, Frames};

use crate::animation::Clock;
use crate::frame_clock::FrameClock;
use crate::utils::{get_monotonic_time, refresh_interval};

pub type FrameCallback = Box<dyn FnOnce()>;

pub trait FrameScheduler {
    /// Runs `callback` once, at the next frame.
    fn schedule(&self, callback: FrameCallback);
}

/// Callbacks waiting for the next frame.
#[derive(Default)]
struct FrameQueue {
    callbacks: RefCell<Vec<FrameCallback>>,
    frame_requested: Cell<bool>,
}

impl FrameQueue {
    /// Queues the callback and returns whether a frame must be requested for it.
    ///
    /// Returns `true` until a request succeeds, so a failed request is retried by the next push.
    fn push(&self, callback: FrameCallback) -> bool {
        self.callbacks.borrow_mut().push(callback);
        !self.frame_requested.replace(true)
    }

    /// Marks the frame request as failed. The callbacks stay queued.
    fn request_failed(&self) {
        self.frame_requested.set(false);
    }

    fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Runs the queued callbacks and returns how many ran.
    ///
    /// Callbacks scheduled while this runs are left for the following frame.
    fn run(&self) -> usize {
        self.frame_requested.set(false);
        let callbacks = self.callbacks.take();
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }
}

/// Frames paced by a fixed-interval calloop timer.
pub struct TimerFrameScheduler<D: 'static> {
    handle: LoopHandle<'static, D>,
    clock: Clock,
    interval: Duration,
    queue: Rc<FrameQueue>,
}

/// Frames aligned with the presentation times reported by the host.
///
/// The shared clock is set to the predicted presentation time for the duration of each frame, so
/// animations compute the state that will actually be on screen.
pub struct PresentationFrameScheduler<D: 'static> {
    handle: LoopHandle<'static, D>,
    clock: Clock,
    frame_clock: Rc<RefCell<FrameClock>>,
    queue: Rc<FrameQueue>,
}

/// Frames run on demand with [`ManualFrameScheduler::run_frame`].
///
/// Nothing touches the clock here, so the caller is in full control of time.
#[derive(Default, Clone)]
pub struct ManualFrameScheduler {
    queue: Rc<FrameQueue>,
}

fn insert_frame_timer<D: 'static>(
    handle: &LoopHandle<'static, D>,
    delay: Duration,
    queue: &Rc<FrameQueue>,
    mut on_frame: impl FnMut(&FrameQueue) + 'static,
) {
    let timer = Timer::from_duration(delay);
    let res = handle.insert_source(timer, {
        let queue = queue.clone();
        move |_, _, _| {
            on_frame(&queue);
            TimeoutAction::Drop
        }
    });

    if let Err(err) = res {
        warn!(
            "error inserting frame timer, {} callbacks wait for the next schedule: {}",
            queue.len(),
            err.error
        );
        queue.request_failed();
    }
}

impl<D: 'static> TimerFrameScheduler<D> {
    pub fn new(handle: LoopHandle<'static, D>, clock: Clock, interval: Duration) -> Self {
        Self {
            handle,
            clock,
            interval,
            queue: Rc::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl<D: 'static> FrameScheduler for TimerFrameScheduler<D> {
    fn schedule(&self, callback: FrameCallback) {
        if !self.queue.push(callback) {
            return;
        }

        let mut clock = self.clock.clone();
        insert_frame_timer(&self.handle, self.interval, &self.queue, move |queue| {
            let _span = tracy_client::span!("TimerFrameScheduler frame");

            clock.clear();
            let count = queue.run();
            // Reads between frames should see the real time.
            clock.clear();

            trace!("ran {count} frame callbacks");
        });
    }
}

impl<D: 'static> PresentationFrameScheduler<D> {
    pub fn new(handle: LoopHandle<'static, D>, clock: Clock, frame_clock: FrameClock) -> Self {
        Self {
            handle,
            clock,
            frame_clock: Rc::new(RefCell::new(frame_clock)),
            queue: Rc::default(),
        }
    }

    /// Records the time at which the host presented a frame.
    pub fn presented(&self, presentation_time: Duration) {
        self.frame_clock.borrow_mut().presented(presentation_time);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl<D: 'static> FrameScheduler for PresentationFrameScheduler<D> {
    fn schedule(&self, callback: FrameCallback) {
        if !self.queue.push(callback) {
            return;
        }

        let now = get_monotonic_time();
        let frame_clock = self.frame_clock.borrow();
        let mut target_time = frame_clock.next_presentation_time_after(now);
        if target_time <= now {
            // No presentation feedback yet, fall back to the refresh interval.
            let interval = frame_clock
                .refresh_interval()
                .unwrap_or_else(|| refresh_interval(60.));
            target_time = now + interval;
        }
        drop(frame_clock);

        let mut clock = self.clock.clone();
        insert_frame_timer(
            &self.handle,
            target_time.saturating_sub(now),
            &self.queue,
            move |queue| {
                let _span = tracy_client::span!("PresentationFrameScheduler frame");

                clock.set_unadjusted(target_time);
                let count = queue.run();
                clock.clear();

                trace!("ran {count} frame callbacks for {target_time:?}");
            },
        );
    }
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs every callback scheduled so far and returns how many ran.
    pub fn run_frame(&self) -> usize {
        self.queue.run()
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn schedule(&self, callback: FrameCallback) {
        self.queue.push(callback);
    }
}

impl<D: 'static> fmt::Debug for TimerFrameScheduler<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerFrameScheduler")
            .field("interval", &self.interval)
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl<D: 'static> fmt::Debug for PresentationFrameScheduler<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationFrameScheduler")
            .field("frame_clock", &*self.frame_clock.borrow())
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ManualFrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualFrameScheduler")
            .field("pending", &self.queue.len())
            .finish()
    }
}

/// Creates the frame scheduler selected in the config.
pub fn from_config<D: 'static>(
    config: &Frames,
    handle: LoopHandle<'static, D>,
    clock: Clock,
) -> Rc<dyn FrameScheduler> {
    let interval = refresh_interval(config.refresh_rate.0);
    debug!(
        "using {:?} frame scheduler at {} Hz",
        config.scheduler, config.refresh_rate.0
    );

    match config.scheduler {
        FrameSchedulerKind::Timer => Rc::new(TimerFrameScheduler::new(handle, clock, interval)),
        FrameSchedulerKind::Presentation => {
            let frame_clock = FrameClock::new(Some(interval));
            Rc::new(PresentationFrameScheduler::new(handle, clock, frame_clock))
        }
    }
}
