use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::frame_scheduler::FrameScheduler;

mod bezier;
pub use bezier::CubicBezier;

mod clock;
pub use clock::Clock;

mod easing;
pub use easing::{ease_out_back, ease_out_expo, linear, Curve, EaseFn, BACK_OVERSHOOT};

mod transition;
pub use transition::{MoveTo, Transition, TransitionDefaults};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    /// Created but not started yet.
    Idle,
    Running,
    /// Finished on its own.
    Done,
    Cancelled,
}

/// What an [`Animation`] does on every frame and when it stops.
pub struct AnimationCallbacks {
    tick: Box<dyn FnMut()>,
    done: Box<dyn FnMut() -> bool>,
    on_end: Box<dyn FnMut()>,
    on_cancel: Box<dyn FnMut()>,
}

/// Frame-driven loop calling `tick` until `done` reports completion.
///
/// This is a cheap handle; clones refer to the same animation. Frames scheduled before a
/// [`Animation::cancel`] still fire but do nothing.
#[derive(Clone)]
pub struct Animation {
    inner: Rc<Inner>,
}

struct Inner {
    state: Cell<AnimationState>,
    frames: Cell<u64>,
    scheduler: Rc<dyn FrameScheduler>,
    tick: RefCell<Box<dyn FnMut()>>,
    done: RefCell<Box<dyn FnMut() -> bool>>,
    on_end: RefCell<Box<dyn FnMut()>>,
    on_cancel: RefCell<Box<dyn FnMut()>>,
}

impl AnimationCallbacks {
    pub fn new(tick: impl FnMut() + 'static, done: impl FnMut() -> bool + 'static) -> Self {
        Self {
            tick: Box::new(tick),
            done: Box::new(done),
            on_end: Box::new(|| ()),
            on_cancel: Box::new(|| ()),
        }
    }

    /// Called once, after the frame on which `done` first returns `true`.
    pub fn on_end(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_end = Box::new(f);
        self
    }

    /// Called on every [`Animation::cancel`].
    pub fn on_cancel(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_cancel = Box::new(f);
        self
    }
}

impl Animation {
    pub fn new(scheduler: Rc<dyn FrameScheduler>, callbacks: AnimationCallbacks) -> Self {
        let AnimationCallbacks {
            tick,
            done,
            on_end,
            on_cancel,
        } = callbacks;

        Self {
            inner: Rc::new(Inner {
                state: Cell::new(AnimationState::Idle),
                frames: Cell::new(0),
                scheduler,
                tick: RefCell::new(tick),
                done: RefCell::new(done),
                on_end: RefCell::new(on_end),
                on_cancel: RefCell::new(on_cancel),
            }),
        }
    }

    pub fn state(&self) -> AnimationState {
        self.inner.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state() == AnimationState::Running
    }

    /// Number of frames this animation has ticked.
    pub fn frames(&self) -> u64 {
        self.inner.frames.get()
    }

    /// Starts ticking from the next frame.
    ///
    /// Only an idle animation can be started; finished and cancelled animations stay stopped.
    pub fn start(&self) {
        let state = self.state();
        if state != AnimationState::Idle {
            debug!("ignoring start of an animation in {state:?} state");
            return;
        }

        self.inner.state.set(AnimationState::Running);
        Inner::request_frame(&self.inner);
    }

    /// Stops the animation and calls the cancel callback.
    ///
    /// A finished animation stays [`AnimationState::Done`], but the callback is still called.
    pub fn cancel(&self) {
        match self.state() {
            AnimationState::Idle | AnimationState::Running => {
                self.inner.state.set(AnimationState::Cancelled);
                trace!("animation cancelled after {} frames", self.frames());
            }
            AnimationState::Done | AnimationState::Cancelled => (),
        }

        match self.inner.on_cancel.try_borrow_mut() {
            Ok(mut on_cancel) => on_cancel(),
            Err(_) => trace!("ignoring cancel from inside the cancel callback"),
        }
    }
}

impl Inner {
    fn request_frame(this: &Rc<Self>) {
        let inner = this.clone();
        this.scheduler.schedule(Box::new(move || inner.frame()));
    }

    fn frame(self: Rc<Self>) {
        if self.state.get() != AnimationState::Running {
            return;
        }

        let _span = tracy_client::span!("Animation::frame");

        self.frames.set(self.frames.get() + 1);
        (self.tick.borrow_mut())();

        // The tick may have cancelled us.
        if self.state.get() != AnimationState::Running {
            return;
        }

        if (self.done.borrow_mut())() {
            self.state.set(AnimationState::Done);
            trace!("animation done after {} frames", self.frames.get());
            (self.on_end.borrow_mut())();
        } else {
            Self::request_frame(&self);
        }
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("state", &self.state())
            .field("frames", &self.frames())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_scheduler::ManualFrameScheduler;

    struct Counters {
        ticks: Rc<Cell<u32>>,
        ends: Rc<Cell<u32>>,
        cancels: Rc<Cell<u32>>,
    }

    fn counting(scheduler: &ManualFrameScheduler, frames: u32) -> (Animation, Counters) {
        let ticks = Rc::new(Cell::new(0));
        let ends = Rc::new(Cell::new(0));
        let cancels = Rc::new(Cell::new(0));

        let callbacks = AnimationCallbacks::new(
            {
                let ticks = ticks.clone();
                move || ticks.set(ticks.get() + 1)
            },
            {
                let ticks = ticks.clone();
                move || ticks.get() >= frames
            },
        )
        .on_end({
            let ends = ends.clone();
            move || ends.set(ends.get() + 1)
        })
        .on_cancel({
            let cancels = cancels.clone();
            move || cancels.set(cancels.get() + 1)
        });

        let animation = Animation::new(Rc::new(scheduler.clone()), callbacks);
        let counters = Counters {
            ticks,
            ends,
            cancels,
        };
        (animation, counters)
    }

    #[test]
    fn ticks_until_done() {
        let scheduler = ManualFrameScheduler::new();
        let (animation, c) = counting(&scheduler, 3);
        assert_eq!(animation.state(), AnimationState::Idle);

        animation.start();
        assert!(animation.is_running());
        assert_eq!(c.ticks.get(), 0);

        while scheduler.run_frame() > 0 {}

        assert_eq!(c.ticks.get(), 3);
        assert_eq!(c.ends.get(), 1);
        assert_eq!(c.cancels.get(), 0);
        assert_eq!(animation.frames(), 3);
        assert_eq!(animation.state(), AnimationState::Done);
    }

    #[test]
    fn one_tick_per_frame() {
        let scheduler = ManualFrameScheduler::new();
        let (animation, c) = counting(&scheduler, 10);
        animation.start();

        scheduler.run_frame();
        scheduler.run_frame();
        assert_eq!(c.ticks.get(), 2);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn cancel_before_first_frame_never_ticks() {
        let scheduler = ManualFrameScheduler::new();
        let (animation, c) = counting(&scheduler, 3);

        animation.start();
        animation.cancel();
        assert_eq!(c.cancels.get(), 1);

        // The already scheduled frame still fires.
        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(c.ticks.get(), 0);
        assert_eq!(c.ends.get(), 0);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(animation.state(), AnimationState::Cancelled);
    }

    #[test]
    fn cancel_mid_way_stops_ticking() {
        let scheduler = ManualFrameScheduler::new();
        let (animation, c) = counting(&scheduler, 5);

        animation.start();
        scheduler.run_frame();
        animation.cancel();
        while scheduler.run_frame() > 0 {}

        assert_eq!(c.ticks.get(), 1);
        assert_eq!(c.ends.get(), 0);
        assert_eq!(c.cancels.get(), 1);
    }

    #[test]
    fn cancel_after_done_only_calls_callback() {
        let scheduler = ManualFrameScheduler::new();
        let (animation, c) = counting(&scheduler, 1);

        animation.start();
        scheduler.run_frame();
        assert_eq!(animation.state(), AnimationState::Done);

        animation.cancel();
        animation.cancel();
        assert_eq!(animation.state(), AnimationState::Done);
        assert_eq!(c.cancels.get(), 2);
        assert_eq!(c.ends.get(), 1);
    }

    #[test]
    fn cancelled_animation_cannot_restart() {
        let scheduler = ManualFrameScheduler::new();
        let (animation, c) = counting(&scheduler, 3);

        animation.cancel();
        animation.start();
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(animation.state(), AnimationState::Cancelled);
        assert_eq!(c.ticks.get(), 0);
    }

    #[test]
    fn start_twice_schedules_once() {
        let scheduler = ManualFrameScheduler::new();
        let (animation, c) = counting(&scheduler, 3);

        animation.start();
        animation.start();
        assert_eq!(scheduler.pending(), 1);

        scheduler.run_frame();
        assert_eq!(c.ticks.get(), 1);
    }

    #[test]
    fn done_on_first_frame() {
        let scheduler = ManualFrameScheduler::new();
        let (animation, c) = counting(&scheduler, 0);

        animation.start();
        scheduler.run_frame();
        assert_eq!(c.ticks.get(), 1);
        assert_eq!(c.ends.get(), 1);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(animation.state(), AnimationState::Done);
    }

    #[test]
    fn tick_can_cancel() {
        let scheduler = ManualFrameScheduler::new();
        let cancels = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Animation>>> = Rc::default();

        let callbacks = AnimationCallbacks::new(
            {
                let slot = slot.clone();
                move || {
                    if let Some(animation) = &*slot.borrow() {
                        animation.cancel();
                    }
                }
            },
            || false,
        )
        .on_cancel({
            let cancels = cancels.clone();
            move || cancels.set(cancels.get() + 1)
        });

        let animation = Animation::new(Rc::new(scheduler.clone()), callbacks);
        *slot.borrow_mut() = Some(animation.clone());

        animation.start();
        scheduler.run_frame();
        assert_eq!(cancels.get(), 1);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(animation.state(), AnimationState::Cancelled);

        // Break the cycle.
        slot.borrow_mut().take();
    }
}
