//! Headless pane session: a pane over fixed extents, driven by scripted drags and an optional
//! transition running on a real event loop.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context as _};
use calloop::EventLoop;
use elastic_pane_config::Config;
use serde::Serialize;

use crate::animation::{Clock, MoveTo, Transition, TransitionDefaults};
use crate::cli::SimulateArgs;
use crate::dimension::{Extents, PaneDimension, PaneDimensions, ViewportChange, ViewportEvents};
use crate::frame_scheduler;
use crate::movable::{Axis, Translation};
use crate::pane::{DragEvent, DragEvents, Pane, PaneOptions};

/// Upper bound on waiting for a single frame.
const FRAME_TIMEOUT: Duration = Duration::from_secs(1);

/// Consecutive frame timeouts after which a running transition counts as stalled.
const MAX_MISSED_FRAMES: u32 = 3;

#[derive(Debug, Serialize)]
pub struct Report {
    pub dimensions: Vec<DimensionReport>,
    pub steps: Vec<Step>,
    pub position: Translation,
}

#[derive(Debug, Serialize)]
pub struct DimensionReport {
    pub axis: Axis,
    pub size: f64,
    pub total: f64,
    pub min: f64,
    pub max: f64,
    pub present: f64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Step {
    Drag {
        dx: f64,
        dy: f64,
        handled: bool,
        position: Translation,
    },
    Frame {
        time_ms: f64,
        position: Translation,
    },
}

impl From<&PaneDimension> for DimensionReport {
    fn from(dim: &PaneDimension) -> Self {
        Self {
            axis: dim.axis(),
            size: dim.size(),
            total: dim.total(),
            min: dim.min(),
            max: dim.max(),
            present: dim.present(),
        }
    }
}

pub fn run(args: &SimulateArgs, config: &Config) -> anyhow::Result<Report> {
    let _span = tracy_client::span!("simulate::run");

    let geometry = Rc::new(Extents::new(args.container, args.content));
    let viewport = ViewportEvents::new();
    let dimensions = PaneDimensions::new(geometry, &viewport);
    viewport.emit(&ViewportChange::Resize);

    let target = Translation::default().shared();
    let drag = DragEvents::new();
    let pane = Pane::new(
        dimensions,
        target.clone(),
        &drag,
        PaneOptions::from(config.pane),
    );

    let mut steps = Vec::new();
    for &(dx, dy) in &args.drags {
        let event = DragEvent::moved(dx, dy);
        drag.emit(&event);
        steps.push(Step::Drag {
            dx,
            dy,
            handled: event.is_default_prevented(),
            position: *target.borrow(),
        });
    }
    if !args.drags.is_empty() {
        drag.emit(&DragEvent::end());
    }

    if let Some(location) = args.to {
        let mut event_loop: EventLoop<'static, ()> =
            EventLoop::try_new().context("error creating event loop")?;

        let mut clock = Clock::default();
        clock.apply_config(&config.animations);
        let scheduler =
            frame_scheduler::from_config(&config.frames, event_loop.handle(), clock.clone());

        let mut transition = Transition::with_defaults(
            target.clone(),
            Axis::from(args.axis),
            clock,
            scheduler,
            TransitionDefaults::from(config.animations.transition),
        );
        transition.move_to(MoveTo::new(location));

        record_frames(
            &mut event_loop,
            &transition,
            &target,
            FRAME_TIMEOUT,
            &mut steps,
        )?;
    }

    let dimensions = pane.dimensions();
    let report = Report {
        dimensions: vec![
            DimensionReport::from(&*dimensions.x().borrow()),
            DimensionReport::from(&*dimensions.y().borrow()),
        ],
        steps,
        position: *target.borrow(),
    };
    Ok(report)
}

/// Dispatches `event_loop` until `transition` stops, recording every frame it runs.
fn record_frames(
    event_loop: &mut EventLoop<'static, ()>,
    transition: &Transition,
    target: &RefCell<Translation>,
    frame_timeout: Duration,
    steps: &mut Vec<Step>,
) -> anyhow::Result<()> {
    let mut frames = 0;
    let mut missed = 0;
    while transition.is_running() {
        let start = Instant::now();
        event_loop
            .dispatch(Some(frame_timeout), &mut ())
            .context("error dispatching the event loop")?;

        if transition.frames() == frames {
            if start.elapsed() >= frame_timeout {
                missed += 1;
                if missed >= MAX_MISSED_FRAMES {
                    bail!("transition stalled: no frame in {missed} tries of {frame_timeout:?}");
                }
            }
            continue;
        }
        frames = transition.frames();
        missed = 0;

        let time_passed = transition.last_frame_time().unwrap_or_default();
        steps.push(Step::Frame {
            time_ms: time_passed.as_secs_f64() * 1000.,
            position: *target.borrow(),
        });
    }

    Ok(())
}

struct Point(Translation);

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.x, self.0.y)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dim in &self.dimensions {
            writeln!(
                f,
                "{}: size={} total={} range={}..={}",
                dim.axis, dim.size, dim.total, dim.min, dim.max
            )?;
        }

        for step in &self.steps {
            match step {
                Step::Drag {
                    dx, dy, position, ..
                } => writeln!(f, "drag {dx},{dy} -> {}", Point(*position))?,
                Step::Frame { time_ms, position } => {
                    writeln!(f, "frame {time_ms:.1}ms -> {}", Point(*position))?
                }
            }
        }

        write!(f, "at {}", Point(self.position))
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::cli::AxisArg;
    use crate::dimension::Size;
    use crate::frame_scheduler::ManualFrameScheduler;

    fn args(drags: &[(f64, f64)], to: Option<f64>) -> SimulateArgs {
        SimulateArgs {
            container: Size::new(100., 100.),
            content: Size::new(300., 100.),
            drags: drags.to_vec(),
            to,
            axis: AxisArg::X,
            json: false,
        }
    }

    #[test]
    fn elastic_drags() {
        let args = args(&[(-50., 0.), (-100., 0.), (-100., 0.), (30., 0.)], None);
        let report = run(&args, &Config::default()).unwrap();

        assert_snapshot!(report.to_string(), @r"
        x: size=100 total=300 range=-200..=0
        y: size=100 total=100 range=0..=0
        drag -50,0 -> -50,0
        drag -100,0 -> -150,0
        drag -100,0 -> -200,0
        drag 30,0 -> -170,0
        at -170,0
        ");
    }

    #[test]
    fn rigid_pane_stops_at_edge() {
        let mut config = Config::default();
        config.pane.elastic = false;

        let args = args(&[(-150., 0.), (-100., 0.)], None);
        let report = run(&args, &config).unwrap();
        assert_eq!(report.position, Translation::new(-150., 0.));
    }

    #[test]
    fn drags_are_marked_handled() {
        let report = run(&args(&[(-10., 5.)], None), &Config::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["steps"][0]["kind"], "drag");
        assert_eq!(json["steps"][0]["handled"], true);
        assert_eq!(json["dimensions"][0]["axis"], "x");
        assert_eq!(json["position"]["x"], -10.);
    }

    #[test]
    fn transition_with_animations_off_takes_one_frame() {
        let mut config = Config::default();
        config.animations.off = true;

        let report = run(&args(&[(-100., 0.)], Some(0.)), &config).unwrap();
        let frames: Vec<_> = report
            .steps
            .iter()
            .filter(|step| matches!(step, Step::Frame { .. }))
            .collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(report.position, Translation::new(0., 0.));
    }

    #[test]
    fn transition_settles_on_target() {
        let mut config = Config::default();
        config.animations.transition.duration_ms = 50;

        let report = run(&args(&[], Some(-120.)), &config).unwrap();
        assert_eq!(report.position, Translation::new(-120., 0.));
        assert!(matches!(report.steps.last(), Some(Step::Frame { .. })));

        let times: Vec<f64> = report
            .steps
            .iter()
            .filter_map(|step| match step {
                Step::Frame { time_ms, .. } => Some(*time_ms),
                Step::Drag { .. } => None,
            })
            .collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]), "{times:?}");
        assert_eq!(times.last(), Some(&50.));
    }

    #[test]
    fn transition_without_frames_is_reported_as_stalled() {
        let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
        let target = Translation::default().shared();
        // Nothing ever runs the frames of a manual scheduler here.
        let scheduler = Rc::new(ManualFrameScheduler::new());
        let mut transition = Transition::new(
            target.clone(),
            Axis::X,
            Clock::with_time(Duration::ZERO),
            scheduler.clone(),
        );
        transition.move_to(MoveTo::new(10.));

        let mut steps = Vec::new();
        let err = record_frames(
            &mut event_loop,
            &transition,
            &target,
            Duration::from_millis(5),
            &mut steps,
        )
        .unwrap_err();

        assert!(err.to_string().contains("stalled"), "{err}");
        assert!(steps.is_empty());
        assert_eq!(scheduler.pending(), 1);
    }
}
