use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::dimension::{PaneDimension, PaneDimensions};
use crate::event::{EventSource, Subscription};
use crate::movable::{Axis, SharedMovable};

/// Resistance applied to drags past the edge of an elastic pane.
pub const ELASTIC_RESISTANCE: f64 = 0.5;

/// Applies drag deltas along one axis, resisting drags that move further out of bounds.
pub struct PaneAxis {
    axis: Axis,
    dimension: Rc<RefCell<PaneDimension>>,
    resistance: f64,
    movable: SharedMovable,
    changed: EventSource<PaneAxis>,
}

/// Drag gesture event, as delivered by the gesture recognizer.
#[derive(Debug)]
pub struct DragEvent {
    pub kind: DragEventKind,
    default_prevented: Cell<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEventKind {
    /// The pointer moved by the given per-axis deltas since the last event.
    Move { x: f64, y: f64 },
    /// The drag gesture ended.
    End,
}

pub type DragEvents = EventSource<DragEvent>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneOptions {
    /// Whether the content can be dragged past its edges, with resistance.
    pub elastic: bool,
}

/// Scrollable surface: drag input applied to a movable within the bounds of its dimensions.
pub struct Pane {
    x: Rc<PaneAxis>,
    y: Rc<PaneAxis>,
    dimensions: PaneDimensions,
    _drag: Subscription,
}

impl PaneAxis {
    pub fn new(
        axis: Axis,
        dimension: Rc<RefCell<PaneDimension>>,
        resistance: f64,
        movable: SharedMovable,
    ) -> Self {
        Self {
            axis,
            dimension,
            resistance: resistance.clamp(0., 1.),
            movable,
            changed: EventSource::new(),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    pub fn dimension(&self) -> &Rc<RefCell<PaneDimension>> {
        &self.dimension
    }

    pub fn drag_move(&self, delta: f64) {
        let _span = tracy_client::span!("PaneAxis::drag_move");

        let (min, max) = {
            let dimension = self.dimension.borrow();
            if dimension.present() <= 0. {
                return;
            }
            (dimension.min(), dimension.max())
        };

        let mut movable = self.movable.borrow_mut();
        let position = movable.position(self.axis) + delta;

        // Pulling further out past an edge is damped, pulling back in never is.
        let delta = if (position < min && delta < 0.) || (position > max && delta > 0.) {
            trace!("{} drag past {min}..={max} resisted", self.axis);
            delta * self.resistance
        } else {
            delta
        };

        movable.translate_axis(self.axis, delta);
        drop(movable);

        self.changed.emit(self);
    }

    /// Subscribes to drag movement along this axis; the listener receives the axis handler.
    pub fn on_change(&self, listener: impl Fn(&PaneAxis) + 'static) -> Subscription {
        self.changed.subscribe(listener)
    }
}

impl fmt::Debug for PaneAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaneAxis")
            .field("axis", &self.axis)
            .field("resistance", &self.resistance)
            .finish_non_exhaustive()
    }
}

impl DragEvent {
    pub fn new(kind: DragEventKind) -> Self {
        Self {
            kind,
            default_prevented: Cell::new(false),
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(DragEventKind::Move { x, y })
    }

    pub fn end() -> Self {
        Self::new(DragEventKind::End)
    }

    /// Marks the event as handled so the host skips its default handling.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

impl PaneOptions {
    pub fn resistance(self) -> f64 {
        if self.elastic {
            ELASTIC_RESISTANCE
        } else {
            0.
        }
    }
}

impl Default for PaneOptions {
    fn default() -> Self {
        Self { elastic: true }
    }
}

impl From<elastic_pane_config::Pane> for PaneOptions {
    fn from(config: elastic_pane_config::Pane) -> Self {
        Self {
            elastic: config.elastic,
        }
    }
}

impl Pane {
    /// Creates a pane moving `movable` within `dimensions` in response to `drag` events.
    ///
    /// The pane stops listening to `drag` when dropped.
    pub fn new(
        dimensions: PaneDimensions,
        movable: SharedMovable,
        drag: &DragEvents,
        options: PaneOptions,
    ) -> Self {
        let resistance = options.resistance();

        let x = Rc::new(PaneAxis::new(
            Axis::X,
            dimensions.x().clone(),
            resistance,
            movable.clone(),
        ));
        let y = Rc::new(PaneAxis::new(
            Axis::Y,
            dimensions.y().clone(),
            resistance,
            movable,
        ));

        let drag = drag.subscribe({
            let x = Rc::downgrade(&x);
            let y = Rc::downgrade(&y);
            move |event: &DragEvent| {
                if let DragEventKind::Move { x: dx, y: dy } = event.kind {
                    let (Some(x), Some(y)) = (x.upgrade(), y.upgrade()) else {
                        return;
                    };
                    x.drag_move(dx);
                    y.drag_move(dy);
                }

                // Momentum after the gesture ends is up to the caller.
                event.prevent_default();
            }
        });

        Self {
            x,
            y,
            dimensions,
            _drag: drag,
        }
    }

    pub fn x(&self) -> &PaneAxis {
        &self.x
    }

    pub fn y(&self) -> &PaneAxis {
        &self.y
    }

    pub fn axis(&self, axis: Axis) -> &PaneAxis {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    pub fn dimensions(&self) -> &PaneDimensions {
        &self.dimensions
    }
}

impl fmt::Debug for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pane")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}
