use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Something with an on-screen position that panning and transitions move around.
///
/// Nothing else reads or writes the position, so implementations are free to back it with a
/// render transform, a scroll offset, or anything else.
pub trait Movable {
    /// Current position along the axis.
    fn position(&self, axis: Axis) -> f64;

    /// Moves by a relative offset along the axis.
    fn translate_axis(&mut self, axis: Axis, delta: f64);

    /// Moves to an absolute position along the axis.
    fn move_axis(&mut self, axis: Axis, value: f64);
}

pub type SharedMovable = Rc<RefCell<dyn Movable>>;

/// Plain 2D translation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Translation {
    pub x: f64,
    pub y: f64,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
        })
    }
}

impl Translation {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }
}

impl Movable for Translation {
    fn position(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    fn translate_axis(&mut self, axis: Axis, delta: f64) {
        *self.axis_mut(axis) += delta;
    }

    fn move_axis(&mut self, axis: Axis, value: f64) {
        *self.axis_mut(axis) = value;
    }
}
