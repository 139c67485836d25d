use crate::FloatOrInt;

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Frames {
    #[knuffel(child, unwrap(argument), default)]
    pub scheduler: FrameSchedulerKind,
    #[knuffel(child, unwrap(argument), default = FloatOrInt(60.))]
    pub refresh_rate: FloatOrInt<1, 1000>,
}

impl Default for Frames {
    fn default() -> Self {
        Self {
            scheduler: FrameSchedulerKind::default(),
            refresh_rate: FloatOrInt(60.),
        }
    }
}

#[derive(knuffel::DecodeScalar, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FrameSchedulerKind {
    /// Fixed-interval timer ticking at the refresh rate.
    #[default]
    Timer,
    /// Frames aligned with the predicted display presentation time.
    Presentation,
}
