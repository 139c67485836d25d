#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Pane {
    /// Whether dragging past the content edges is allowed, with resistance.
    #[knuffel(child, unwrap(argument), default = true)]
    pub elastic: bool,
}

impl Default for Pane {
    fn default() -> Self {
        Self { elastic: true }
    }
}
