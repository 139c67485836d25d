#[macro_use]
extern crate tracing;

pub mod animation;
pub mod cli;
pub mod dimension;
pub mod event;
pub mod frame_clock;
pub mod frame_scheduler;
pub mod movable;
pub mod pane;
pub mod simulate;
pub mod utils;
