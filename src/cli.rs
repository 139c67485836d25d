use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::dimension::Size;
use crate::movable::Axis;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to config file (default: `$XDG_CONFIG_HOME/elastic-pane/config.kdl`).
    ///
    /// This can also be set with the `ELASTIC_PANE_CONFIG` environment variable. If both are set,
    /// the command line argument takes precedence.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Validate the config file.
    Validate,
    /// Drag a pane around and animate it, printing every step.
    Simulate(SimulateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Container size, as `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_size, default_value = "100x100")]
    pub container: Size,
    /// Content size, as `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_size, default_value = "300x300")]
    pub content: Size,
    /// Drag by `DX,DY`; repeat for several moves.
    #[arg(long = "drag", value_parser = parse_delta, allow_hyphen_values = true)]
    pub drags: Vec<(f64, f64)>,
    /// After dragging, animate the pane to this position.
    #[arg(long, value_parser = parse_offset, allow_hyphen_values = true)]
    pub to: Option<f64>,
    /// Axis to animate.
    #[arg(long, value_enum, default_value_t = AxisArg::X)]
    pub axis: AxisArg,
    /// Format output as JSON.
    #[arg(short, long)]
    pub json: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisArg {
    X,
    Y,
}

impl From<AxisArg> for Axis {
    fn from(value: AxisArg) -> Self {
        match value {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
        }
    }
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w = parse_extent(w)?;
    let h = parse_extent(h)?;
    Ok(Size::new(w, h))
}

fn parse_extent(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|err| format!("invalid size {s:?}: {err}"))?;
    if !value.is_finite() || value < 0. {
        return Err(format!("size must be a non-negative number, got {s:?}"));
    }
    Ok(value)
}

fn parse_delta(s: &str) -> Result<(f64, f64), String> {
    let (dx, dy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got {s:?}"))?;
    Ok((parse_offset(dx)?, parse_offset(dy)?))
}

fn parse_offset(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|err| format!("invalid offset {s:?}: {err}"))?;
    if !value.is_finite() {
        return Err(format!("offset must be a finite number, got {s:?}"));
    }
    Ok(value)
}
