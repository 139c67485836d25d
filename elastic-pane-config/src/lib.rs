#[macro_use]
extern crate tracing;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use miette::{Context as _, IntoDiagnostic as _};

pub mod animations;
pub mod frames;
pub mod pane;
pub mod utils;

pub use crate::animations::{Animations, Curve, TransitionAnim};
pub use crate::frames::{FrameSchedulerKind, Frames};
pub use crate::pane::Pane;
pub use crate::utils::FloatOrInt;

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Config {
    #[knuffel(child, default)]
    pub pane: Pane,
    #[knuffel(child, default)]
    pub animations: Animations,
    #[knuffel(child, default)]
    pub frames: Frames,
}

#[derive(Debug, Clone)]
pub enum ConfigPath {
    /// Explicitly set config path.
    ///
    /// Load the config only from this path.
    Explicit(PathBuf),

    /// Default config path, usually `$XDG_CONFIG_HOME/elastic-pane/config.kdl`.
    ///
    /// Falls back to the built-in default config when the file does not exist.
    Regular(PathBuf),
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("config.kdl"),
            &contents,
        )
        .context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        let _span = tracy_client::span!("Config::parse");
        knuffel::parse(filename, text)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse(
            "default-config.kdl",
            include_str!("../../resources/default-config.kdl"),
        )
        .unwrap()
    }
}

impl ConfigPath {
    pub fn path(&self) -> &Path {
        match self {
            ConfigPath::Explicit(path) | ConfigPath::Regular(path) => path,
        }
    }

    pub fn load(&self) -> miette::Result<Config> {
        let _span = tracy_client::span!("ConfigPath::load");

        match self {
            ConfigPath::Explicit(path) => Config::load(path),
            ConfigPath::Regular(path) => {
                if path.exists() {
                    Config::load(path)
                } else {
                    debug!("{path:?} does not exist, using the default config");
                    Ok(Config::default())
                }
            }
        }
        .context("error loading config")
    }
}
