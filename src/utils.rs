use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use directories::ProjectDirs;
use elastic_pane_config::ConfigPath;
use rustix::time::{clock_gettime, ClockId};

const CONFIG_ENV: &str = "ELASTIC_PANE_CONFIG";

pub fn get_monotonic_time() -> Duration {
    let ts = clock_gettime(ClockId::Monotonic);
    Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
}

/// Converts a refresh rate in Hz into the interval between frames.
pub fn refresh_interval(refresh_rate: f64) -> Duration {
    Duration::from_secs_f64(1. / refresh_rate.max(1.))
}

/// Resolves where to load the config from.
///
/// An explicit path wins, then `$ELASTIC_PANE_CONFIG`, then the per-user config directory.
pub fn config_path(explicit: Option<PathBuf>) -> anyhow::Result<ConfigPath> {
    if let Some(path) = explicit {
        return Ok(ConfigPath::Explicit(path));
    }

    if let Some(path) = env::var_os(CONFIG_ENV).filter(|path| !path.is_empty()) {
        return Ok(ConfigPath::Explicit(PathBuf::from(path)));
    }

    let mut path = ProjectDirs::from("", "", "elastic-pane")
        .context("error retrieving home directory")?
        .config_dir()
        .to_owned();
    path.push("config.kdl");
    Ok(ConfigPath::Regular(path))
}
