/// ----- ERROR MODULE -----
/// Error types for the outer shell. The control loop itself has no
/// failure path; only configuration and the ad source can fail.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("start floor {0} is outside 0..=68")]
    StartFloorOutOfRange(u32),

    #[error("{0} = {1} does not fit a signed pixel offset")]
    WidthOutOfRange(&'static str, u32),

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

#[derive(Debug, Error)]
pub enum AdError {
    #[error("ad source {} unavailable: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}
