//! Shared configuration types for the trend sentinel.
//!
//! Process settings come from the environment ([`load_app_config`]); the
//! watched channels and vocabulary come from a monitor file ([`load_monitor`]).

pub mod app_config;
pub mod config;
pub mod monitor;
pub mod normalize;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use monitor::{load_monitor, parse_monitor, MonitorFile, PatternsConfig, StaleConfig};
pub use normalize::normalize;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read monitor file {path}: {source}")]
    MonitorFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse monitor file: {0}")]
    MonitorFileParse(#[source] serde_yaml::Error),

    #[error("monitor validation failed: {0}")]
    Validation(String),
}
