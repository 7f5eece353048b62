//! Shared configuration and topic model for CryptoSentry.

pub mod app_config;
pub mod config;
pub mod topics;

pub use app_config::{AppConfig, FlairIds, MetricsStoreConfig, RedditCredentials, SearchSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use topics::{default_topics, load_topics, Topic, TopicsFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read topics file {path}: {source}")]
    TopicsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse topics file: {0}")]
    TopicsFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
