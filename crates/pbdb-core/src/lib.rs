pub mod activity;
pub mod analytics;
pub mod app_config;
pub mod config;
pub mod raw;
pub mod timestamp;

pub use activity::{normalize_list_limit, normalize_offset, Activity, ActivityFilter};
pub use analytics::{AnalyticsReport, AnalyticsReportFilter};
pub use app_config::{AppConfig, Environment, UpstreamConfig};
pub use config::{
    load_app_config, load_app_config_from_env, load_upstream_config_from_env, log_level_from_env,
};
pub use raw::{parse_activity, ActivityParseError, RawActivity};
pub use timestamp::parse_timestamp;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Rejected caller-supplied filter values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("start_date ({start}) is after end_date ({end})")]
    InvertedRange { start: String, end: String },
}
