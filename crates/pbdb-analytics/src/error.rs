use pbdb_core::FilterError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    /// No activities were supplied, or none fell inside the requested window.
    #[error("no activities available to analyse")]
    NoData,

    #[error(transparent)]
    InvalidFilter(#[from] FilterError),
}
