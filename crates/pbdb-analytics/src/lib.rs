//! Descriptive statistics over a profile's activity history.
//!
//! Pure and stateless: every function takes a slice of activities and
//! returns a fresh [`AnalyticsReport`](pbdb_core::AnalyticsReport), so reports
//! for different profiles can be computed concurrently.

pub mod error;
pub mod report;
mod text;

pub use error::AnalyticsError;
pub use report::{generate_report, generate_windowed_report};
