use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{timestamp, FilterError};

/// Descriptive statistics for one profile's posting history.
///
/// Every averaged field is rounded to two decimal places.
/// `start_date`/`end_date` are the earliest and latest `post_timestamp`
/// actually present in the input, not the requested window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub average_text_length: f64,
    pub average_postings_per_month: f64,
    /// Reserved; always `0.0`.
    pub average_headline_length: f64,
    pub average_emojis: f64,
    pub average_likes: f64,
    pub average_comments: f64,
    pub average_paragraphs: f64,
    pub average_hashtags: f64,
    /// Fraction in `[0, 1]`, not a percentage.
    pub percentage_visuals_used: f64,
}

/// Optional inclusive `post_timestamp` window bounding a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsReportFilter {
    #[serde(alias = "startDate", deserialize_with = "timestamp::deserialize_optional")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(alias = "endDate", deserialize_with = "timestamp::deserialize_optional")]
    pub end_date: Option<NaiveDateTime>,
}

impl AnalyticsReportFilter {
    /// Rejects windows whose start lies after their end.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvertedRange`] when both bounds are set and
    /// `start_date > end_date`.
    pub fn validate(&self) -> Result<(), FilterError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(FilterError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Returns `true` if `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start_date.is_none_or(|start| instant >= start)
            && self.end_date.is_none_or(|end| instant <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_timestamp;

    fn ts(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn filter_accepts_both_spellings() {
        let camel: AnalyticsReportFilter =
            serde_json::from_value(serde_json::json!({ "startDate": "2024-01-01" })).unwrap();
        let snake: AnalyticsReportFilter =
            serde_json::from_value(serde_json::json!({ "start_date": "2024-01-01" })).unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.start_date, Some(ts("2024-01-01")));
        assert!(camel.end_date.is_none());
    }

    #[test]
    fn unbounded_filter_contains_everything() {
        let filter = AnalyticsReportFilter::default();
        assert!(filter.contains(ts("1999-12-31")));
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn bounds_are_inclusive() {
        let filter = AnalyticsReportFilter {
            start_date: Some(ts("2024-01-05")),
            end_date: Some(ts("2024-03-20")),
        };
        assert!(filter.contains(ts("2024-01-05")));
        assert!(filter.contains(ts("2024-03-20")));
        assert!(!filter.contains(ts("2024-03-20T00:00:01")));
        assert!(!filter.contains(ts("2024-01-04T23:59:59")));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let filter = AnalyticsReportFilter {
            start_date: Some(ts("2024-03-01")),
            end_date: Some(ts("2024-01-01")),
        };
        assert!(matches!(
            filter.validate(),
            Err(FilterError::InvertedRange { .. })
        ));
    }
}
