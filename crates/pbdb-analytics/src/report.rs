use std::collections::HashSet;

use chrono::Datelike;
use pbdb_core::{Activity, AnalyticsReport, AnalyticsReportFilter};

use crate::error::AnalyticsError;
use crate::text;

/// Aggregates `activities` into an [`AnalyticsReport`].
///
/// Every mean is taken over the whole slice. `average_postings_per_month`
/// is the mean number of posts per calendar month that has at least one
/// post. All averages are rounded half away from zero to two decimals.
///
/// # Errors
///
/// Returns [`AnalyticsError::NoData`] when `activities` is empty.
pub fn generate_report(activities: &[Activity]) -> Result<AnalyticsReport, AnalyticsError> {
    let first = activities.first().ok_or(AnalyticsError::NoData)?;

    let mut start_date = first.post_timestamp;
    let mut end_date = first.post_timestamp;
    let mut months = HashSet::new();
    let mut totals = Totals::default();

    for activity in activities {
        start_date = start_date.min(activity.post_timestamp);
        end_date = end_date.max(activity.post_timestamp);
        months.insert((
            activity.post_timestamp.year(),
            activity.post_timestamp.month(),
        ));
        totals.add(activity);
    }

    let n = activities.len();
    Ok(AnalyticsReport {
        start_date,
        end_date,
        average_text_length: mean(totals.text_length, n),
        average_postings_per_month: mean(n, months.len()),
        average_headline_length: 0.0,
        average_emojis: mean(totals.emojis, n),
        average_likes: mean_i64(totals.likes, n),
        average_comments: mean_i64(totals.comments, n),
        average_paragraphs: mean(totals.paragraphs, n),
        average_hashtags: mean(totals.hashtags, n),
        percentage_visuals_used: mean(totals.visuals, n),
    })
}

/// Restricts `activities` to those whose `post_timestamp` lies inside
/// `filter` (inclusive) and aggregates the remainder.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] for an inverted window, or
/// [`AnalyticsError::NoData`] if nothing falls inside it.
pub fn generate_windowed_report(
    activities: &[Activity],
    filter: &AnalyticsReportFilter,
) -> Result<AnalyticsReport, AnalyticsError> {
    filter.validate()?;

    let in_window: Vec<Activity> = activities
        .iter()
        .filter(|a| filter.contains(a.post_timestamp))
        .cloned()
        .collect();

    tracing::debug!(
        total = activities.len(),
        in_window = in_window.len(),
        "applied report window"
    );

    generate_report(&in_window)
}

#[derive(Default)]
struct Totals {
    text_length: usize,
    emojis: usize,
    paragraphs: usize,
    hashtags: usize,
    visuals: usize,
    likes: i64,
    comments: i64,
}

impl Totals {
    fn add(&mut self, activity: &Activity) {
        let content = activity.post_content.as_str();
        self.text_length += text::text_length(content);
        self.emojis += text::emoji_count(content);
        self.paragraphs += text::paragraph_breaks(content);
        self.hashtags += text::hashtag_count(content);
        self.visuals += usize::from(activity.has_visual());
        self.likes = self.likes.saturating_add(activity.like_count);
        self.comments = self.comments.saturating_add(activity.comment_count);
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: usize, count: usize) -> f64 {
    round2(total as f64 / count as f64)
}

#[allow(clippy::cast_precision_loss)]
fn mean_i64(total: i64, count: usize) -> f64 {
    round2(total as f64 / count as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
