//! `report` command handler.

use pbdb_analytics::{generate_windowed_report, AnalyticsError};
use pbdb_core::{AnalyticsReport, AnalyticsReportFilter};

/// Print the analytics report for `profile_url`, restricted to `filter`.
///
/// # Errors
///
/// Returns an error if the window is inverted, the query fails, or no
/// activity of the profile falls inside the window.
pub(crate) async fn run_report(
    pool: &sqlx::PgPool,
    profile_url: &str,
    filter: &AnalyticsReportFilter,
    json: bool,
) -> anyhow::Result<()> {
    let activities = pbdb_db::list_profile_activities(pool, profile_url).await?;

    let report = match generate_windowed_report(&activities, filter) {
        Ok(report) => report,
        Err(AnalyticsError::NoData) => {
            anyhow::bail!("no activities for {profile_url} in the requested window")
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(profile_url, &report);
    }
    Ok(())
}

fn print_report(profile_url: &str, report: &AnalyticsReport) {
    println!("Profile: {profile_url}");
    println!(
        "Period:  {} .. {}",
        report.start_date.format("%Y-%m-%d"),
        report.end_date.format("%Y-%m-%d")
    );
    println!();
    println!("{:<28}{:>10.2}", "Posts per month", report.average_postings_per_month);
    println!("{:<28}{:>10.2}", "Text length", report.average_text_length);
    println!("{:<28}{:>10.2}", "Headline length", report.average_headline_length);
    println!("{:<28}{:>10.2}", "Emojis", report.average_emojis);
    println!("{:<28}{:>10.2}", "Paragraph breaks", report.average_paragraphs);
    println!("{:<28}{:>10.2}", "Hashtags", report.average_hashtags);
    println!("{:<28}{:>10.2}", "Likes", report.average_likes);
    println!("{:<28}{:>10.2}", "Comments", report.average_comments);
    println!("{:<28}{:>10.2}", "Share with visuals", report.percentage_visuals_used);
}
