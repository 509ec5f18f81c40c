//! Activity Store: read and write paths for the `activities` table.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use pbdb_core::{Activity, ActivityFilter};
use sqlx::PgPool;

use crate::hooks::instrumented;
use crate::DbError;

const ACTIVITY_COLUMNS: &str = "id, post_url, activity_type, video_url, img_url, post_content, \
     like_count, comment_count, repost_count, post_date, action, profile_url, \
     timestamp, post_timestamp, agent_id, container_id, created_at";

/// A row from the `activities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    pub id: i64,
    pub post_url: String,
    pub activity_type: String,
    pub video_url: Option<String>,
    pub img_url: Option<String>,
    pub post_content: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub repost_count: i64,
    pub post_date: Option<String>,
    pub action: String,
    pub profile_url: String,
    pub timestamp: NaiveDateTime,
    pub post_timestamp: NaiveDateTime,
    pub agent_id: Option<String>,
    pub container_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        Self {
            post_url: row.post_url,
            activity_type: row.activity_type,
            video_url: row.video_url,
            img_url: row.img_url,
            post_content: row.post_content,
            like_count: row.like_count,
            comment_count: row.comment_count,
            repost_count: row.repost_count,
            post_date: row.post_date,
            action: row.action,
            profile_url: row.profile_url,
            timestamp: row.timestamp,
            post_timestamp: row.post_timestamp,
            agent_id: row.agent_id,
            container_id: row.container_id,
        }
    }
}

/// Appends `activities` in a single transaction.
///
/// Either every row is written or none is: the transaction rolls back when
/// it is dropped without a commit, which covers early returns, errors, and
/// cancellation of the calling future. Rows that collide with an existing
/// `(agent_id, container_id, post_url)` are skipped, so a container that two
/// concurrent syncs both fetched is stored once.
///
/// Returns the number of rows actually inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert or the commit fails.
pub async fn insert_activities(pool: &PgPool, activities: &[Activity]) -> Result<u64, DbError> {
    instrumented("insert_activities", async {
        if activities.is_empty() {
            return Ok(0);
        }

        let mut tx = pool.begin().await?;
        let mut inserted = 0u64;

        for activity in activities {
            let result = sqlx::query(
                "INSERT INTO activities \
                     (post_url, activity_type, video_url, img_url, post_content, \
                      like_count, comment_count, repost_count, post_date, action, \
                      profile_url, timestamp, post_timestamp, agent_id, container_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(&activity.post_url)
            .bind(&activity.activity_type)
            .bind(&activity.video_url)
            .bind(&activity.img_url)
            .bind(&activity.post_content)
            .bind(activity.like_count)
            .bind(activity.comment_count)
            .bind(activity.repost_count)
            .bind(&activity.post_date)
            .bind(&activity.action)
            .bind(&activity.profile_url)
            .bind(activity.timestamp)
            .bind(activity.post_timestamp)
            .bind(&activity.agent_id)
            .bind(&activity.container_id)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok::<_, DbError>(inserted)
    })
    .await
}

/// Returns activities matching every set field of `filter`, ordered by
/// `timestamp` ascending then insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_activities(
    pool: &PgPool,
    filter: &ActivityFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Activity>, DbError> {
    instrumented("list_activities", async {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} \
             FROM activities \
             WHERE ($1::TEXT IS NULL OR post_url = $1) \
               AND ($2::TEXT IS NULL OR activity_type = $2) \
               AND ($3::TEXT IS NULL OR video_url = $3) \
               AND ($4::TEXT IS NULL OR img_url = $4) \
               AND ($5::TEXT IS NULL OR post_content = $5) \
               AND ($6::BIGINT IS NULL OR like_count = $6) \
               AND ($7::BIGINT IS NULL OR comment_count = $7) \
               AND ($8::BIGINT IS NULL OR repost_count = $8) \
               AND ($9::TEXT IS NULL OR post_date = $9) \
               AND ($10::TEXT IS NULL OR action = $10) \
               AND ($11::TEXT IS NULL OR profile_url = $11) \
               AND ($12::TIMESTAMP IS NULL OR timestamp = $12) \
               AND ($13::TIMESTAMP IS NULL OR post_timestamp = $13) \
               AND ($14::TEXT IS NULL OR agent_id = $14) \
               AND ($15::TEXT IS NULL OR container_id = $15) \
             ORDER BY timestamp ASC, id ASC \
             LIMIT $16 OFFSET $17"
        );

        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(filter.post_url.as_deref())
            .bind(filter.activity_type.as_deref())
            .bind(filter.video_url.as_deref())
            .bind(filter.img_url.as_deref())
            .bind(filter.post_content.as_deref())
            .bind(filter.like_count)
            .bind(filter.comment_count)
            .bind(filter.repost_count)
            .bind(filter.post_date.as_deref())
            .bind(filter.action.as_deref())
            .bind(filter.profile_url.as_deref())
            .bind(filter.timestamp)
            .bind(filter.post_timestamp)
            .bind(filter.agent_id.as_deref())
            .bind(filter.container_id.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok::<_, DbError>(rows.into_iter().map(Activity::from).collect())
    })
    .await
}

/// Returns every activity of one profile, ordered by `post_timestamp`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_profile_activities(
    pool: &PgPool,
    profile_url: &str,
) -> Result<Vec<Activity>, DbError> {
    instrumented("list_profile_activities", async {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} \
             FROM activities \
             WHERE profile_url = $1 \
             ORDER BY post_timestamp ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(profile_url)
            .fetch_all(pool)
            .await?;

        Ok::<_, DbError>(rows.into_iter().map(Activity::from).collect())
    })
    .await
}

/// Returns every profile URL that has at least one stored activity.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_distinct_profiles(pool: &PgPool) -> Result<Vec<String>, DbError> {
    instrumented("list_distinct_profiles", async {
        let profiles = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT profile_url FROM activities ORDER BY profile_url",
        )
        .fetch_all(pool)
        .await?;

        Ok::<_, DbError>(profiles)
    })
    .await
}

/// Returns the distinct `(agent_id, container_id)` pairs of stored activities.
///
/// Rows without upstream attribution are ignored. This set is the sync
/// reconciler's record of which containers have already been ingested.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn distinct_processed_pairs(pool: &PgPool) -> Result<HashSet<(String, String)>, DbError> {
    instrumented("distinct_processed_pairs", async {
        let pairs = sqlx::query_as::<_, (String, String)>(
            "SELECT DISTINCT agent_id, container_id \
             FROM activities \
             WHERE agent_id IS NOT NULL AND container_id IS NOT NULL",
        )
        .fetch_all(pool)
        .await?;

        Ok::<_, DbError>(pairs.into_iter().collect())
    })
    .await
}
