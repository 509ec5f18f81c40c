use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timestamp;

pub const UNKNOWN: &str = "Unknown";

pub const DEFAULT_LIST_LIMIT: i64 = 1000;
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Clamps a caller-supplied page size into `1..=MAX_LIST_LIMIT`.
#[must_use]
pub fn normalize_list_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Negative offsets are treated as zero.
#[must_use]
pub fn normalize_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// One post or action observed on a tracked social profile.
///
/// Activities are immutable once created. `agent_id`/`container_id` record
/// which upstream collector run produced the row; rows created by hand carry
/// neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub post_url: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub video_url: Option<String>,
    pub img_url: Option<String>,
    pub post_content: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub repost_count: i64,
    /// Display string as shown on the profile (e.g. `"2w"`), not parsed.
    pub post_date: Option<String>,
    pub action: String,
    pub profile_url: String,
    pub timestamp: NaiveDateTime,
    pub post_timestamp: NaiveDateTime,
    pub agent_id: Option<String>,
    pub container_id: Option<String>,
}

impl Activity {
    /// Returns `true` when the activity carries an image or a video.
    #[must_use]
    pub fn has_visual(&self) -> bool {
        self.img_url.is_some() || self.video_url.is_some()
    }
}

/// Equality filter over [`Activity`] fields. Unset fields impose no constraint.
///
/// Accepts camelCase and snake_case keys so query strings written against
/// either naming style work unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityFilter {
    #[serde(alias = "postUrl")]
    pub post_url: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    #[serde(alias = "videoUrl")]
    pub video_url: Option<String>,
    #[serde(alias = "imgUrl")]
    pub img_url: Option<String>,
    #[serde(alias = "postContent")]
    pub post_content: Option<String>,
    #[serde(alias = "likeCount")]
    pub like_count: Option<i64>,
    #[serde(alias = "commentCount")]
    pub comment_count: Option<i64>,
    #[serde(alias = "repostCount")]
    pub repost_count: Option<i64>,
    #[serde(alias = "postDate")]
    pub post_date: Option<String>,
    pub action: Option<String>,
    #[serde(alias = "profileUrl")]
    pub profile_url: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize_optional")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(
        alias = "postTimestamp",
        deserialize_with = "timestamp::deserialize_optional"
    )]
    pub post_timestamp: Option<NaiveDateTime>,
    #[serde(alias = "agentId")]
    pub agent_id: Option<String>,
    #[serde(alias = "containerId")]
    pub container_id: Option<String>,
}

impl ActivityFilter {
    /// Filter matching every activity of one profile.
    #[must_use]
    pub fn for_profile(profile_url: impl Into<String>) -> Self {
        Self {
            profile_url: Some(profile_url.into()),
            ..Self::default()
        }
    }
}
