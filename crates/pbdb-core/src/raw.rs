//! Mapping of raw upstream records onto [`Activity`].
//!
//! The collector emits camelCase keys while exports and older payloads use
//! snake_case. Each canonical field lists its accepted spellings through
//! `serde(alias)`, so name resolution happens once, at the deserialization
//! boundary. Value coercion (counts, timestamps, defaults) happens in
//! [`RawActivity::into_activity`], which reports a typed
//! [`ActivityParseError`] instead of silently dropping data.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::activity::{Activity, UNKNOWN};
use crate::timestamp::parse_timestamp;

/// A raw record failed to map onto the [`Activity`] shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivityParseError {
    #[error("record is not a valid activity object: {0}")]
    Malformed(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Upstream record as delivered, before coercion.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawActivity {
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
    pub like_count: Option<Value>,
    #[serde(alias = "commentCount")]
    pub comment_count: Option<Value>,
    #[serde(alias = "repostCount")]
    pub repost_count: Option<Value>,
    #[serde(alias = "postDate")]
    pub post_date: Option<String>,
    pub action: Option<String>,
    #[serde(alias = "profileUrl")]
    pub profile_url: Option<String>,
    pub timestamp: Option<Value>,
    #[serde(alias = "postTimestamp")]
    pub post_timestamp: Option<Value>,
    #[serde(alias = "agentId")]
    pub agent_id: Option<Value>,
    #[serde(alias = "containerId")]
    pub container_id: Option<Value>,
}

impl RawActivity {
    /// Coerces the raw record into an [`Activity`].
    ///
    /// `agent_id`/`container_id`, when given, override whatever attribution
    /// the record itself carries.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityParseError`] when a required field is missing or
    /// blank, a count is negative or non-numeric, or a timestamp cannot be
    /// parsed.
    pub fn into_activity(
        self,
        agent_id: Option<&str>,
        container_id: Option<&str>,
    ) -> Result<Activity, ActivityParseError> {
        let post_url = required_text(self.post_url, "post_url")?;
        let profile_url = required_text(self.profile_url, "profile_url")?;
        let timestamp = required_timestamp(self.timestamp.as_ref(), "timestamp")?;
        let post_timestamp = required_timestamp(self.post_timestamp.as_ref(), "post_timestamp")?;

        Ok(Activity {
            post_url,
            activity_type: self.activity_type.unwrap_or_else(|| UNKNOWN.to_string()),
            video_url: non_blank(self.video_url),
            img_url: non_blank(self.img_url),
            post_content: self.post_content.unwrap_or_default(),
            like_count: coerce_count(self.like_count.as_ref(), "like_count")?,
            comment_count: coerce_count(self.comment_count.as_ref(), "comment_count")?,
            repost_count: coerce_count(self.repost_count.as_ref(), "repost_count")?,
            post_date: self.post_date,
            action: self.action.unwrap_or_else(|| UNKNOWN.to_string()),
            profile_url,
            timestamp,
            post_timestamp,
            agent_id: agent_id
                .map(str::to_owned)
                .or_else(|| self.agent_id.as_ref().and_then(id_to_string)),
            container_id: container_id
                .map(str::to_owned)
                .or_else(|| self.container_id.as_ref().and_then(id_to_string)),
        })
    }
}

/// Parses one raw JSON record and stamps it with its originating run.
///
/// # Errors
///
/// Returns [`ActivityParseError`] if the value is not an object of the
/// expected shape or fails coercion.
pub fn parse_activity(
    value: Value,
    agent_id: &str,
    container_id: &str,
) -> Result<Activity, ActivityParseError> {
    if !value.is_object() {
        return Err(ActivityParseError::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }
    let raw: RawActivity = serde_json::from_value(value)
        .map_err(|e| ActivityParseError::Malformed(e.to_string()))?;
    raw.into_activity(Some(agent_id), Some(container_id))
}

/// Renders an upstream identifier, which may arrive as a string or a number.
#[must_use]
pub fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ActivityParseError> {
    non_blank(value).ok_or(ActivityParseError::MissingField(field))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn required_timestamp(
    value: Option<&Value>,
    field: &'static str,
) -> Result<chrono::NaiveDateTime, ActivityParseError> {
    match value {
        None | Some(Value::Null) => Err(ActivityParseError::MissingField(field)),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(ActivityParseError::MissingField(field))
        }
        Some(Value::String(s)) => {
            parse_timestamp(s).ok_or_else(|| ActivityParseError::InvalidField {
                field,
                reason: format!("unrecognised timestamp '{s}'"),
            })
        }
        Some(other) => Err(ActivityParseError::InvalidField {
            field,
            reason: format!("expected a timestamp string, got {}", json_kind(other)),
        }),
    }
}

fn coerce_count(value: Option<&Value>, field: &'static str) -> Result<i64, ActivityParseError> {
    let invalid = |reason: String| ActivityParseError::InvalidField { field, reason };

    let count = match value {
        None | Some(Value::Null) => return Ok(0),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            #[allow(clippy::cast_possible_truncation)]
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 9.0e15 => f as i64,
            _ => return Err(invalid(format!("non-integral count {n}"))),
        },
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("non-numeric count '{s}'")))?,
        Some(other) => {
            return Err(invalid(format!(
                "expected a number, got {}",
                json_kind(other)
            )))
        }
    };

    if count < 0 {
        return Err(invalid(format!("negative count {count}")));
    }
    Ok(count)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "raw_test.rs"]
mod tests;
