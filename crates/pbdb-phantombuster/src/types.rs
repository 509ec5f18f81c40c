//! `PhantomBuster` API response types.
//!
//! Identifiers are normalised to strings: the API renders them as JSON
//! strings on some endpoints and as numbers on others.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// An agent (a reusable automation definition) as listed by `agents/fetch-all`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Full agent record from `agents/fetch`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetail {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub last_end_status: Option<String>,
}

/// One run of an agent, tagged with the agent it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerRef {
    pub id: String,
    pub agent_id: String,
    pub status: Option<String>,
}

/// Full container record from `containers/fetch`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDetail {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub exit_code: Option<i64>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub ended_at: Option<i64>,
}

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

/// Envelope for `containers/fetch-all`: `{ "containers": [ ... ] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ContainerListResponse {
    #[serde(default)]
    pub containers: Vec<ContainerSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContainerSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Envelope for `containers/fetch-result-object`.
///
/// `resultObject` is itself a JSON document serialised into a string, or
/// `null` when the run produced nothing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResultObjectResponse {
    #[serde(default)]
    pub result_object: Option<String>,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, got {other}"
        ))),
    }
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_ids_accept_numbers_and_strings() {
        let agents: Vec<AgentRef> = serde_json::from_value(serde_json::json!([
            { "id": 4120, "name": "Activity Extractor" },
            { "id": "7731" }
        ]))
        .unwrap();
        assert_eq!(agents[0].id, "4120");
        assert_eq!(agents[0].name.as_deref(), Some("Activity Extractor"));
        assert_eq!(agents[1].id, "7731");
        assert!(agents[1].name.is_none());
    }

    #[test]
    fn missing_id_is_an_error() {
        let result = serde_json::from_value::<AgentRef>(serde_json::json!({ "name": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn container_list_tolerates_missing_array() {
        let list: ContainerListResponse = serde_json::from_value(serde_json::json!({
            "maxLimitReached": false
        }))
        .unwrap();
        assert!(list.containers.is_empty());
    }

    #[test]
    fn container_detail_reads_camel_case_fields() {
        let detail: ContainerDetail = serde_json::from_value(serde_json::json!({
            "id": "99",
            "agentId": 12,
            "status": "finished",
            "exitCode": 0,
            "createdAt": 1_700_000_000_000_i64
        }))
        .unwrap();
        assert_eq!(detail.agent_id.as_deref(), Some("12"));
        assert_eq!(detail.exit_code, Some(0));
        assert!(detail.ended_at.is_none());
    }
}
