use serde_json::json;

use super::*;

fn camel_record() -> Value {
    json!({
        "postUrl": "https://www.linkedin.com/feed/update/urn:li:activity:1",
        "type": "Article",
        "imgUrl": "https://media.example.com/1.jpg",
        "postContent": "Shipping day 🚀\n#rust #release",
        "likeCount": 12,
        "commentCount": "3",
        "repostCount": null,
        "postDate": "2w",
        "action": "Post",
        "profileUrl": "https://www.linkedin.com/in/jane",
        "timestamp": "2024-03-01T09:00:00.000Z",
        "postTimestamp": "2024-02-15T18:30:00.000Z"
    })
}

#[test]
fn camel_case_record_maps_every_field() {
    let activity = parse_activity(camel_record(), "agent-1", "container-9").unwrap();

    assert_eq!(
        activity.post_url,
        "https://www.linkedin.com/feed/update/urn:li:activity:1"
    );
    assert_eq!(activity.activity_type, "Article");
    assert_eq!(activity.img_url.as_deref(), Some("https://media.example.com/1.jpg"));
    assert!(activity.video_url.is_none());
    assert_eq!(activity.like_count, 12);
    assert_eq!(activity.comment_count, 3);
    assert_eq!(activity.repost_count, 0);
    assert_eq!(activity.post_date.as_deref(), Some("2w"));
    assert_eq!(activity.profile_url, "https://www.linkedin.com/in/jane");
    assert_eq!(activity.post_timestamp.to_string(), "2024-02-15 18:30:00");
    assert_eq!(activity.agent_id.as_deref(), Some("agent-1"));
    assert_eq!(activity.container_id.as_deref(), Some("container-9"));
}

#[test]
fn snake_and_camel_spellings_produce_the_same_activity() {
    let snake = json!({
        "post_url": "https://www.linkedin.com/feed/update/urn:li:activity:1",
        "type": "Article",
        "img_url": "https://media.example.com/1.jpg",
        "post_content": "Shipping day 🚀\n#rust #release",
        "like_count": 12,
        "comment_count": 3,
        "post_date": "2w",
        "action": "Post",
        "profile_url": "https://www.linkedin.com/in/jane",
        "timestamp": "2024-03-01T09:00:00.000Z",
        "post_timestamp": "2024-02-15T18:30:00.000Z"
    });

    let from_camel = parse_activity(camel_record(), "a", "c").unwrap();
    let from_snake = parse_activity(snake, "a", "c").unwrap();
    assert_eq!(from_camel, from_snake);
}

#[test]
fn absent_optional_fields_take_defaults() {
    let record = json!({
        "postUrl": "https://example.com/p/1",
        "profileUrl": "https://example.com/u/1",
        "timestamp": "2024-01-01",
        "postTimestamp": "2024-01-01"
    });
    let activity = parse_activity(record, "a", "c").unwrap();

    assert_eq!(activity.activity_type, "Unknown");
    assert_eq!(activity.action, "Unknown");
    assert_eq!(activity.post_content, "");
    assert_eq!(activity.like_count, 0);
    assert_eq!(activity.comment_count, 0);
    assert_eq!(activity.repost_count, 0);
    assert!(activity.post_date.is_none());
}

#[test]
fn stamped_attribution_overrides_record_ids() {
    let mut record = camel_record();
    record["agentId"] = json!(555);
    record["containerId"] = json!("stale");
    let activity = parse_activity(record, "agent-1", "container-9").unwrap();
    assert_eq!(activity.agent_id.as_deref(), Some("agent-1"));
    assert_eq!(activity.container_id.as_deref(), Some("container-9"));
}

#[test]
fn record_ids_are_kept_when_no_attribution_is_supplied() {
    let mut record = camel_record();
    record["agentId"] = json!(555);
    let raw: RawActivity = serde_json::from_value(record).unwrap();
    let activity = raw.into_activity(None, None).unwrap();
    assert_eq!(activity.agent_id.as_deref(), Some("555"));
    assert!(activity.container_id.is_none());
}

#[test]
fn missing_post_url_is_reported() {
    let mut record = camel_record();
    record.as_object_mut().unwrap().remove("postUrl");
    assert_eq!(
        parse_activity(record, "a", "c"),
        Err(ActivityParseError::MissingField("post_url"))
    );
}

#[test]
fn blank_profile_url_counts_as_missing() {
    let mut record = camel_record();
    record["profileUrl"] = json!("  ");
    assert_eq!(
        parse_activity(record, "a", "c"),
        Err(ActivityParseError::MissingField("profile_url"))
    );
}

#[test]
fn unparseable_timestamp_is_an_invalid_field() {
    let mut record = camel_record();
    record["postTimestamp"] = json!("last tuesday");
    let err = parse_activity(record, "a", "c").unwrap_err();
    assert!(
        matches!(err, ActivityParseError::InvalidField { field: "post_timestamp", .. }),
        "unexpected error: {err:?}"
    );
}

#[test]
fn negative_or_text_counts_are_rejected() {
    let mut negative = camel_record();
    negative["likeCount"] = json!(-4);
    assert!(matches!(
        parse_activity(negative, "a", "c"),
        Err(ActivityParseError::InvalidField { field: "like_count", .. })
    ));

    let mut text = camel_record();
    text["commentCount"] = json!("a few");
    assert!(matches!(
        parse_activity(text, "a", "c"),
        Err(ActivityParseError::InvalidField { field: "comment_count", .. })
    ));
}

#[test]
fn integral_float_counts_are_accepted() {
    let mut record = camel_record();
    record["repostCount"] = json!(7.0);
    assert_eq!(parse_activity(record, "a", "c").unwrap().repost_count, 7);
}

#[test]
fn non_object_record_is_malformed() {
    assert!(matches!(
        parse_activity(json!(["not", "an", "object"]), "a", "c"),
        Err(ActivityParseError::Malformed(_))
    ));
}

#[test]
fn id_to_string_handles_numbers_and_strings() {
    assert_eq!(id_to_string(&json!(42)), Some("42".to_string()));
    assert_eq!(id_to_string(&json!(" 42 ")), Some("42".to_string()));
    assert_eq!(id_to_string(&json!("")), None);
    assert_eq!(id_to_string(&json!(null)), None);
}
