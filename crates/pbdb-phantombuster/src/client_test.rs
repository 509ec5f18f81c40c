use super::*;

fn test_client(base_url: &str) -> PhantomBusterClient {
    PhantomBusterClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
}

#[test]
fn build_url_appends_path_to_base_without_trailing_slash() {
    let client = test_client("https://api.phantombuster.com/api/v2");
    let url = client.build_url("agents/fetch-all", &[]).unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.phantombuster.com/api/v2/agents/fetch-all"
    );
}

#[test]
fn build_url_keeps_base_with_trailing_slash() {
    let client = test_client("https://api.phantombuster.com/api/v2/");
    let url = client
        .build_url("containers/fetch-all", &[("agentId", "4120")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.phantombuster.com/api/v2/containers/fetch-all?agentId=4120"
    );
}

#[test]
fn build_url_encodes_query_values() {
    let client = test_client("https://api.phantombuster.com/api/v2");
    let url = client
        .build_url("containers/fetch", &[("id", "a b&c")])
        .unwrap();
    assert!(
        url.as_str().ends_with("id=a+b%26c"),
        "query value should be form-encoded: {url}"
    );
}

#[test]
fn invalid_base_url_is_a_config_error() {
    let err = PhantomBusterClient::with_base_url("k", 30, "not a url").unwrap_err();
    assert!(matches!(err, PhantomBusterError::InvalidConfig(_)));
}

#[test]
fn api_key_with_newline_is_rejected() {
    let err = PhantomBusterClient::with_base_url("bad\nkey", 30, "http://localhost").unwrap_err();
    assert!(matches!(err, PhantomBusterError::InvalidConfig(_)));
}

#[test]
fn decode_result_object_handles_absent_payloads() {
    assert!(decode_result_object(None, "t").unwrap().is_empty());
    assert!(decode_result_object(Some(""), "t").unwrap().is_empty());
    assert!(decode_result_object(Some("  "), "t").unwrap().is_empty());
    assert!(decode_result_object(Some("null"), "t").unwrap().is_empty());
}

#[test]
fn decode_result_object_parses_embedded_array() {
    let records = decode_result_object(Some(r#"[{"postUrl":"u1"},{"postUrl":"u2"}]"#), "t").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["postUrl"], "u2");
}

#[test]
fn decode_result_object_rejects_non_array() {
    let err = decode_result_object(Some(r#"{"postUrl":"u1"}"#), "t").unwrap_err();
    assert!(matches!(err, PhantomBusterError::Deserialize { .. }));
}

#[test]
fn api_error_message_reads_error_field() {
    assert_eq!(
        api_error_message(r#"{"status":"error","error":"Agent not found"}"#).as_deref(),
        Some("Agent not found")
    );
    assert!(api_error_message("<html>").is_none());
}
