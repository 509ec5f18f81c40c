//! Integration tests for `PhantomBusterClient` using wiremock HTTP mocks.

use pbdb_phantombuster::{PhantomBusterClient, PhantomBusterError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> PhantomBusterClient {
    PhantomBusterClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
        .with_retry(2, 0)
}

#[tokio::test]
async fn list_agents_sends_key_and_parses_ids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agents/fetch-all"))
        .and(header("X-Phantombuster-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "4120", "name": "LinkedIn Activity Extractor" },
            { "id": 7731, "name": "Profile Scraper" }
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let agents = client.list_agents().await.expect("should list agents");

    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0].id, "4120");
    assert_eq!(agents[1].id, "7731");
}

#[tokio::test]
async fn list_containers_tags_each_with_agent_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/containers/fetch-all"))
        .and(query_param("agentId", "4120"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "containers": [
                { "id": "c-1", "status": "finished" },
                { "id": 2002, "status": "running" }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let containers = client.list_containers("4120").await.unwrap();

    assert_eq!(containers.len(), 2);
    assert!(containers.iter().all(|c| c.agent_id == "4120"));
    assert_eq!(containers[1].id, "2002");
    assert_eq!(containers[0].status.as_deref(), Some("finished"));
}

#[tokio::test]
async fn get_result_decodes_string_encoded_records() {
    let server = MockServer::start().await;

    let records = serde_json::json!([
        { "postUrl": "https://linkedin.com/p/1", "likeCount": 4 },
        { "postUrl": "https://linkedin.com/p/2", "likeCount": "7" }
    ]);
    Mock::given(method("GET"))
        .and(path("/containers/fetch-result-object"))
        .and(query_param("id", "c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "resultObject": records.to_string()
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.get_result("c-1").await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0]["postUrl"], "https://linkedin.com/p/1");
}

#[tokio::test]
async fn get_result_with_null_result_object_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/containers/fetch-result-object"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "resultObject": null })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.get_result("c-9").await.unwrap().is_empty());
}

#[tokio::test]
async fn not_found_surfaces_api_error_message_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agents/fetch"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "status": "error",
            "error": "Agent not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_agent("missing").await.unwrap_err();

    match err {
        PhantomBusterError::Status { status, reason, .. } => {
            assert_eq!(status, 404);
            assert_eq!(reason, "Agent not found");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agents/fetch-all"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.list_agents().await.unwrap_err();

    assert!(matches!(err, PhantomBusterError::Status { status: 503, .. }));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agents/fetch-all"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.list_agents().await.unwrap_err();

    assert!(matches!(err, PhantomBusterError::Deserialize { .. }));
}

#[tokio::test]
async fn fetch_container_reads_detail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/containers/fetch"))
        .and(query_param("id", "c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "c-1",
            "agentId": "4120",
            "status": "finished",
            "exitCode": 0
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let detail = client.fetch_container("c-1").await.unwrap();
    assert_eq!(detail.agent_id.as_deref(), Some("4120"));
    assert_eq!(detail.exit_code, Some(0));
}
