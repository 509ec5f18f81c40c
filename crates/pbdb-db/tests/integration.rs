//! Offline unit tests for pbdb-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::{NaiveDate, Utc};
use pbdb_core::{Activity, AppConfig, Environment};
use pbdb_db::{ActivityRow, DbError, PoolConfig, SyncRunCounts, SyncRunRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        phantombuster_api_key: None,
        phantombuster_base_url: "http://localhost".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        api_request_timeout_secs: 30,
        api_max_retries: 3,
        api_retry_backoff_base_ms: 1000,
        sync_max_concurrent_containers: 4,
        sync_cron: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn activity_row_converts_into_domain_activity() {
    let ts = NaiveDate::from_ymd_opt(2024, 3, 20)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let row = ActivityRow {
        id: 17,
        post_url: "https://www.linkedin.com/feed/update/urn:li:activity:1".to_string(),
        activity_type: "Post".to_string(),
        video_url: None,
        img_url: Some("https://media.example/1.jpg".to_string()),
        post_content: "Hello #rust".to_string(),
        like_count: 12,
        comment_count: 3,
        repost_count: 1,
        post_date: Some("2w".to_string()),
        action: "Posted".to_string(),
        profile_url: "https://www.linkedin.com/in/jane".to_string(),
        timestamp: ts,
        post_timestamp: ts,
        agent_id: Some("4120".to_string()),
        container_id: Some("c-1".to_string()),
        created_at: Utc::now(),
    };

    let activity = Activity::from(row);
    assert_eq!(activity.activity_type, "Post");
    assert_eq!(activity.like_count, 12);
    assert!(activity.has_visual());
    assert_eq!(activity.agent_id.as_deref(), Some("4120"));
    assert_eq!(activity.container_id.as_deref(), Some("c-1"));
}

/// Compile-time smoke test: confirm that [`SyncRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn sync_run_row_has_expected_fields() {
    let row = SyncRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        containers_discovered: 0_i32,
        containers_new: 0,
        containers_fetched: 0,
        containers_failed: 0,
        records_parsed: 0,
        records_invalid: 0,
        records_inserted: 0,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert_eq!(SyncRunCounts::default().records_inserted, 0);
}

#[test]
fn invalid_transition_error_names_expected_status() {
    let err = DbError::InvalidSyncRunTransition {
        id: 5,
        expected_status: "running",
    };
    assert_eq!(
        err.to_string(),
        "sync run 5 is not in the expected 'running' status"
    );
}
