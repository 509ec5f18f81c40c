use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub phantombuster_api_key: Option<String>,
    pub phantombuster_base_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub api_request_timeout_secs: u64,
    pub api_max_retries: u32,
    pub api_retry_backoff_base_ms: u64,
    pub sync_max_concurrent_containers: usize,
    pub sync_cron: Option<String>,
}

impl AppConfig {
    /// The upstream API subset of this configuration.
    #[must_use]
    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig {
            api_key: self.phantombuster_api_key.clone(),
            base_url: self.phantombuster_base_url.clone(),
            request_timeout_secs: self.api_request_timeout_secs,
            max_retries: self.api_max_retries,
            retry_backoff_base_ms: self.api_retry_backoff_base_ms,
        }
    }
}

/// Upstream API settings, loadable without any database configuration.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "phantombuster_api_key",
                &self.phantombuster_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("phantombuster_base_url", &self.phantombuster_base_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("api_request_timeout_secs", &self.api_request_timeout_secs)
            .field("api_max_retries", &self.api_max_retries)
            .field("api_retry_backoff_base_ms", &self.api_retry_backoff_base_ms)
            .field(
                "sync_max_concurrent_containers",
                &self.sync_max_concurrent_containers,
            )
            .field("sync_cron", &self.sync_cron)
            .finish()
    }
}
