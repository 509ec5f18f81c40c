use thiserror::Error;

/// Errors returned by the `PhantomBuster` API client.
#[derive(Debug, Error)]
pub enum PhantomBusterError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("PhantomBuster API returned {status} {reason} for {context}")]
    Status {
        status: u16,
        reason: String,
        context: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The client could not be configured (bad base URL or API key).
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}
