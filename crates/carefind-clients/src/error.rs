use thiserror::Error;

/// Errors returned by the external-service clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network, TLS, timeout, or non-2xx status from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered but reported an application-level error.
    #[error("{service} API error: {message}")]
    Api {
        service: &'static str,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed but its contents are unusable.
    #[error("invalid response for {context}: {reason}")]
    InvalidResponse { context: String, reason: String },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
