use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gateway error taxonomy. Every failure a tool call can see is one of
/// these; nothing is swallowed between the upstream API and the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Bad or missing configuration: unrecognized store id, missing
    /// credential, invalid rate-limit settings. Detected at startup or at
    /// the first operation that needs the missing piece; never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Timeout or connection failure that survived the executor's retry
    /// budget. Retryable from the caller's side; the gateway itself stops
    /// at the configured bound.
    #[error("network failure after {attempts} attempt(s): {message}")]
    TransientNetwork { attempts: u32, message: String },

    /// Application-level rejection from the partner API (invalid order
    /// code, daily quota exceeded, ...). Carries the upstream code and
    /// message verbatim; not transient, never auto-retried.
    #[error("upstream api error [{code}]: {message}")]
    UpstreamApi {
        code: String,
        message: String,
        /// HTTP status the envelope arrived with, when there was one.
        status: Option<u16>,
    },

    /// A sandbox-only operation was invoked while the environment mode is
    /// production. Fails before any validation, permit or network access.
    #[error("operation '{0}' is only available in sandbox environment")]
    UnsupportedOperation(String),

    /// The operation's own pre-flight input validation failed. Maps to
    /// JSON-RPC invalid-params semantics at the tool boundary.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Wire shape for tool-facing failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorShape {
    pub code: String,
    pub message: String,
    pub retriable: bool,
}

impl Error {
    pub fn upstream(code: impl Into<String>, message: impl Into<String>, status: Option<u16>) -> Self {
        Error::UpstreamApi {
            code: code.into(),
            message: message.into(),
            status,
        }
    }

    /// True when a caller could reasonably try the same call again.
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::TransientNetwork { .. } => true,
            // 429 and 5xx style upstream codes are transient on the
            // upstream side even though the gateway never retries them.
            Error::UpstreamApi { code, .. } => {
                code == "rate_limited" || code == "upstream_error"
            }
            _ => false,
        }
    }

    /// Flatten to the tool-facing shape. Upstream errors keep their
    /// original code; local kinds use a fixed vocabulary.
    pub fn shape(&self) -> ErrorShape {
        let code = match self {
            Error::Configuration(_) => "configuration_error".to_string(),
            Error::TransientNetwork { .. } => "transient_network".to_string(),
            Error::UpstreamApi { code, .. } => code.clone(),
            Error::UnsupportedOperation(_) => "unsupported_operation".to_string(),
            Error::InvalidInput(_) => "invalid_input".to_string(),
        };
        let message = match self {
            Error::UpstreamApi { message, .. } => message.clone(),
            other => other.to_string(),
        };
        ErrorShape {
            code,
            message,
            retriable: self.is_retriable(),
        }
    }
}
