use std::error::Error;
use std::fmt;

/// Typed failure of one upstream fetch. Nothing past the gateway boundary
/// throws; every failure is one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Required credential missing or invalid before any network call.
    Config(String),
    /// DNS, connection, or other transport-level failure.
    Transport(String),
    /// The bounded request timeout elapsed.
    Timeout,
    /// Non-2xx HTTP status from Rakuten.
    Upstream { status: Option<u16>, message: String },
    /// The body was not the JSON shape we expect.
    Decode(String),
}

impl FetchError {
    pub fn is_config(&self) -> bool {
        matches!(self, FetchError::Config(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Config(msg) => write!(f, "Configuration error: {msg}"),
            FetchError::Transport(msg) => write!(f, "Transport error: {msg}"),
            FetchError::Timeout => write!(f, "Request timed out"),
            FetchError::Upstream {
                status: Some(status),
                message,
            } => write!(f, "Upstream error ({status}): {message}"),
            FetchError::Upstream { status: None, message } => {
                write!(f, "Upstream error: {message}")
            }
            FetchError::Decode(msg) => write!(f, "Decode error: {msg}"),
        }
    }
}

impl Error for FetchError {}
