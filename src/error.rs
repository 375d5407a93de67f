use thiserror::Error;

/// Failure taxonomy shared by the feed, the write endpoint and the proxy.
///
/// Messages are kept as owned strings so errors can be cloned into pipeline
/// events and re-emitted in proxy responses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Network or HTTP failure reaching an external endpoint.
    #[error("transport error: {0}")]
    Transport(String),

    /// Payload does not match the expected envelope or structure.
    #[error("format error: {0}")]
    Format(String),

    /// A required endpoint URL is absent.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CatalogError {
    pub fn transport(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Transport(format!("{}: {}", context, err))
    }

    pub fn format(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Format(format!("{}: {}", context, err))
    }

    /// Human-readable message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(msg) | Self::Format(msg) | Self::Configuration(msg) => msg,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}
