//! Error types for the overlay engine.

use thiserror::Error;

/// A request to the backend failed
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid backend url {url}: {message}")]
    Url { url: String, message: String },
    /// Used by in-process backends that have no HTTP layer
    #[error("{0}")]
    Other(String),
}

/// The rule set could not be loaded. The whole load is abandoned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("note source {path} is unreachable: {source}")]
    Unreachable {
        path: String,
        #[source]
        source: BackendError,
    },
    #[error("note source {path} is malformed: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// The resource that failed
    pub fn path(&self) -> &str {
        match self {
            LoadError::Unreachable { path, .. } | LoadError::Malformed { path, .. } => path,
        }
    }
}

/// A single poll cycle failed
#[derive(Debug, Error)]
#[error("poll for client {client} failed: {source}")]
pub struct PollError {
    pub client: String,
    #[source]
    pub source: BackendError,
}

/// A note entry could not be rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("note {id} has an unterminated tag at byte {offset}")]
    UnterminatedTag { id: String, offset: usize },
    #[error("note {id} is malformed at byte {offset}: {message}")]
    Malformed {
        id: String,
        offset: usize,
        message: String,
    },
}

#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] confy::ConfyError),
    #[error("invalid page url {url}: {message}")]
    PageUrl { url: String, message: String },
}
