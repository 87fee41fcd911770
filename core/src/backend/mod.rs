//! Backend access
//!
//! The engine talks to the backend only through the [`Backend`] trait so the
//! poll loop and rule loading can run against an in-memory backend in tests.

mod http;

pub use http::HttpBackend;

use actnotes_types::ClientData;
use async_trait::async_trait;

use crate::error::BackendError;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Current state for `client` from `POST /data`.
    ///
    /// `Ok(None)` means the backend has no data for that client yet.
    async fn fetch_state(&self, client: &str) -> Result<Option<ClientData>, BackendError>;

    /// `POST /reset` for `client`. The response is not inspected.
    async fn reset(&self, client: &str) -> Result<(), BackendError>;

    /// Raw body of `GET {path}`, resolved against the backend root.
    async fn fetch_text(&self, path: &str) -> Result<String, BackendError>;
}
