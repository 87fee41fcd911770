use std::sync::Arc;

use actnotes_types::ClientData;

use crate::backend::Backend;
use crate::error::PollError;

/// Fetches the current state of one backend client
#[derive(Clone)]
pub struct StatePoller {
    backend: Arc<dyn Backend>,
    client: String,
}

impl StatePoller {
    pub fn new(backend: Arc<dyn Backend>, client: impl Into<String>) -> Self {
        Self {
            backend,
            client: client.into(),
        }
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    /// One fetch. `Ok(None)` when the backend has nothing for this client yet.
    pub async fn poll(&self) -> Result<Option<ClientData>, PollError> {
        self.backend
            .fetch_state(&self.client)
            .await
            .map_err(|source| PollError {
                client: self.client.clone(),
                source,
            })
    }
}
