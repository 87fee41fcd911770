//! reqwest-backed [`Backend`]

use std::collections::HashMap;
use std::time::Duration;

use actnotes_types::{ClientData, ClientRequest};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use super::Backend;
use crate::error::BackendError;

const USER_AGENT: &str = concat!("actnotes/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the notes backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base: Url,
    client: Client,
}

impl HttpBackend {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base = Url::parse(server_url).map_err(|e| BackendError::Url {
            url: server_url.to_string(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(BackendError::Url {
                url: server_url.to_string(),
                message: "not a base url".to_string(),
            });
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Request {
                url: server_url.to_string(),
                source: e,
            })?;

        Ok(Self { base, client })
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        self.base.join(path).map_err(|e| BackendError::Url {
            url: path.to_string(),
            message: e.to_string(),
        })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<reqwest::Response, BackendError> {
        let response = request.send().await.map_err(|e| BackendError::Request {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_state(&self, client: &str) -> Result<Option<ClientData>, BackendError> {
        let url = self.url("/data")?;
        let request = self
            .client
            .post(url.clone())
            .json(&ClientRequest::new(client));
        let response = self.send(request, &url).await?;

        let mut data: HashMap<String, ClientData> =
            response.json().await.map_err(|e| BackendError::Decode {
                url: url.to_string(),
                source: e,
            })?;
        Ok(data.remove(client))
    }

    async fn reset(&self, client: &str) -> Result<(), BackendError> {
        let url = self.url("/reset")?;
        let request = self
            .client
            .post(url.clone())
            .json(&ClientRequest::new(client));
        self.send(request, &url).await?;
        debug!(client, "Reset sent");
        Ok(())
    }

    async fn fetch_text(&self, path: &str) -> Result<String, BackendError> {
        let url = self.url(path)?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        response.text().await.map_err(|e| BackendError::Decode {
            url: url.to_string(),
            source: e,
        })
    }
}
