//! HTTP implementation of the one-shot transport.
//!
//! Each note becomes one POST of the JSON request to the configured address.
//! The POST runs on its own task, so the event loop never waits for it.  When
//! it finishes, exactly one activity-log entry is written:
//!
//! - any HTTP response (2xx or not): the response body, tagged with the status;
//! - no response at all (refused, reset, bad URL): a delivery failure.
//!
//! There are no retries and no timeouts.  Concurrent POSTs are independent and
//! may complete in any order.

use std::sync::Arc;

use async_trait::async_trait;
use notecast_core::{encode_request, NoteRequest};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::application::activity::ActivityLog;
use crate::application::deliver::{OneShotTransport, SendError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OneShotError {
    /// The request never produced an HTTP response.
    #[error("request to {address} failed: {reason}")]
    Network { address: String, reason: String },
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneShotResponse {
    pub status: u16,
    pub body: String,
}

/// Performs a single POST.  Split out so the transport can be exercised
/// without a network.
#[async_trait]
pub trait OneShotClient: Send + Sync {
    /// POSTs `body` as `application/json` to `address`.
    ///
    /// # Errors
    ///
    /// [`OneShotError::Network`] if no response was received.
    async fn post(&self, address: &str, body: String) -> Result<OneShotResponse, OneShotError>;
}

/// [`OneShotClient`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OneShotClient for ReqwestClient {
    async fn post(&self, address: &str, body: String) -> Result<OneShotResponse, OneShotError> {
        let network = |e: reqwest::Error| OneShotError::Network {
            address: address.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .inner
            .post(address)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(network)?;
        let status = response.status().as_u16();
        // The status arrived, so a broken body is still an HTTP response.
        let body = response.text().await.unwrap_or_else(|e| {
            debug!(%address, status, "failed to read response body: {e}");
            String::new()
        });
        Ok(OneShotResponse { status, body })
    }
}

pub struct HttpTransport {
    client: Arc<dyn OneShotClient>,
    log: ActivityLog,
}

impl HttpTransport {
    pub fn new(client: Arc<dyn OneShotClient>, log: ActivityLog) -> Self {
        Self { client, log }
    }

    /// Spawns the POST for `request` and returns its task.
    ///
    /// # Errors
    ///
    /// [`SendError::NotConfigured`] for a blank address, in which case nothing
    /// is spawned.
    pub fn post(
        &self,
        address: &str,
        request: &NoteRequest,
    ) -> Result<JoinHandle<Result<OneShotResponse, OneShotError>>, SendError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(SendError::NotConfigured);
        }
        let body = encode_request(request)?;
        debug!(%address, payload = %body, "posting note");

        let client = Arc::clone(&self.client);
        let log = self.log.clone();
        let address = address.to_string();
        Ok(tokio::spawn(async move {
            let result = client.post(&address, body).await;
            match &result {
                Ok(response) => log.response(response.status, response.body.clone()),
                Err(e) => log.delivery_failed(e),
            }
            result
        }))
    }
}

impl OneShotTransport for HttpTransport {
    fn send(&self, address: &str, request: &NoteRequest) -> Result<(), SendError> {
        self.post(address, request).map(drop)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
