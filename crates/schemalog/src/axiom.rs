//! Remote ingestion sink for Axiom.
//!
//! Best-effort batch delivery. Queueing, retry and durability are the
//! ingestion service's concern; a batch that fails to ship is reported and
//! dropped.

use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::{Record, Sink};

const DEFAULT_BASE_URL: &str = "https://api.axiom.co";
const DEFAULT_DATASET: &str = "logs";
const BATCH_SIZE: usize = 64;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced by the Axiom sink.
///
/// Reported through `tracing`, never propagated to logging callers.
#[derive(Debug, Error)]
pub enum AxiomError {
    /// HTTP transport failure.
    #[error("ingest request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service rejected the batch.
    #[error("ingest rejected with status {0}")]
    Rejected(reqwest::StatusCode),
    /// The HTTP client could not be constructed.
    #[error("http client unavailable")]
    ClientUnavailable,
}

/// Batching sink that ships records to an Axiom dataset.
pub struct AxiomSink {
    /// `None` when client construction failed; every batch then errors
    /// instead of the sink panicking at construction.
    client: Option<reqwest::blocking::Client>,
    base_url: String,
    dataset: String,
    token: String,
    buffer: Mutex<Vec<Value>>,
}

impl AxiomSink {
    /// Sink authenticating with `token`, taking the dataset and base URL
    /// from `AXIOM_DATASET` and `AXIOM_URL` when set.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        let dataset =
            std::env::var("AXIOM_DATASET").unwrap_or_else(|_| DEFAULT_DATASET.to_owned());
        let base_url = std::env::var("AXIOM_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        Self::with_endpoint(token, dataset, base_url)
    }

    /// Sink with an explicit dataset and base URL.
    #[must_use]
    pub fn with_endpoint(
        token: impl Into<String>,
        dataset: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = match reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
        {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::warn!(target: "schemalog", error = %err, "axiom client construction failed");
                None
            }
        };
        Self {
            client,
            base_url: base_url.into(),
            dataset: dataset.into(),
            token: token.into(),
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// Number of buffered records not yet shipped.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.lock().map(|buffer| buffer.len()).unwrap_or(0)
    }

    fn ingest_url(&self) -> String {
        format!(
            "{}/v1/datasets/{}/ingest",
            self.base_url.trim_end_matches('/'),
            self.dataset
        )
    }

    fn ship(&self, batch: &[Value]) -> Result<(), AxiomError> {
        let client = self.client.as_ref().ok_or(AxiomError::ClientUnavailable)?;
        let response = client
            .post(self.ingest_url())
            .bearer_auth(&self.token)
            .json(batch)
            .send()?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(AxiomError::Rejected(response.status()))
        }
    }

    fn drain_and_ship(&self) {
        let batch: Vec<Value> = match self.buffer.lock() {
            Ok(mut buffer) => buffer.drain(..).collect(),
            Err(_) => return,
        };
        if batch.is_empty() {
            return;
        }
        if let Err(err) = self.ship(&batch) {
            tracing::warn!(
                target: "schemalog",
                error = %err,
                dropped = batch.len(),
                "axiom ingest failed"
            );
        }
    }
}

impl Sink for AxiomSink {
    fn emit(&self, record: &Record) {
        let Ok(value) = serde_json::to_value(record) else {
            return;
        };
        let full = match self.buffer.lock() {
            Ok(mut buffer) => {
                buffer.push(value);
                buffer.len() >= BATCH_SIZE
            }
            Err(_) => return,
        };
        if full {
            self.drain_and_ship();
        }
    }

    fn flush(&self) {
        self.drain_and_ship();
    }
}

impl Drop for AxiomSink {
    fn drop(&mut self) {
        self.drain_and_ship();
    }
}
