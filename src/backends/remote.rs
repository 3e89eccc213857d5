//! HTTP JSON client for an external model server.
//!
//! The same client serves all three backend roles; which endpoint it points at
//! decides what it is used for.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::backend::{
    ArcScorer, ArcScores, BackendError, LabelScore, SequenceLabeler, TagScorer, TagScores,
};

/// A model served over HTTP.
pub struct RemoteModel {
    name: String,
    endpoint: String,
    timeout: Duration,
    client: Client,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    batch: &'a [Vec<String>],
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    predictions: Vec<Vec<LabelScore>>,
}

#[derive(Debug, Serialize)]
struct TokensRequest<'a> {
    tokens: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ArcsResponse {
    arcs: Vec<ArcScores>,
}

impl RemoteModel {
    /// Create a client for `endpoint` with a per-request timeout.
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            timeout,
            client,
        })
    }

    async fn post<Req, Resp>(&self, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        debug!("POST {} ({})", self.endpoint, self.name);
        let resp = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(self.timeout)
                } else {
                    BackendError::Connection(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!("{} returned HTTP {}: {}", self.name, status, message);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json()
            .await
            .map_err(|e| BackendError::MalformedOutput(e.to_string()))
    }
}

#[async_trait]
impl SequenceLabeler for RemoteModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn predict(&self, batch: &[Vec<String>]) -> Result<Vec<Vec<LabelScore>>, BackendError> {
        let resp: BatchResponse = self.post(&BatchRequest { batch }).await?;
        Ok(resp.predictions)
    }
}

#[async_trait]
impl TagScorer for RemoteModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn score(&self, tokens: &[String]) -> Result<TagScores, BackendError> {
        self.post(&TokensRequest { tokens }).await
    }
}

#[async_trait]
impl ArcScorer for RemoteModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn parse(&self, tokens: &[String]) -> Result<Vec<ArcScores>, BackendError> {
        let resp: ArcsResponse = self.post(&TokensRequest { tokens }).await?;
        Ok(resp.arcs)
    }
}
