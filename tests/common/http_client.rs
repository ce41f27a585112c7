//! HTTP client helpers for tests.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use leadscore::LEADSCORE_STATUS_HEADER;
use leadscore::gateway::PredictResponse;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

#[derive(Clone)]
pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

/// Raw response: status code, status header and JSON body.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub status_header: String,
    pub body: Value,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    async fn into_raw(resp: reqwest::Response) -> Result<RawResponse, TestClientError> {
        let status = resp.status().as_u16();
        let status_header = resp
            .headers()
            .get(LEADSCORE_STATUS_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let body = resp.json().await?;

        Ok(RawResponse {
            status,
            status_header,
            body,
        })
    }

    /// Scores `profile_text`, failing on any non-200 response.
    pub async fn predict(&self, profile_text: &str) -> Result<f64, TestClientError> {
        let resp = self
            .client
            .post(self.url("/predict"))
            .json(&serde_json::json!({ "profile_text": profile_text }))
            .send()
            .await?;

        match resp.status().as_u16() {
            200 => {
                let body: PredictResponse = resp.json().await?;
                Ok(body.score)
            }
            400 => Err(TestClientError::BadRequest(resp.text().await?)),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(TestClientError::UnexpectedStatus(status, body))
            }
        }
    }

    /// Posts an arbitrary JSON body to `/predict`.
    pub async fn predict_json(&self, body: &Value) -> Result<RawResponse, TestClientError> {
        let resp = self
            .client
            .post(self.url("/predict"))
            .json(body)
            .send()
            .await?;
        Self::into_raw(resp).await
    }

    /// Posts raw bytes to `/predict` with a JSON content type.
    pub async fn predict_raw(&self, body: &'static str) -> Result<RawResponse, TestClientError> {
        let resp = self
            .client
            .post(self.url("/predict"))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;
        Self::into_raw(resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        let resp = self.client.get(self.url("/healthz")).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }

    pub async fn ready(&self) -> Result<ReadyResponse, TestClientError> {
        let resp = self.client.get(self.url("/ready")).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

#[derive(Debug, Deserialize)]
pub struct ComponentStatus {
    pub http: String,
    pub encoder: String,
    pub encoder_mode: String,
    pub device: String,
    pub hidden_size: usize,
    pub booster: String,
    pub num_trees: usize,
    pub objective: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unexpected status {0}: {1}")]
    UnexpectedStatus(u16, String),
}
