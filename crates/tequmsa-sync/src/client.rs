//! HTTP client for a running relay

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tequmsa_engine::EvolutionReport;
use tracing::debug;
use uuid::Uuid;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed with {status}: {message}")]
    RequestFailed { status: StatusCode, message: String },

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct DispatchResponse {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    updates: Vec<Value>,
}

#[derive(Clone, Debug)]
pub struct SyncClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SyncClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Push an update; returns the id the relay assigned.
    pub async fn push_update(&self, payload: &Value) -> ClientResult<Uuid> {
        let request = self.client.post(self.url("/api/updates")).json(payload);
        let response = check(self.authorized(request).send().await?).await?;
        let body: DispatchResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        debug!("Pushed update {}", body.id);
        Ok(body.id)
    }

    /// Pull retained update payloads, optionally only those after `since`.
    pub async fn pull_updates(&self, since: Option<Uuid>) -> ClientResult<Vec<Value>> {
        let mut request = self.client.get(self.url("/api/pull_updates"));
        if let Some(id) = since {
            request = request.query(&[("since", id.to_string())]);
        }
        let response = check(request.send().await?).await?;
        let body: PullResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(body.updates)
    }

    pub async fn health(&self) -> ClientResult<Value> {
        let response = check(self.client.get(self.url("/health")).send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    pub async fn evolve(&self, entity_id: &str, frequency: f64) -> ClientResult<EvolutionReport> {
        let request = self
            .client
            .post(self.url("/api/evolve"))
            .json(&json!({ "entity_id": entity_id, "frequency": frequency }));
        let response = check(self.authorized(request).send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

/// Map non-success statuses to errors, using the relay's `{"error": …}` body.
async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: Value = response.json().await.unwrap_or_default();
    let message = body["error"].as_str().unwrap_or("unknown error").to_string();
    if status == StatusCode::UNAUTHORIZED {
        Err(ClientError::AuthFailed(message))
    } else {
        Err(ClientError::RequestFailed { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = SyncClient::new("http://127.0.0.1:3080/");
        assert_eq!(client.base_url(), "http://127.0.0.1:3080");
        assert_eq!(client.url("/health"), "http://127.0.0.1:3080/health");
    }
}
