//! Client for the prediction service.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use super::{build_http, ClientError, REQUEST_TIMEOUT};
use crate::engine::FeatureTable;

/// Feature columns a client sends when none are configured.
pub const DEFAULT_CLIENT_FEATURES: &[&str] = &["distance_from_net"];

/// Body of a successful swap response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SwapResponse {
    pub status: String,
    pub model: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServingClient {
    base_url: String,
    features: Vec<String>,
    http: reqwest::Client,
}

impl ServingClient {
    /// Client for the service at `http://{ip}:{port}`.
    pub fn new(ip: &str, port: u16) -> Result<Self, ClientError> {
        Self::with_base_url(format!("http://{}:{}", ip, port))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!(base_url = %base_url, "initializing serving client");
        Ok(Self {
            base_url,
            features: DEFAULT_CLIENT_FEATURES.iter().map(|s| s.to_string()).collect(),
            http: build_http(REQUEST_TIMEOUT)?,
        })
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Feature columns this client is configured for.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Query the service. Returns one probability per input row, in input order.
    pub async fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>, ClientError> {
        let url = format!("{}/predict", self.base_url);
        info!(url = %url, rows = table.n_rows(), "sending prediction request");

        let body = self.send(self.http.post(&url).json(&table.to_json()), "prediction").await?;
        let predictions = body
            .get("predictions")
            .and_then(Value::as_array)
            .ok_or_else(|| ClientError::UnexpectedResponse(body.to_string()))?;

        let values = predictions
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| ClientError::UnexpectedResponse(body.to_string()))?;

        if values.len() != table.n_rows() {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected {} predictions, got {}",
                table.n_rows(),
                values.len()
            )));
        }
        Ok(values)
    }

    /// Select the configured feature columns from `table`, then predict.
    pub async fn predict_features(&self, table: &FeatureTable) -> Result<Vec<f64>, ClientError> {
        let selected = table
            .select(&self.features)
            .map_err(|e| ClientError::InvalidInput(e.to_string()))?;
        self.predict(&selected).await
    }

    /// Fetch the service log text.
    pub async fn logs(&self) -> Result<String, ClientError> {
        let url = format!("{}/logs", self.base_url);
        info!(url = %url, "requesting logs");

        let body = self.send(self.http.get(&url), "logs").await?;
        body.get("logs")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::UnexpectedResponse(body.to_string()))
    }

    /// Ask the service to swap to `model` at `version`.
    ///
    /// `workspace` is carried for registries that namespace collections;
    /// the service ignores it.
    pub async fn download_registry_model(
        &self,
        workspace: &str,
        model: &str,
        version: &str,
    ) -> Result<SwapResponse, ClientError> {
        let url = format!("{}/download_registry_model", self.base_url);
        let payload = json!({ "workspace": workspace, "model": model, "version": version });
        info!(url = %url, payload = %payload, "sending swap request");

        let body = self.send(self.http.post(&url).json(&payload), "model download").await?;
        serde_json::from_value(body.clone()).map_err(|_| ClientError::UnexpectedResponse(body.to_string()))
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Value, ClientError> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "failed to reach the {} endpoint", what);
            ClientError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "{} request failed", what);
            return Err(ClientError::Status { status: status.as_u16(), body });
        }

        Ok(response.json().await?)
    }
}
