use crate::config::Config;
use crate::errors::{ClientError, ResultExt};
use crate::models::{HealthStatus, Note, PredictionRequest, PredictionResult};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for the Prediction and Notes services.
///
/// Both collaborators live under one base address. Every non-2xx status is
/// reported as [`ClientError::Request`] regardless of code or body.
#[derive(Debug, Clone)]
pub struct MatchApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl MatchApiClient {
    /// Creates a new `MatchApiClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the services, e.g. `http://localhost:8000`.
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ClientError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
        .with_context(|| format!("building client for {}", config.api_base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-2xx response into a `Request` error carrying status and body.
    async fn ensure_success(response: Response, operation: &str) -> Result<Response, ClientError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!("{} returned error {}: {}", operation, status, error_text);
        Err(ClientError::Request(format!(
            "{} failed with status {}: {}",
            operation, status, error_text
        )))
    }

    async fn decode<T: DeserializeOwned>(response: Response, operation: &str) -> Result<T, ClientError> {
        response.json().await.map_err(|e| {
            ClientError::Request(format!("Failed to parse {} response: {}", operation, e))
        })
    }

    /// Checks that the services are reachable.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.url("/health");
        tracing::debug!("Checking service health: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Request(format!("Health check failed: {}", e)))?;

        let response = Self::ensure_success(response, "Health check").await?;
        Self::decode(response, "health").await
    }

    /// Lists every stored prediction, in server order.
    pub async fn list_predictions(&self) -> Result<Vec<PredictionResult>, ClientError> {
        let url = self.url("/predictions");
        tracing::info!("Fetching predictions: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Request(format!("Prediction list request failed: {}", e)))?;

        let response = Self::ensure_success(response, "Prediction list").await?;
        let predictions: Vec<PredictionResult> = Self::decode(response, "prediction list").await?;

        tracing::info!("Fetched {} predictions", predictions.len());
        Ok(predictions)
    }

    /// Requests a score for one subject pair.
    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ClientError> {
        let url = self.url("/predict");
        tracing::info!(
            "Requesting prediction for {} & {}",
            request.primary.name,
            request.secondary.name
        );

        let response = self
            .client
            .post(&url)
            .json(&request.to_payload())
            .send()
            .await
            .map_err(|e| ClientError::Request(format!("Prediction request failed: {}", e)))?;

        let response = Self::ensure_success(response, "Prediction").await?;
        let result: PredictionResult = Self::decode(response, "prediction").await?;

        tracing::debug!(
            "Prediction for {} & {}: {}",
            result.primary_name,
            result.secondary_name,
            result.score
        );
        Ok(result)
    }

    /// Deletes a stored prediction by its server id.
    pub async fn delete_prediction(&self, id: i64) -> Result<(), ClientError> {
        let url = self.url(&format!("/predictions/{}", id));
        tracing::info!("Deleting prediction {}", id);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| ClientError::Request(format!("Prediction delete failed: {}", e)))?;

        Self::ensure_success(response, "Prediction delete").await?;
        Ok(())
    }

    /// Lists every note, in server order.
    pub async fn list_notes(&self) -> Result<Vec<Note>, ClientError> {
        let url = self.url("/notes");
        tracing::info!("Fetching notes: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Request(format!("Notes request failed: {}", e)))?;

        let response = Self::ensure_success(response, "Notes list").await?;
        Self::decode(response, "notes list").await
    }

    /// Creates a note. The text travels as the `text` query parameter.
    pub async fn create_note(&self, text: &str) -> Result<Note, ClientError> {
        // parse_with_params percent-encodes the note text
        let url = reqwest::Url::parse_with_params(&self.url("/notes"), &[("text", text)])?;
        tracing::info!("Creating note ({} chars)", text.chars().count());

        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| ClientError::Request(format!("Note creation failed: {}", e)))?;

        let response = Self::ensure_success(response, "Note creation").await?;
        let note: Note = Self::decode(response, "note creation").await?;

        tracing::info!("✓ Note created: {}", note.id);
        Ok(note)
    }

    /// Deletes a note by its server id. Any 2xx body is accepted.
    pub async fn delete_note(&self, id: i64) -> Result<(), ClientError> {
        let url = self.url(&format!("/notes/{}", id));
        tracing::info!("Deleting note {}", id);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| ClientError::Request(format!("Note delete failed: {}", e)))?;

        Self::ensure_success(response, "Note delete").await?;
        tracing::info!("✓ Note {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MatchApiClient::new("https://example.com/", Duration::from_secs(5));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url(), "https://example.com");
    }

    #[test]
    fn test_client_rejects_invalid_url() {
        let client = MatchApiClient::new("not a url", Duration::from_secs(5));
        assert!(client.unwrap_err().is_invalid_configuration());
    }
}
