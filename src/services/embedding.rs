//! Embedding service client.
//!
//! Thin typed wrapper over the embedding deployment. Dimensionality is
//! fixed per deployment and checked by the retrieval index at build time.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use super::Embedder;
use crate::error::{CoreError, CoreResult};

/// Client for the embedding service.
#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl EmbeddingClient {
    /// Create a new embedding service client.
    pub fn new(base_url: &Url, token: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = %base_url, "Embedding client initialized");

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn request_embeddings(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embeddings", self.base_url);

        debug!(url = %url, batch = texts.len(), "Embedding service request");

        let response = self
            .client
            .post(&url)
            .header("X-Internal-Token", &self.token)
            .json(&EmbedRequest { input: texts })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Embedding service request failed");
                CoreError::Internal(anyhow!("Embedding service unavailable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Embedding service error");
            return Err(CoreError::Internal(anyhow!(
                "Embedding service error: {}",
                status
            )));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse embedding service response");
            CoreError::Internal(anyhow!("Invalid embedding service response: {}", e))
        })?;

        if body.embeddings.len() != texts.len() {
            return Err(CoreError::Internal(anyhow!(
                "Embedding service returned {} vectors for {} inputs",
                body.embeddings.len(),
                texts.len()
            )));
        }

        Ok(body.embeddings)
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
        let mut vectors = self.request_embeddings(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| CoreError::Internal(anyhow!("Embedding service returned no vector")))
    }

    async fn embed_batch(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts).await
    }
}
