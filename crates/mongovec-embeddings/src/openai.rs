use std::sync::Arc;

use async_trait::async_trait;
use mongovec_core::{Embeddings, MongovecError};
use serde_json::{json, Value};

use crate::backend::{ProviderBackend, ProviderRequest};

/// Configuration for [`OpenAiEmbeddings`].
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingsConfig {
    pub api_key: String,
    /// Model identifier (default: `text-embedding-3-small`).
    pub model: String,
    pub base_url: String,
    /// Requested output dimensionality. `None` lets the model decide.
    pub dimensions: Option<usize>,
}

impl OpenAiEmbeddingsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            dimensions: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

/// Embeddings from an OpenAI-compatible `/embeddings` endpoint.
///
/// Each call sends the configured model identifier and, when set, the
/// requested dimensionality, so every vector has the same length.
pub struct OpenAiEmbeddings {
    config: OpenAiEmbeddingsConfig,
    backend: Arc<dyn ProviderBackend>,
}

impl OpenAiEmbeddings {
    pub fn new(config: OpenAiEmbeddingsConfig, backend: Arc<dyn ProviderBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &OpenAiEmbeddingsConfig {
        &self.config
    }

    fn build_request(&self, input: Vec<String>) -> ProviderRequest {
        let mut body = json!({
            "model": self.config.model,
            "input": input,
        });
        if let Some(dimensions) = self.config.dimensions {
            body["dimensions"] = json!(dimensions);
        }
        ProviderRequest {
            url: format!("{}/embeddings", self.config.base_url.trim_end_matches('/')),
            headers: vec![
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.config.api_key),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        }
    }
}

fn parse_response(body: &Value) -> Result<Vec<Vec<f32>>, MongovecError> {
    let data = body
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| MongovecError::Embedding("missing 'data' field in response".to_string()))?;

    let mut embeddings = Vec::with_capacity(data.len());
    for item in data {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| MongovecError::Embedding("missing 'embedding' field".to_string()))?
            .iter()
            .map(|v| {
                v.as_f64().map(|f| f as f32).ok_or_else(|| {
                    MongovecError::Embedding(format!("non-numeric embedding component: {v}"))
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;
        embeddings.push(embedding);
    }

    Ok(embeddings)
}

#[async_trait]
impl Embeddings for OpenAiEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MongovecError> {
        let input: Vec<String> = texts.iter().map(|s| s.to_string()).collect();
        let request = self.build_request(input);
        let response = self.backend.send(request).await.map_err(|e| match e {
            MongovecError::Embedding(_) => e,
            other => MongovecError::Embedding(format!("OpenAI request: {other}")),
        })?;

        if response.status != 200 {
            tracing::error!(
                status = response.status,
                model = %self.config.model,
                "embedding request rejected"
            );
            return Err(MongovecError::Embedding(format!(
                "OpenAI API error ({}): {}",
                response.status, response.body
            )));
        }

        let embeddings = parse_response(&response.body)?;
        if embeddings.len() != texts.len() {
            return Err(MongovecError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, MongovecError> {
        let mut results = self.embed_documents(&[text]).await?;
        results
            .pop()
            .ok_or_else(|| MongovecError::Embedding("empty response".to_string()))
    }
}
