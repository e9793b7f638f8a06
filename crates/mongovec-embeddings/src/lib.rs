//! Embedding providers for mongovec.
//!
//! - [`OpenAiEmbeddings`]: calls an OpenAI-compatible `/embeddings` endpoint
//!   with a model identifier and an optional output dimensionality.
//! - [`FakeEmbeddings`]: deterministic vectors for tests and offline demos.
//!
//! HTTP goes through a [`ProviderBackend`] so providers can be exercised
//! against a [`FakeBackend`] without a network.

pub mod backend;
mod fake;
mod openai;

pub use backend::{FakeBackend, HttpBackend, ProviderBackend, ProviderRequest, ProviderResponse};
pub use fake::FakeEmbeddings;
pub use openai::{OpenAiEmbeddings, OpenAiEmbeddingsConfig};

// Re-export the Embeddings trait from core.
pub use mongovec_core::Embeddings;
