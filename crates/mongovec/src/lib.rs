//! mongovec: vector search helpers for MongoDB Atlas.
//!
//! This facade re-exports the workspace crates:
//!
//! | module | crate | feature |
//! |---|---|---|
//! | [`core`] | `mongovec-core` | always |
//! | [`embeddings`] | `mongovec-embeddings` | `embeddings` |
//! | [`mongodb`] | `mongovec-mongodb` | `mongodb` |

/// Core traits and types (always available).
pub mod core {
    pub use mongovec_core::*;
}

/// Embedding providers: OpenAI-compatible HTTP and deterministic fake.
#[cfg(feature = "embeddings")]
pub mod embeddings {
    pub use mongovec_embeddings::*;
}

/// Collection and search index provisioning, readiness polling, semantic search.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use mongovec_mongodb::*;
}

pub use mongovec_core::{Document, Embeddings, MongovecError, Result, SearchResult};
