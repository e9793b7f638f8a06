//! MongoDB Atlas Vector Search helpers.
//!
//! This crate provides:
//! - [`MongoClient`]: an adapter over a [`DatabaseGateway`] adding
//!   discovery, idempotent collection and search index provisioning,
//!   index readiness polling and embedding-based semantic search.
//! - [`MongoGateway`]: the [`DatabaseGateway`] backed by the official
//!   `mongodb` driver.
//! - [`IndexReadinessPoller`]: the bounded poll loop behind
//!   [`MongoClient::wait_for_search_index`].
//!
//! Write paths (provisioning, index creation, ingestion) return errors.
//! Read paths ([`MongoClient::index_exists`], the search pipeline) log and
//! degrade to `false` or an empty result.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mongovec_mongodb::{MongoClient, MongoConfig, PollPolicy, Similarity};
//! # use mongovec_core::Embeddings;
//!
//! # async fn example(embeddings: Arc<dyn Embeddings>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = MongoClient::from_uri("mongodb+srv://...", embeddings.clone(), MongoConfig::default()).await?;
//! client
//!     .ensure_search_index("kb", "docs", "vec_idx", embeddings.as_ref(), Similarity::Cosine)
//!     .await?;
//! let state = client
//!     .wait_for_search_index("kb", "docs", "vec_idx", &PollPolicy::default())
//!     .await;
//! let hits = client.search("hello", 5, "kb", "docs", "vec_idx", None).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod convert;
mod gateway;
mod index;
mod readiness;

pub use client::{MongoClient, SENTINEL_ID};
pub use config::{MongoConfig, PollPolicy, MAX_NUM_CANDIDATES};
pub use gateway::{map_driver_error, CollectionRef, DatabaseGateway, MongoGateway};
pub use index::{SearchIndexDefinition, Similarity};
pub use readiness::{IndexReadiness, IndexReadinessPoller};

// Re-export core types for convenience.
pub use mongovec_core::{Document, Embeddings, MongovecError, SearchResult};
