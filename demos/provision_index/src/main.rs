//! Provision a vector search index and wait for it to become visible.
//!
//! ```sh
//! MONGODB_URI=mongodb+srv://... OPENAI_API_KEY=sk-... cargo run -p provision_index
//! ```

mod config;

use std::sync::Arc;

use mongovec::embeddings::{HttpBackend, OpenAiEmbeddings, OpenAiEmbeddingsConfig};
use mongovec::mongodb::{IndexReadiness, MongoClient, MongoConfig, PollPolicy};
use mongovec::MongovecError;
use tracing_subscriber::EnvFilter;

use config::DemoConfig;

#[tokio::main]
async fn main() -> Result<(), MongovecError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DemoConfig::from_env()?;

    let embeddings = Arc::new(OpenAiEmbeddings::new(
        OpenAiEmbeddingsConfig::new(&config.openai_api_key).with_dimensions(config.dimensions),
        Arc::new(HttpBackend::new()),
    ));
    let client = MongoClient::from_uri(&config.mongodb_uri, embeddings.clone(), MongoConfig::default())
        .await?;

    client
        .ensure_search_index(
            &config.database,
            &config.collection,
            &config.index,
            embeddings.as_ref(),
            config.similarity,
        )
        .await?;

    let state = client
        .wait_for_search_index(
            &config.database,
            &config.collection,
            &config.index,
            &PollPolicy::default(),
        )
        .await;

    match state {
        IndexReadiness::Ready => println!(
            "index '{}' is ready on {}.{}",
            config.index, config.database, config.collection
        ),
        _ => println!(
            "index '{}' did not become visible on {}.{}",
            config.index, config.database, config.collection
        ),
    }
    Ok(())
}
