use std::sync::Arc;

use bson::{doc, oid::ObjectId, Bson, Document as BsonDocument};
use mongovec_core::{sort_by_score_desc, Document, Embeddings, MongovecError, Result, SearchResult};

use crate::config::{MongoConfig, PollPolicy};
use crate::convert::{json_map_to_bson, record_to_result, vector_to_bson};
use crate::gateway::{CollectionRef, DatabaseGateway, MongoGateway};
use crate::index::{SearchIndexDefinition, Similarity};
use crate::readiness::{IndexReadiness, IndexReadinessPoller};

/// `_id` of the placeholder document used to materialize a collection.
pub const SENTINEL_ID: i32 = 0;

// ---------------------------------------------------------------------------
// MongoClient
// ---------------------------------------------------------------------------

/// Vector search helpers layered over a [`DatabaseGateway`].
///
/// The client holds no state of its own beyond its configuration; every
/// call is a sequence of awaited gateway requests. Documents are stored
/// with fields:
/// - `_id`: the document ID
/// - `name`: optional display name
/// - `content`: the document text
/// - `embedding`: the vector embedding (array of doubles)
/// - `metadata`: an embedded document with arbitrary metadata
pub struct MongoClient {
    gateway: Arc<dyn DatabaseGateway>,
    embeddings: Arc<dyn Embeddings>,
    config: MongoConfig,
}

impl MongoClient {
    pub fn new(
        gateway: Arc<dyn DatabaseGateway>,
        embeddings: Arc<dyn Embeddings>,
        config: MongoConfig,
    ) -> Self {
        Self {
            gateway,
            embeddings,
            config,
        }
    }

    /// Connect to MongoDB at the given URI.
    pub async fn from_uri(
        uri: &str,
        embeddings: Arc<dyn Embeddings>,
        config: MongoConfig,
    ) -> Result<Self> {
        let gateway = MongoGateway::from_uri(uri).await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to connect to MongoDB");
        })?;
        Ok(Self::new(Arc::new(gateway), embeddings, config))
    }

    pub fn gateway(&self) -> &Arc<dyn DatabaseGateway> {
        &self.gateway
    }

    pub fn embeddings(&self) -> &Arc<dyn Embeddings> {
        &self.embeddings
    }

    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Discovery
    // -----------------------------------------------------------------------

    pub async fn get_database_names(&self) -> Result<Vec<String>> {
        self.gateway.list_database_names().await
    }

    pub async fn get_collection_names(&self, database_name: &str) -> Result<Vec<String>> {
        self.gateway.list_collection_names(database_name).await
    }

    // -----------------------------------------------------------------------
    // Provisioning
    // -----------------------------------------------------------------------

    /// Make sure `collection_name` exists in `database_name`.
    ///
    /// A missing collection is materialized by inserting the sentinel
    /// document `{_id: 0}` and deleting it again. If the delete fails the
    /// sentinel stays behind. Not safe against concurrent provisioning of
    /// the same name.
    pub async fn ensure_collection(
        &self,
        database_name: &str,
        collection_name: &str,
    ) -> Result<CollectionRef> {
        let target = CollectionRef::new(database_name, collection_name);

        let existing = self
            .gateway
            .list_collection_names(database_name)
            .await
            .inspect_err(|e| {
                tracing::error!(database = database_name, error = %e, "failed to list collections");
            })?;
        if existing.iter().any(|name| name == collection_name) {
            return Ok(target);
        }

        self.gateway
            .insert_one(database_name, collection_name, doc! { "_id": SENTINEL_ID })
            .await
            .inspect_err(|e| {
                tracing::error!(
                    database = database_name,
                    collection = collection_name,
                    error = %e,
                    "failed to create collection"
                );
            })?;
        self.gateway
            .delete_one(database_name, collection_name, doc! { "_id": SENTINEL_ID })
            .await
            .inspect_err(|e| {
                tracing::error!(
                    database = database_name,
                    collection = collection_name,
                    error = %e,
                    "collection created but sentinel document could not be removed"
                );
            })?;

        tracing::info!(
            database = database_name,
            collection = collection_name,
            "collection created"
        );
        Ok(target)
    }

    /// Make sure a vector search index named `index_name` exists.
    ///
    /// When the index is missing, `embeddings` is asked to embed the
    /// configured probe text once and the vector length becomes the index
    /// dimensionality. An existing index is left untouched.
    pub async fn ensure_search_index(
        &self,
        database_name: &str,
        collection_name: &str,
        index_name: &str,
        embeddings: &dyn Embeddings,
        similarity: Similarity,
    ) -> Result<()> {
        self.ensure_collection(database_name, collection_name)
            .await?;

        if self
            .index_exists(database_name, collection_name, index_name)
            .await
        {
            tracing::info!(
                database = database_name,
                collection = collection_name,
                index = index_name,
                "search index already exists"
            );
            return Ok(());
        }

        let probe = embeddings
            .embed_query(&self.config.probe_text)
            .await
            .inspect_err(|e| {
                tracing::error!(index = index_name, error = %e, "failed to embed probe text");
            })?;
        if probe.is_empty() {
            let err = MongovecError::Config(
                "probe embedding is empty; cannot determine index dimensionality".to_string(),
            );
            tracing::error!(index = index_name, error = %err, "invalid probe embedding");
            return Err(err);
        }

        let definition = SearchIndexDefinition::new(
            index_name,
            &self.config.vector_field,
            probe.len(),
            similarity,
        );

        match self
            .gateway
            .create_search_index(database_name, collection_name, &definition)
            .await
        {
            Ok(created) => {
                tracing::info!(
                    database = database_name,
                    collection = collection_name,
                    index = %created,
                    dimensions = definition.num_dimensions,
                    similarity = %similarity,
                    "search index created"
                );
                Ok(())
            }
            Err(e) if e.is_operation_failure() => {
                tracing::error!(
                    database = database_name,
                    collection = collection_name,
                    index = index_name,
                    error = %e,
                    "database rejected search index creation"
                );
                Err(e)
            }
            Err(e) => {
                tracing::error!(
                    database = database_name,
                    collection = collection_name,
                    index = index_name,
                    error = %e,
                    "failed to create search index"
                );
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Index existence and readiness
    // -----------------------------------------------------------------------

    /// Whether a search index named `index_name` is listed on the
    /// collection. `Ok(false)` means confirmed absent; `Err` means the
    /// listing itself failed.
    pub async fn search_index_exists(
        &self,
        database_name: &str,
        collection_name: &str,
        index_name: &str,
    ) -> Result<bool> {
        let names = self
            .gateway
            .list_search_index_names(database_name, collection_name)
            .await?;
        Ok(names.iter().any(|name| name == index_name))
    }

    /// Like [`search_index_exists`](Self::search_index_exists), but a failed
    /// listing is logged and reported as `false`.
    pub async fn index_exists(
        &self,
        database_name: &str,
        collection_name: &str,
        index_name: &str,
    ) -> bool {
        match self
            .search_index_exists(database_name, collection_name, index_name)
            .await
        {
            Ok(exists) => exists,
            Err(e) => {
                tracing::error!(
                    database = database_name,
                    collection = collection_name,
                    index = index_name,
                    error = %e,
                    "could not list search indexes; treating index as missing"
                );
                false
            }
        }
    }

    /// Poll [`index_exists`](Self::index_exists) until the index shows up
    /// or the policy's attempt budget is exceeded.
    pub async fn wait_for_search_index(
        &self,
        database_name: &str,
        collection_name: &str,
        index_name: &str,
        policy: &PollPolicy,
    ) -> IndexReadiness {
        let mut poller = IndexReadinessPoller::new(policy.clone());
        let state = poller
            .poll(|| self.index_exists(database_name, collection_name, index_name))
            .await;

        match state {
            IndexReadiness::Ready => tracing::info!(
                index = index_name,
                attempts = poller.attempts(),
                "search index ready"
            ),
            _ => tracing::error!(
                index = index_name,
                attempts = poller.attempts(),
                "timed out waiting for search index"
            ),
        }
        state
    }

    // -----------------------------------------------------------------------
    // Documents and search
    // -----------------------------------------------------------------------

    /// Embed `docs` with the client's embedder and insert them. Documents
    /// with an empty id get a fresh ObjectId hex string. Returns the ids.
    pub async fn add_documents(
        &self,
        database_name: &str,
        collection_name: &str,
        docs: Vec<Document>,
    ) -> Result<Vec<String>> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = docs.iter().map(|d| d.content.as_str()).collect();
        let vectors = self
            .embeddings
            .embed_documents(&texts)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "failed to embed documents");
            })?;
        if vectors.len() != docs.len() {
            return Err(MongovecError::Embedding(format!(
                "expected {} embeddings, got {}",
                docs.len(),
                vectors.len()
            )));
        }

        let mut ids = Vec::with_capacity(docs.len());
        let mut records = Vec::with_capacity(docs.len());
        for (doc, vector) in docs.into_iter().zip(vectors) {
            let id = if doc.id.is_empty() {
                ObjectId::new().to_hex()
            } else {
                doc.id
            };

            let mut record = doc! {
                "_id": &id,
                &self.config.content_field: &doc.content,
                &self.config.vector_field: vector_to_bson(&vector),
                "metadata": json_map_to_bson(&doc.metadata),
            };
            if let Some(name) = doc.name {
                record.insert("name", name);
            }

            ids.push(id);
            records.push(record);
        }

        self.gateway
            .insert_many(database_name, collection_name, records)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    database = database_name,
                    collection = collection_name,
                    error = %e,
                    "failed to insert documents"
                );
            })?;

        tracing::info!(
            database = database_name,
            collection = collection_name,
            count = ids.len(),
            "documents inserted"
        );
        Ok(ids)
    }

    /// Semantic search over `index_name`, best match first.
    ///
    /// A missing index yields an empty result without embedding the
    /// query. A failing query embedding is returned as an error. Any
    /// failure while running the search pipeline is logged and yields an
    /// empty result. `filters`, when non-empty, is passed to
    /// `$vectorSearch` as its pre-filter.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        database_name: &str,
        collection_name: &str,
        index_name: &str,
        filters: Option<BsonDocument>,
    ) -> Result<Vec<SearchResult>> {
        if !self
            .index_exists(database_name, collection_name, index_name)
            .await
        {
            tracing::error!(
                database = database_name,
                collection = collection_name,
                index = index_name,
                "search index does not exist"
            );
            return Ok(Vec::new());
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embeddings.embed_query(query).await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to embed search query");
        })?;

        let pipeline = self.search_pipeline(index_name, &query_vector, limit, filters);
        let records = match self
            .gateway
            .aggregate(database_name, collection_name, pipeline)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(
                    database = database_name,
                    collection = collection_name,
                    index = index_name,
                    error = %e,
                    "vector search failed"
                );
                return Ok(Vec::new());
            }
        };

        let mut results: Vec<SearchResult> = records
            .iter()
            .map(|record| record_to_result(record, &self.config))
            .collect();
        sort_by_score_desc(&mut results);
        Ok(results)
    }

    /// `$vectorSearch` → `$addFields` (score) → `$project` (drop vectors).
    fn search_pipeline(
        &self,
        index_name: &str,
        query_vector: &[f32],
        limit: usize,
        filters: Option<BsonDocument>,
    ) -> Vec<BsonDocument> {
        let mut vector_search = doc! {
            "index": index_name,
            "path": &self.config.vector_field,
            "queryVector": vector_to_bson(query_vector),
            "numCandidates": self.config.num_candidates_for(limit),
            "limit": limit as i64,
        };
        if let Some(filter) = filters.filter(|f| !f.is_empty()) {
            vector_search.insert("filter", Bson::Document(filter));
        }

        vec![
            doc! { "$vectorSearch": vector_search },
            doc! { "$addFields": { &self.config.score_field: { "$meta": "vectorSearchScore" } } },
            doc! { "$project": { &self.config.vector_field: 0 } },
        ]
    }
}
