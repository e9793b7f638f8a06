//! In-memory [`DatabaseGateway`] that records every call.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument};
use mongovec_core::{Embeddings, MongovecError, Result};
use mongovec_mongodb::{DatabaseGateway, SearchIndexDefinition};

type Key = (String, String);

#[derive(Default)]
struct State {
    databases: BTreeMap<String, BTreeMap<String, Vec<BsonDocument>>>,
    search_indexes: HashMap<Key, Vec<SearchIndexDefinition>>,
    pipelines: Vec<Vec<BsonDocument>>,
    aggregate_results: Option<Vec<BsonDocument>>,
}

#[derive(Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
    pub inserts: AtomicUsize,
    pub deletes: AtomicUsize,
    pub index_creations: AtomicUsize,
    pub index_listings: AtomicUsize,
    pub aggregations: AtomicUsize,
    /// Index listings before this count return an empty list.
    pub hide_indexes_for: AtomicUsize,
    pub fail_index_listing: AtomicBool,
    pub fail_aggregate: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Error kind returned by `create_search_index` when set.
    create_index_error: Mutex<Option<fn() -> MongovecError>>,
}

impl InMemoryGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_collection(self: &Arc<Self>, database: &str, collection: &str) -> Arc<Self> {
        self.state
            .lock()
            .unwrap()
            .databases
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default();
        self.clone()
    }

    pub fn with_search_index(
        self: &Arc<Self>,
        database: &str,
        collection: &str,
        definition: SearchIndexDefinition,
    ) -> Arc<Self> {
        self.with_collection(database, collection);
        self.state
            .lock()
            .unwrap()
            .search_indexes
            .entry((database.to_string(), collection.to_string()))
            .or_default()
            .push(definition);
        self.clone()
    }

    /// Raw records returned by every `aggregate` call instead of running
    /// the pipeline against stored documents.
    pub fn set_aggregate_results(&self, records: Vec<BsonDocument>) {
        self.state.lock().unwrap().aggregate_results = Some(records);
    }

    pub fn fail_create_index_with(&self, make: fn() -> MongovecError) {
        *self.create_index_error.lock().unwrap() = Some(make);
    }

    pub fn documents(&self, database: &str, collection: &str) -> Vec<BsonDocument> {
        self.state
            .lock()
            .unwrap()
            .databases
            .get(database)
            .and_then(|db| db.get(collection))
            .cloned()
            .unwrap_or_default()
    }

    pub fn search_indexes(&self, database: &str, collection: &str) -> Vec<SearchIndexDefinition> {
        self.state
            .lock()
            .unwrap()
            .search_indexes
            .get(&(database.to_string(), collection.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn pipelines(&self) -> Vec<Vec<BsonDocument>> {
        self.state.lock().unwrap().pipelines.clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseGateway for InMemoryGateway {
    async fn list_database_names(&self) -> Result<Vec<String>> {
        Ok(self.state.lock().unwrap().databases.keys().cloned().collect())
    }

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .databases
            .get(database)
            .map(|db| db.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn insert_one(&self, database: &str, collection: &str, doc: BsonDocument) -> Result<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .unwrap()
            .databases
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(())
    }

    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        docs: Vec<BsonDocument>,
    ) -> Result<()> {
        for doc in docs {
            self.insert_one(database, collection, doc).await?;
        }
        Ok(())
    }

    async fn delete_one(
        &self,
        database: &str,
        collection: &str,
        filter: BsonDocument,
    ) -> Result<u64> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(MongovecError::Database("connection reset".into()));
        }
        let mut state = self.state.lock().unwrap();
        let docs = state
            .databases
            .get_mut(database)
            .and_then(|db| db.get_mut(collection));
        let Some(docs) = docs else { return Ok(0) };
        let wanted: Option<&Bson> = filter.get("_id");
        match docs.iter().position(|d| d.get("_id") == wanted) {
            Some(pos) => {
                docs.remove(pos);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn create_search_index(
        &self,
        database: &str,
        collection: &str,
        definition: &SearchIndexDefinition,
    ) -> Result<String> {
        self.index_creations.fetch_add(1, Ordering::SeqCst);
        if let Some(make) = *self.create_index_error.lock().unwrap() {
            return Err(make());
        }
        self.state
            .lock()
            .unwrap()
            .search_indexes
            .entry((database.to_string(), collection.to_string()))
            .or_default()
            .push(definition.clone());
        Ok(definition.name.clone())
    }

    async fn list_search_index_names(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Vec<String>> {
        let listing = self.index_listings.fetch_add(1, Ordering::SeqCst);
        if self.fail_index_listing.load(Ordering::SeqCst) {
            return Err(MongovecError::Operation {
                code: Some(13),
                message: "not authorized to list search indexes".into(),
            });
        }
        if listing < self.hide_indexes_for.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(self
            .search_indexes(database, collection)
            .into_iter()
            .map(|d| d.name)
            .collect())
    }

    async fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: Vec<BsonDocument>,
    ) -> Result<Vec<BsonDocument>> {
        self.aggregations.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        state.pipelines.push(pipeline.clone());
        if self.fail_aggregate.load(Ordering::SeqCst) {
            return Err(MongovecError::Database("cursor killed".into()));
        }
        if let Some(records) = &state.aggregate_results {
            return Ok(records.clone());
        }
        let docs = state
            .databases
            .get(database)
            .and_then(|db| db.get(collection))
            .cloned()
            .unwrap_or_default();
        Ok(run_pipeline(&docs, &pipeline))
    }
}

/// Evaluate the `$vectorSearch` / `$addFields` / `$project` pipeline the
/// client builds, scoring by cosine similarity.
fn run_pipeline(docs: &[BsonDocument], pipeline: &[BsonDocument]) -> Vec<BsonDocument> {
    let mut records: Vec<BsonDocument> = docs.to_vec();
    for stage in pipeline {
        if let Ok(search) = stage.get_document("$vectorSearch") {
            let path = search.get_str("path").unwrap_or("embedding");
            let query = to_floats(search.get_array("queryVector").ok());
            let limit = search.get_i64("limit").unwrap_or(10) as usize;
            let mut scored: Vec<(f64, BsonDocument)> = records
                .into_iter()
                .filter_map(|doc| {
                    let vector = to_floats(doc.get_array(path).ok());
                    (vector.len() == query.len()).then(|| (cosine(&query, &vector), doc))
                })
                .collect();
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));
            scored.truncate(limit);
            records = scored
                .into_iter()
                .map(|(score, mut doc)| {
                    doc.insert("__score", score);
                    doc
                })
                .collect();
        } else if let Ok(fields) = stage.get_document("$addFields") {
            for doc in &mut records {
                let score = doc.remove("__score").unwrap_or(Bson::Double(0.0));
                for (key, _) in fields {
                    doc.insert(key.clone(), score.clone());
                }
            }
        } else if let Ok(projection) = stage.get_document("$project") {
            for doc in &mut records {
                for (key, value) in projection {
                    if value == &Bson::Int32(0) {
                        doc.remove(key);
                    }
                }
            }
        }
    }
    records
}

fn to_floats(values: Option<&bson::Array>) -> Vec<f64> {
    values
        .map(|arr| arr.iter().filter_map(Bson::as_f64).collect())
        .unwrap_or_default()
}

fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

/// Embeddings that count calls and can be told to fail.
pub struct CountingEmbeddings {
    pub dimensions: usize,
    pub query_calls: AtomicUsize,
    pub document_calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl CountingEmbeddings {
    pub fn new(dimensions: usize) -> Arc<Self> {
        Arc::new(Self {
            dimensions,
            query_calls: AtomicUsize::new(0),
            document_calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }

    pub fn failing(dimensions: usize) -> Arc<Self> {
        let emb = Self::new(dimensions);
        emb.fail.store(true, Ordering::SeqCst);
        emb
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        if self.dimensions == 0 {
            return Vec::new();
        }
        let mut vec = vec![0.0f32; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            vec[i % self.dimensions] += byte as f32 / 255.0;
        }
        vec
    }
}

#[async_trait]
impl Embeddings for CountingEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(MongovecError::Embedding("provider unavailable".into()));
        }
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(MongovecError::Embedding("provider unavailable".into()));
        }
        Ok(self.vector(text))
    }
}
