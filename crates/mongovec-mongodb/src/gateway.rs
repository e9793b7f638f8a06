use async_trait::async_trait;
use bson::Document as BsonDocument;
use futures::TryStreamExt;
use mongodb::error::{Error as DriverError, ErrorKind, WriteFailure};
use mongodb::{Client, Collection, SearchIndexModel, SearchIndexType};
use mongovec_core::{MongovecError, Result};

use crate::index::SearchIndexDefinition;

// ---------------------------------------------------------------------------
// CollectionRef
// ---------------------------------------------------------------------------

/// A collection identified by database and collection name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    pub database: String,
    pub collection: String,
}

impl CollectionRef {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// DatabaseGateway
// ---------------------------------------------------------------------------

/// The database operations [`MongoClient`](crate::MongoClient) is built on.
#[async_trait]
pub trait DatabaseGateway: Send + Sync {
    async fn list_database_names(&self) -> Result<Vec<String>>;

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>>;

    async fn insert_one(&self, database: &str, collection: &str, doc: BsonDocument)
        -> Result<()>;

    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        docs: Vec<BsonDocument>,
    ) -> Result<()>;

    /// Delete the first document matching `filter`; returns the number deleted.
    async fn delete_one(
        &self,
        database: &str,
        collection: &str,
        filter: BsonDocument,
    ) -> Result<u64>;

    /// Submit a vector search index; returns the name the server assigned.
    async fn create_search_index(
        &self,
        database: &str,
        collection: &str,
        definition: &SearchIndexDefinition,
    ) -> Result<String>;

    async fn list_search_index_names(&self, database: &str, collection: &str)
        -> Result<Vec<String>>;

    async fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: Vec<BsonDocument>,
    ) -> Result<Vec<BsonDocument>>;
}

// ---------------------------------------------------------------------------
// MongoGateway
// ---------------------------------------------------------------------------

/// [`DatabaseGateway`] backed by the official MongoDB driver.
#[derive(Clone)]
pub struct MongoGateway {
    client: Client,
}

impl MongoGateway {
    /// Connect to MongoDB at the given URI.
    pub async fn from_uri(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| map_driver_error("failed to connect to MongoDB", e))?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Return a reference to the underlying MongoDB client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn collection(&self, target: &CollectionRef) -> Collection<BsonDocument> {
        self.coll(&target.database, &target.collection)
    }

    fn coll(&self, database: &str, collection: &str) -> Collection<BsonDocument> {
        self.client
            .database(database)
            .collection::<BsonDocument>(collection)
    }
}

#[async_trait]
impl DatabaseGateway for MongoGateway {
    async fn list_database_names(&self) -> Result<Vec<String>> {
        self.client
            .list_database_names()
            .await
            .map_err(|e| map_driver_error("MongoDB listDatabases", e))
    }

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>> {
        self.client
            .database(database)
            .list_collection_names()
            .await
            .map_err(|e| map_driver_error("MongoDB listCollections", e))
    }

    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        doc: BsonDocument,
    ) -> Result<()> {
        self.coll(database, collection)
            .insert_one(doc)
            .await
            .map_err(|e| map_driver_error("MongoDB insert failed", e))?;
        Ok(())
    }

    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        docs: Vec<BsonDocument>,
    ) -> Result<()> {
        self.coll(database, collection)
            .insert_many(docs)
            .await
            .map_err(|e| map_driver_error("MongoDB insert failed", e))?;
        Ok(())
    }

    async fn delete_one(
        &self,
        database: &str,
        collection: &str,
        filter: BsonDocument,
    ) -> Result<u64> {
        let result = self
            .coll(database, collection)
            .delete_one(filter)
            .await
            .map_err(|e| map_driver_error("MongoDB delete failed", e))?;
        Ok(result.deleted_count)
    }

    async fn create_search_index(
        &self,
        database: &str,
        collection: &str,
        definition: &SearchIndexDefinition,
    ) -> Result<String> {
        let model = SearchIndexModel::builder()
            .definition(definition.to_bson())
            .name(definition.name.clone())
            .index_type(SearchIndexType::VectorSearch)
            .build();

        self.coll(database, collection)
            .create_search_index(model)
            .await
            .map_err(|e| map_driver_error("MongoDB createSearchIndexes", e))
    }

    async fn list_search_index_names(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Vec<String>> {
        let cursor = self
            .coll(database, collection)
            .list_search_indexes()
            .await
            .map_err(|e| map_driver_error("MongoDB $listSearchIndexes", e))?;

        let indexes: Vec<BsonDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| map_driver_error("MongoDB cursor error", e))?;

        Ok(indexes
            .iter()
            .filter_map(|index| index.get_str("name").ok().map(str::to_string))
            .collect())
    }

    async fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: Vec<BsonDocument>,
    ) -> Result<Vec<BsonDocument>> {
        let cursor = self
            .coll(database, collection)
            .aggregate(pipeline)
            .await
            .map_err(|e| map_driver_error("MongoDB aggregation failed", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| map_driver_error("MongoDB cursor error", e))
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Map a driver error onto [`MongovecError`].
///
/// Server-reported command and write errors become
/// [`MongovecError::Operation`]; everything else becomes
/// [`MongovecError::Database`].
pub fn map_driver_error(context: &str, error: DriverError) -> MongovecError {
    match error.kind.as_ref() {
        ErrorKind::Command(command) => MongovecError::Operation {
            code: Some(command.code),
            message: format!("{context}: {}", command.message),
        },
        ErrorKind::Write(WriteFailure::WriteError(write)) => MongovecError::Operation {
            code: Some(write.code),
            message: format!("{context}: {}", write.message),
        },
        ErrorKind::Write(WriteFailure::WriteConcernError(concern)) => MongovecError::Operation {
            code: Some(concern.code),
            message: format!("{context}: {}", concern.message),
        },
        _ => MongovecError::Database(format!("{context}: {error}")),
    }
}
