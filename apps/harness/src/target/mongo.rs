//! Target implementation backed by the official MongoDB driver.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Collection, Database};
use tracing::info;

use crate::config::TargetConfig;

use super::{Target, TargetError};

/// Connection to the system under test.
#[derive(Clone)]
pub struct MongoTarget {
    client: Client,
    db: Database,
}

impl MongoTarget {
    /// Connect using the configured URI and select the fixture database.
    pub async fn connect(config: &TargetConfig) -> Result<Self, TargetError> {
        let client = Client::with_uri_str(&config.uri).await?;
        let db = client.database(&config.database);
        info!("Connected to target database '{}'", config.database);
        Ok(MongoTarget { client, db })
    }

    /// Close the connection pool.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

#[async_trait]
impl Target for MongoTarget {
    async fn run_command(&self, command: Document) -> Result<Document, TargetError> {
        Ok(self.db.run_command(command).await?)
    }

    async fn run_admin_command(&self, command: Document) -> Result<Document, TargetError> {
        Ok(self.client.database("admin").run_command(command).await?)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, TargetError> {
        let cursor = self.collection(collection).aggregate(pipeline).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Document, TargetError> {
        let result = self.collection(collection).insert_many(documents).await?;

        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);
        let inserted_ids: Vec<Bson> = ids.into_iter().map(|(_, id)| id).collect();

        Ok(doc! {
            "acknowledged": true,
            "inserted_count": inserted_ids.len() as i64,
            "inserted_ids": inserted_ids,
        })
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, TargetError> {
        let cursor = self.collection(collection).find(filter).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<Document, TargetError> {
        let result = self
            .collection(collection)
            .update_many(filter, update)
            .await?;

        Ok(doc! {
            "acknowledged": true,
            "matched_count": result.matched_count as i64,
            "modified_count": result.modified_count as i64,
        })
    }

    async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Document, TargetError> {
        let result = self.collection(collection).delete_many(filter).await?;

        Ok(doc! {
            "acknowledged": true,
            "deleted_count": result.deleted_count as i64,
        })
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), TargetError> {
        Ok(self.collection(collection).drop().await?)
    }

    async fn server_version(&self) -> Result<String, TargetError> {
        let info = self.db.run_command(doc! { "buildInfo": 1 }).await?;
        info.get_str("version")
            .map(str::to_string)
            .map_err(|e| TargetError::new(format!("buildInfo has no version: {}", e)))
    }
}
