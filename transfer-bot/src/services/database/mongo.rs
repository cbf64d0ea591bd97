use super::{DatabaseConnection, DatabaseConnector, DatabaseError, DatabaseHandle};
use crate::services::endpoint::DatabaseSelector;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::Document,
    error::{Error as MongoError, ErrorKind},
    options::ClientOptions,
    Client as MongoClient, Database,
};

const APP_NAME: &str = "transfer-bot";

/// Opens a dedicated MongoDB client per connection string.
#[derive(Debug, Clone)]
pub struct MongoConnector {
    app_name: String,
}

impl MongoConnector {
    pub fn new() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
        }
    }
}

impl Default for MongoConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseConnector for MongoConnector {
    async fn open(&self, uri: &str) -> Result<Box<dyn DatabaseConnection>, DatabaseError> {
        let mut client_options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            classify(e)
        })?;
        client_options.app_name = Some(self.app_name.clone());

        let client = MongoClient::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            classify(e)
        })?;

        Ok(Box::new(MongoConnection { client }))
    }
}

struct MongoConnection {
    client: MongoClient,
}

#[async_trait]
impl DatabaseConnection for MongoConnection {
    fn database(
        &self,
        selector: &DatabaseSelector,
    ) -> Result<Box<dyn DatabaseHandle>, DatabaseError> {
        let db = match selector {
            DatabaseSelector::Named(name) => self.client.database(name),
            DatabaseSelector::Default => self.client.default_database().ok_or_else(|| {
                DatabaseError::Connection(
                    "No default database defined in the connection string".to_string(),
                )
            })?,
        };
        Ok(Box::new(MongoDatabase { db }))
    }

    async fn close(self: Box<Self>) {
        self.client.shutdown().await;
    }
}

struct MongoDatabase {
    db: Database,
}

#[async_trait]
impl DatabaseHandle for MongoDatabase {
    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, DatabaseError> {
        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(None, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "Failed to query collection: {}", e);
                classify(e)
            })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!(collection = %collection, "Failed to read documents: {}", e);
            classify(e)
        })
    }

    async fn bulk_insert(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<u64, DatabaseError> {
        // insert_many rejects an empty batch.
        if documents.is_empty() {
            return Ok(0);
        }

        let result = self
            .db
            .collection::<Document>(collection)
            .insert_many(documents, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "Failed to insert documents: {}", e);
                classify(e)
            })?;

        Ok(result.inserted_ids.len() as u64)
    }
}

/// Map a driver error onto the connection / operation / other split.
pub(crate) fn classify(err: MongoError) -> DatabaseError {
    let message = err.to_string();
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Io(_)
        | ErrorKind::Authentication { .. }
        | ErrorKind::InvalidArgument { .. }
        | ErrorKind::InvalidTlsConfig { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => DatabaseError::Connection(message),
        ErrorKind::BulkWrite(_)
        | ErrorKind::Write(_)
        | ErrorKind::Command(_)
        | ErrorKind::BsonDeserialization(_)
        | ErrorKind::BsonSerialization(_)
        | ErrorKind::InvalidResponse { .. } => DatabaseError::Operation(message),
        _ => DatabaseError::Other(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_uri_is_a_connection_error() {
        let err = match MongoConnector::new().open("definitely-not-mongodb").await {
            Ok(_) => panic!("a malformed connection string must be rejected"),
            Err(e) => e,
        };
        assert!(matches!(err, DatabaseError::Connection(_)), "got {err:?}");
    }

    #[test]
    fn io_failures_are_connection_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = classify(MongoError::from(io));
        assert!(matches!(err, DatabaseError::Connection(_)), "got {err:?}");
    }
}
