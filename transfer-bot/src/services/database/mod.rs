//! Database capability used by the transfer orchestrator.
//!
//! A connector opens one connection per endpoint; a connection yields
//! database handles; handles read and bulk-insert schemaless documents.
//! Connections are never pooled across transfers and must be closed
//! explicitly by whoever opened them.

pub mod memory;
pub mod mongo;

use crate::services::endpoint::DatabaseSelector;
use async_trait::async_trait;
use mongodb::bson::Document;
use thiserror::Error;

pub use memory::{InMemoryConnector, InMemoryStats};
pub use mongo::MongoConnector;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    /// Endpoint unreachable, URI rejected, authentication refused.
    #[error("{0}")]
    Connection(String),

    /// A read or write was rejected or interrupted.
    #[error("{0}")]
    Operation(String),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    async fn open(&self, uri: &str) -> Result<Box<dyn DatabaseConnection>, DatabaseError>;
}

#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    fn database(
        &self,
        selector: &DatabaseSelector,
    ) -> Result<Box<dyn DatabaseHandle>, DatabaseError>;

    /// Release the connection and everything it holds.
    async fn close(self: Box<Self>);
}

#[async_trait]
pub trait DatabaseHandle: Send + Sync {
    /// Every document of the collection, unfiltered, in natural order.
    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, DatabaseError>;

    /// Insert all documents in one bulk operation; returns how many landed.
    async fn bulk_insert(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<u64, DatabaseError>;
}
