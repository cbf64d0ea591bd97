//! In-process database used when no MongoDB server is at hand.
//!
//! Collections are grouped by database name; the host part of a connection
//! string is ignored. Documents carrying an `_id` are unique per collection,
//! and a bulk insert that would duplicate one is rejected as a whole.

use super::{DatabaseConnection, DatabaseConnector, DatabaseError, DatabaseHandle};
use crate::services::endpoint::DatabaseSelector;
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Collections = HashMap<String, Vec<Document>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InMemoryStats {
    pub opened: u64,
    pub closed: u64,
    pub reads: u64,
    pub writes: u64,
}

impl InMemoryStats {
    /// Connections opened but not yet closed.
    pub fn open_connections(&self) -> u64 {
        self.opened - self.closed
    }
}

#[derive(Default)]
struct Inner {
    databases: Mutex<HashMap<String, Collections>>,
    unreachable: Mutex<HashSet<String>>,
    failing_reads: Mutex<HashSet<String>>,
    default_database: Option<String>,
    opened: AtomicU64,
    closed: AtomicU64,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl Inner {
    fn databases(&self) -> MutexGuard<'_, HashMap<String, Collections>> {
        self.databases.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryConnector {
    inner: Arc<Inner>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Database used for connection strings that name none.
    pub fn with_default_database(name: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                default_database: Some(name.to_string()),
                ..Inner::default()
            }),
        }
    }

    /// Make `open` fail for this exact connection string.
    pub fn mark_unreachable(&self, uri: &str) {
        self.inner
            .unreachable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(uri.to_string());
    }

    /// Make every read of this collection fail mid-transfer.
    pub fn fail_reads_of(&self, collection: &str) {
        self.inner
            .failing_reads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(collection.to_string());
    }

    /// Seed documents directly, bypassing the unique `_id` check.
    pub fn seed(&self, database: &str, collection: &str, documents: Vec<Document>) {
        self.inner
            .databases()
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    pub fn documents(&self, database: &str, collection: &str) -> Vec<Document> {
        self.inner
            .databases()
            .get(database)
            .and_then(|collections| collections.get(collection))
            .cloned()
            .unwrap_or_default()
    }

    pub fn stats(&self) -> InMemoryStats {
        InMemoryStats {
            opened: self.inner.opened.load(Ordering::SeqCst),
            closed: self.inner.closed.load(Ordering::SeqCst),
            reads: self.inner.reads.load(Ordering::SeqCst),
            writes: self.inner.writes.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl DatabaseConnector for InMemoryConnector {
    async fn open(&self, uri: &str) -> Result<Box<dyn DatabaseConnection>, DatabaseError> {
        let unreachable = self
            .inner
            .unreachable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(uri);
        if unreachable {
            return Err(DatabaseError::Connection(format!(
                "Server selection timeout: no available servers for '{}'",
                crate::services::endpoint::resolve_database_name(uri)
            )));
        }

        self.inner.opened.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("[MEMORY] connection opened");
        Ok(Box::new(InMemoryConnection {
            inner: self.inner.clone(),
        }))
    }
}

struct InMemoryConnection {
    inner: Arc<Inner>,
}

#[async_trait]
impl DatabaseConnection for InMemoryConnection {
    fn database(
        &self,
        selector: &DatabaseSelector,
    ) -> Result<Box<dyn DatabaseHandle>, DatabaseError> {
        let name = match selector {
            DatabaseSelector::Named(name) => name.clone(),
            DatabaseSelector::Default => self.inner.default_database.clone().ok_or_else(|| {
                DatabaseError::Connection(
                    "No default database defined in the connection string".to_string(),
                )
            })?,
        };
        Ok(Box::new(InMemoryDatabase {
            inner: self.inner.clone(),
            name,
        }))
    }

    async fn close(self: Box<Self>) {
        self.inner.closed.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("[MEMORY] connection closed");
    }
}

struct InMemoryDatabase {
    inner: Arc<Inner>,
    name: String,
}

#[async_trait]
impl DatabaseHandle for InMemoryDatabase {
    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, DatabaseError> {
        let failing = self
            .inner
            .failing_reads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(collection);
        if failing {
            return Err(DatabaseError::Operation(format!(
                "connection interrupted while reading {}",
                collection
            )));
        }

        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .inner
            .databases()
            .get(&self.name)
            .and_then(|collections| collections.get(collection))
            .cloned()
            .unwrap_or_default())
    }

    async fn bulk_insert(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<u64, DatabaseError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);

        let mut databases = self.inner.databases();
        let target = databases
            .entry(self.name.clone())
            .or_default()
            .entry(collection.to_string())
            .or_default();

        let mut seen: HashSet<String> = target.iter().filter_map(id_key).collect();
        for doc in &documents {
            if let Some(id) = id_key(doc) {
                if !seen.insert(id.clone()) {
                    return Err(DatabaseError::Operation(format!(
                        "E11000 duplicate key error collection: {}.{} dup key: {{ _id: {} }}",
                        self.name, collection, id
                    )));
                }
            }
        }

        let count = documents.len() as u64;
        target.extend(documents);
        Ok(count)
    }
}

fn id_key(doc: &Document) -> Option<String> {
    doc.get("_id").map(Bson::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn duplicate_ids_reject_the_whole_batch() {
        let connector = InMemoryConnector::new();
        connector.seed("db", "dst", vec![doc! { "_id": 1 }]);

        let conn = connector.open("mongodb://h/db").await.unwrap();
        let db = conn
            .database(&DatabaseSelector::Named("db".to_string()))
            .unwrap();
        let err = db
            .bulk_insert("dst", vec![doc! { "_id": 2 }, doc! { "_id": 1 }])
            .await
            .unwrap_err();
        conn.close().await;

        assert!(matches!(err, DatabaseError::Operation(_)));
        assert_eq!(connector.documents("db", "dst"), vec![doc! { "_id": 1 }]);
        assert_eq!(connector.stats().open_connections(), 0);
    }

    #[tokio::test]
    async fn default_database_requires_configuration() {
        let connector = InMemoryConnector::new();
        let conn = connector.open("mongodb://h/").await.unwrap();
        assert!(conn.database(&DatabaseSelector::Default).is_err());
        conn.close().await;

        let connector = InMemoryConnector::with_default_database("fallback");
        connector.seed("fallback", "c", vec![doc! { "x": 1 }]);
        let conn = connector.open("mongodb://h/").await.unwrap();
        let db = conn.database(&DatabaseSelector::Default).unwrap();
        assert_eq!(db.read_all("c").await.unwrap().len(), 1);
        conn.close().await;
    }
}
