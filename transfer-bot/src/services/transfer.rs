//! One-shot copy of a whole collection between the two databases configured
//! for a chat.
//!
//! A transfer reads the session once, opens one connection per endpoint,
//! loads every source document into memory and writes them to the target in
//! a single bulk insert. Nothing is retried; both connections are closed
//! before `transfer` returns, whatever the outcome.

use crate::models::transfer::TRANSFER_USAGE;
use crate::models::{ChatId, TransferError, TransferOutcome, TransferRequest};
use crate::services::database::{DatabaseConnection, DatabaseConnector, DatabaseError};
use crate::services::endpoint::DatabaseSelector;
use crate::services::session_store::SessionStore;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

impl From<DatabaseError> for TransferError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Connection(msg) => TransferError::Connection(msg),
            DatabaseError::Operation(msg) => TransferError::DataOperation(msg),
            DatabaseError::Other(msg) => TransferError::Unclassified(msg),
        }
    }
}

/// While connecting, a rejected operation still means the endpoint is unusable.
fn connect_error(err: DatabaseError) -> TransferError {
    match err {
        DatabaseError::Operation(msg) => TransferError::Connection(msg),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct TransferService {
    sessions: Arc<dyn SessionStore>,
    connector: Arc<dyn DatabaseConnector>,
}

impl TransferService {
    pub fn new(sessions: Arc<dyn SessionStore>, connector: Arc<dyn DatabaseConnector>) -> Self {
        Self {
            sessions,
            connector,
        }
    }

    /// Validate, copy and classify. Never panics outward: an unexpected
    /// panic inside the copy is reported as `TransferError::Unclassified`.
    #[tracing::instrument(skip(self, chat_id, args), fields(chat_id = %chat_id))]
    pub async fn transfer(
        &self,
        chat_id: ChatId,
        args: &[String],
    ) -> Result<TransferOutcome, TransferError> {
        let request = self.prepare(chat_id, args)?;

        let result = self.execute(&request).await;

        match &result {
            Ok(TransferOutcome::Transferred { count, .. }) => tracing::info!(
                source_collection = %request.source_collection,
                target_collection = %request.target_collection,
                count = *count,
                "Transferred documents"
            ),
            Ok(TransferOutcome::EmptySource { .. }) => tracing::info!(
                source_collection = %request.source_collection,
                "Source collection is empty, nothing transferred"
            ),
            Err(e) => tracing::error!(kind = e.kind(), "Transfer failed: {}", e),
        }

        result
    }

    /// Check the arguments and bind the session's current URIs.
    ///
    /// The session is read exactly once here; later configuration changes do
    /// not affect a transfer that has passed this point.
    pub fn prepare(&self, chat_id: ChatId, args: &[String]) -> Result<TransferRequest, TransferError> {
        let (source_collection, target_collection) = match args {
            [source, target] if !source.is_empty() && !target.is_empty() => {
                (source.clone(), target.clone())
            }
            _ => return Err(TransferError::Usage(TRANSFER_USAGE)),
        };

        let session = self.sessions.get(chat_id);
        let (source_uri, target_uri) = session
            .endpoints()
            .ok_or(TransferError::ConfigurationMissing)?;

        Ok(TransferRequest {
            chat_id,
            source_collection,
            target_collection,
            source_uri: source_uri.to_string(),
            target_uri: target_uri.to_string(),
        })
    }

    async fn execute(&self, request: &TransferRequest) -> Result<TransferOutcome, TransferError> {
        let source = self
            .connector
            .open(&request.source_uri)
            .await
            .map_err(connect_error)?;

        let target = match self.connector.open(&request.target_uri).await {
            Ok(conn) => conn,
            Err(e) => {
                source.close().await;
                return Err(connect_error(e));
            }
        };

        let result = AssertUnwindSafe(copy_collection(source.as_ref(), target.as_ref(), request))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(TransferError::Unclassified(
                    "transfer aborted unexpectedly".to_string(),
                ))
            });

        source.close().await;
        target.close().await;
        result
    }
}

async fn copy_collection(
    source: &dyn DatabaseConnection,
    target: &dyn DatabaseConnection,
    request: &TransferRequest,
) -> Result<TransferOutcome, TransferError> {
    let source_selector = DatabaseSelector::from_uri(&request.source_uri);
    let target_selector = DatabaseSelector::from_uri(&request.target_uri);
    let source_db = source.database(&source_selector).map_err(connect_error)?;
    let target_db = target.database(&target_selector).map_err(connect_error)?;

    tracing::debug!(
        source_database = %source_selector.label(),
        target_database = %target_selector.label(),
        "Reading source collection"
    );
    let documents = source_db.read_all(&request.source_collection).await?;
    if documents.is_empty() {
        return Ok(TransferOutcome::EmptySource {
            source_collection: request.source_collection.clone(),
        });
    }

    let count = target_db
        .bulk_insert(&request.target_collection, documents)
        .await?;

    Ok(TransferOutcome::Transferred {
        count,
        source_collection: request.source_collection.clone(),
        target_collection: request.target_collection.clone(),
    })
}
