//! Transfer request, outcome and failure taxonomy.

use crate::models::ChatId;
use thiserror::Error;

pub const TRANSFER_USAGE: &str = "/transfer <source_collection> <target_collection>";

/// A validated transfer, bound to the URIs the session held when it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub chat_id: ChatId,
    pub source_collection: String,
    pub target_collection: String,
    pub source_uri: String,
    pub target_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Transferred {
        count: u64,
        source_collection: String,
        target_collection: String,
    },
    /// The source collection held no documents; nothing was written.
    EmptySource { source_collection: String },
}

impl TransferOutcome {
    pub fn reply_text(&self) -> String {
        match self {
            TransferOutcome::Transferred {
                count,
                source_collection,
                target_collection,
            } => format!(
                "✅ Successfully transferred {} documents from {} to {}",
                count, source_collection, target_collection
            ),
            TransferOutcome::EmptySource { .. } => {
                "ℹ️ No documents found in source collection".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("source and target URIs are not both configured")]
    ConfigurationMissing,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Data operation error: {0}")]
    DataOperation(String),

    #[error("Unexpected error: {0}")]
    Unclassified(String),
}

impl TransferError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::Usage(_) => "usage",
            TransferError::ConfigurationMissing => "configuration_missing",
            TransferError::Connection(_) => "connection",
            TransferError::DataOperation(_) => "data_operation",
            TransferError::Unclassified(_) => "unclassified",
        }
    }

    pub fn reply_text(&self) -> String {
        match self {
            TransferError::Usage(usage) => format!("❌ Usage: {}", usage),
            TransferError::ConfigurationMissing => {
                "❌ Please set both source and target URIs first!".to_string()
            }
            TransferError::Connection(msg) => format!("❌ MongoDB connection error: {}", msg),
            TransferError::DataOperation(msg) => format!("❌ MongoDB Error: {}", msg),
            TransferError::Unclassified(msg) => format!("❌ Unexpected error: {}", msg),
        }
    }
}
