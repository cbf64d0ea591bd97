pub mod database;
pub mod endpoint;
pub mod metrics;
pub mod session_store;
pub mod transfer;

pub use database::{
    DatabaseConnection, DatabaseConnector, DatabaseError, DatabaseHandle, InMemoryConnector,
    MongoConnector,
};
pub use endpoint::{resolve_database_name, DatabaseSelector};
pub use metrics::{get_metrics, init_metrics, record_command, record_documents_transferred};
pub use session_store::{InMemorySessionStore, SessionStore};
pub use transfer::TransferService;
