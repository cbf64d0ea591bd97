//! service-core: shared configuration, error and logging plumbing.
pub mod config;
pub mod error;
pub mod observability;

pub use serde;
pub use tokio;
pub use tracing;
