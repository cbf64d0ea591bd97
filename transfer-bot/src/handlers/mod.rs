pub mod commands;
pub mod health;

pub use commands::{CommandHandler, Reply};
pub use health::router as health_router;
