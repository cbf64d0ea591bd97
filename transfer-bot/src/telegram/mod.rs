pub mod client;
pub mod command;
pub mod dispatcher;
pub mod types;

pub use client::{TelegramClient, TelegramError};
pub use command::Command;
pub use dispatcher::Dispatcher;
pub use types::{Chat, Message, ParseMode, Update, User};
