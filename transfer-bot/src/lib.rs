//! transfer-bot: a Telegram bot that copies every document of one MongoDB
//! collection into another, driven by per-chat connection settings.
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod telegram;
