//! Application startup and lifecycle management.
//!
//! Runs the liveness HTTP server next to the Telegram polling loop and
//! fires off the startup notice without waiting on it.

use crate::config::BotConfig;
use crate::handlers::{health_router, CommandHandler};
use crate::services::{
    DatabaseConnector, InMemorySessionStore, MongoConnector, SessionStore, TransferService,
};
use crate::telegram::{Dispatcher, TelegramClient};
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    telegram: TelegramClient,
    dispatcher: Dispatcher,
    sessions: Arc<InMemorySessionStore>,
    admin_chat_id: Option<i64>,
    public_url: Option<String>,
}

impl Application {
    /// Build the application against real MongoDB servers.
    pub async fn build(config: BotConfig) -> Result<Self, AppError> {
        Self::build_with_connector(config, Arc::new(MongoConnector::new())).await
    }

    pub async fn build_with_connector(
        config: BotConfig,
        connector: Arc<dyn DatabaseConnector>,
    ) -> Result<Self, AppError> {
        let sessions = Arc::new(InMemorySessionStore::new());
        let session_store: Arc<dyn SessionStore> = sessions.clone();
        let transfers = TransferService::new(session_store.clone(), connector);
        let handler = CommandHandler::new(session_store, transfers);

        let telegram = TelegramClient::new(&config.telegram.api_url, &config.telegram.bot_token);
        let dispatcher = Dispatcher::new(
            telegram.clone(),
            handler,
            config.telegram.poll_timeout_secs,
        );

        // Bind HTTP listener (port 0 = random port for testing)
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!("Web server running on port {}", http_port);

        Ok(Self {
            http_port,
            http_listener,
            telegram,
            dispatcher,
            sessions,
            admin_chat_id: config.telegram.admin_chat_id,
            public_url: config.public_url,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn sessions(&self) -> Arc<InMemorySessionStore> {
        self.sessions.clone()
    }

    /// Run until the HTTP server fails. The polling loop never returns.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        if let Some(chat_id) = self.admin_chat_id {
            tokio::spawn(send_startup_notice(
                self.telegram.clone(),
                chat_id,
                self.public_url.clone(),
            ));
        }

        tokio::select! {
            result = axum::serve(self.http_listener, health_router()) => {
                if let Err(e) = result {
                    tracing::error!("HTTP server error: {}", e);
                    return Err(std::io::Error::other(format!("HTTP server error: {}", e)));
                }
            }
            _ = self.dispatcher.run() => {}
        }

        Ok(())
    }
}

/// Best effort; a failure is logged and otherwise ignored.
pub async fn send_startup_notice(client: TelegramClient, chat_id: i64, public_url: Option<String>) {
    let text = format!(
        "🚀 Bot deployed successfully!\nService URL: {}",
        public_url.as_deref().unwrap_or("N/A")
    );
    match client.send_message(chat_id, &text, None).await {
        Ok(()) => tracing::info!(chat_id = chat_id, "Startup notification sent"),
        Err(e) => tracing::error!("Failed to send startup notification: {}", e),
    }
}
