use service_core::observability::init_tracing;
use tokio::signal;
use transfer_bot::config::{non_empty_env, BotConfig};
use transfer_bot::services::init_metrics;
use transfer_bot::startup::Application;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = non_empty_env("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
    let otlp_endpoint = non_empty_env("OTLP_ENDPOINT");
    init_tracing("transfer-bot", &log_level, otlp_endpoint.as_deref());

    init_metrics();

    let config = match BotConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start transfer-bot: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    tokio::select! {
        result = app.run_until_stopped() => result?,
        _ = shutdown_signal() => {}
    }

    Ok(())
}
