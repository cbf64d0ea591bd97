use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub common: core_config::Config,
    pub telegram: TelegramConfig,
    /// Public URL of the deployment, echoed in the startup notice.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Secret<String>,
    pub api_url: String,
    /// Chat that receives the startup notice. No notice when unset.
    pub admin_chat_id: Option<i64>,
    pub poll_timeout_secs: u64,
}

impl BotConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        // A bad admin chat only disables the startup notice.
        let admin_chat_id = non_empty_env("ADMIN_CHAT_ID").and_then(|raw| {
            raw.trim()
                .parse::<i64>()
                .map_err(|e| {
                    tracing::warn!("Ignoring ADMIN_CHAT_ID '{}': {}", raw, e);
                })
                .ok()
        });

        Ok(BotConfig {
            common: common_config,
            telegram: TelegramConfig {
                bot_token: Secret::new(get_env("TELEGRAM_BOT_TOKEN", None)?),
                api_url: get_env("TELEGRAM_API_URL", Some(DEFAULT_TELEGRAM_API_URL))?,
                admin_chat_id,
                poll_timeout_secs: get_env("TELEGRAM_POLL_TIMEOUT_SECS", Some("30"))?
                    .parse()
                    .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
            },
            public_url: non_empty_env("RENDER_EXTERNAL_URL"),
        })
    }
}

pub fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match non_empty_env(key) {
        Some(val) => Ok(val),
        None => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} environment variable missing!",
                key
            ))),
        },
    }
}
