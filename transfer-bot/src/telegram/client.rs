use super::types::{
    ApiResponse, GetUpdatesRequest, Message, ParseMode, SendMessageRequest, Update,
};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error {code:?}: {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },
}

/// Minimal Bot API client over HTTPS + JSON.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    /// `{api_url}/bot{token}`; never logged.
    base_url: Secret<String>,
}

impl TelegramClient {
    pub fn new(api_url: &str, bot_token: &Secret<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: Secret::new(format!(
                "{}/bot{}",
                api_url.trim_end_matches('/'),
                bot_token.expose_secret()
            )),
        }
    }

    /// Long-poll for new messages. `offset` acknowledges everything before it.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message"],
        };
        // Leave headroom over the server-side long-poll wait.
        let timeout = Duration::from_secs(timeout_secs) + Duration::from_secs(10);
        self.call("getUpdates", &request, timeout).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
        };
        let _: Message = self.call("sendMessage", &request, REQUEST_TIMEOUT).await?;
        Ok(())
    }

    async fn call<P, R>(&self, method: &str, payload: &P, timeout: Duration) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url.expose_secret(), method);
        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;

        // The API reports failures in the body, usually with a non-2xx status.
        let body: ApiResponse<R> = response
            .json()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;

        match body {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                description,
                error_code,
                ..
            } => Err(TelegramError::Api {
                code: error_code,
                description: description.unwrap_or_else(|| format!("{} failed", method)),
            }),
        }
    }
}
