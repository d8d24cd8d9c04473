//! HTTP client for the Telegram Bot API.
//!
//! Encoded payloads are posted through a [`Transport`]; [`HttpTransport`] is
//! the reqwest implementation, sending JSON bodies with `.json()` and uploads
//! as a `reqwest::multipart::Form`. The token is part of every method URL.

use crate::encoder::{self, Payload};
use crate::envelope::OutboundMessage;
use crate::error::{EntityError, EntityResult};
use crate::types::*;
use crate::webhooks::{self, WebhookConfig};
use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Posts an encoded payload and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &str, payload: Payload) -> EntityResult<Vec<u8>>;
}

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &BotConfig) -> EntityResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10));

        if let Some(ref proxy_url) = config.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| EntityError::Config(format!("invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| EntityError::Config(format!("HTTP client build error: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, payload: Payload) -> EntityResult<Vec<u8>> {
        let request = self.http.post(url);
        let request = match payload {
            Payload::Json(body) => request.json(&body),
            Payload::Multipart(body) => request.multipart(body.into_form()?),
        };

        // Error messages must not carry the URL, it contains the token.
        let resp = request
            .send()
            .await
            .map_err(|e| EntityError::Transport(e.without_url().to_string()))?;

        // Telegram answers errors with a JSON body too, so the status is not checked here.
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| EntityError::Transport(e.without_url().to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Telegram Bot API client over any [`Transport`].
#[derive(Debug, Clone)]
pub struct TelegramClient<T: Transport> {
    transport: T,
    token: String,
    api_base: String,
}

impl TelegramClient<HttpTransport> {
    /// Client with the default reqwest transport.
    pub fn from_config(config: &BotConfig) -> EntityResult<Self> {
        let transport = HttpTransport::new(config)?;
        Self::new(config, transport)
    }
}

impl<T: Transport> TelegramClient<T> {
    pub fn new(config: &BotConfig, transport: T) -> EntityResult<Self> {
        if config.token.is_empty() {
            return Err(EntityError::Config("bot token must not be empty".into()));
        }
        let api_base = config
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            transport,
            token: config.token.clone(),
            api_base,
        })
    }

    /// Full URL for a Bot API method.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Token masked for logging.
    pub fn masked_token(&self) -> String {
        let n = self.token.len();
        match (self.token.get(..5), self.token.get(n.saturating_sub(4)..)) {
            (Some(head), Some(tail)) if n > 10 => format!("{head}...{tail}"),
            _ => "***".to_string(),
        }
    }

    /// Post an encoded payload to `method` and unwrap the API response.
    pub async fn call<R: DeserializeOwned>(&self, method: &str, payload: Payload) -> EntityResult<R> {
        debug!(
            "Telegram {} via bot {} ({:?}, {} fields)",
            method,
            self.masked_token(),
            payload.format(),
            payload.field_count()
        );

        let raw = self.transport.post(&self.method_url(method), payload).await?;
        let resp: ApiResponse<R> = serde_json::from_slice(&raw)?;

        if resp.ok {
            return resp.result.ok_or_else(|| EntityError::Api {
                code: 0,
                description: format!("{method}: ok=true but no result"),
            });
        }

        let code = resp.error_code.unwrap_or(0);
        let description = resp.description.unwrap_or_else(|| "Unknown error".into());
        warn!("Telegram {} failed with {}: {}", method, code, description);
        Err(EntityError::Api { code, description })
    }

    /// Encode `msg` and send it with the method its populated group implies.
    pub async fn send<R: DeserializeOwned>(&self, msg: &OutboundMessage) -> EntityResult<R> {
        let payload = encoder::encode(msg)?;
        self.call(msg.method(), payload).await
    }

    /// The bot's own user via getMe.
    pub async fn get_me(&self) -> EntityResult<TgUser> {
        self.call("getMe", Payload::Json(json!({}))).await
    }

    pub async fn set_webhook(&self, config: &WebhookConfig) -> EntityResult<bool> {
        self.call("setWebhook", config.set_webhook_payload()).await
    }

    /// Long-poll for updates starting at `offset`.
    pub async fn get_updates(&self, offset: Option<i64>, timeout: Option<i64>) -> EntityResult<Vec<TgUpdate>> {
        let payload = webhooks::get_updates_payload(offset, None, timeout);
        self.call("getUpdates", payload).await
    }
}
