//! LINE Messaging API client: webhook verification/parsing and the reply API.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

use super::traits::{ParseError, WebhookParser};
use crate::config::LineConfig;
use crate::events::Event;
use crate::reply::{OutboundMessage, ReplySink};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 HMAC-SHA256 of the request body.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

const REPLY_PATH: &str = "/v2/bot/message/reply";

/// Webhook request body.
#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(default)]
    destination: Option<String>,
    events: Vec<Event>,
}

#[derive(Debug, Serialize)]
struct ReplyRequest<'a> {
    #[serde(rename = "replyToken")]
    reply_token: &'a str,
    messages: &'a [OutboundMessage],
}

pub struct LineClient {
    /// Keyed with the channel secret; cloned for every signature check.
    mac: HmacSha256,
    /// `None` for verify-only clients (`serve --dry-run`).
    channel_access_token: Option<String>,
    api_base_url: String,
    http: reqwest::Client,
}

impl LineClient {
    pub fn new(channel_secret: &str, channel_access_token: &str) -> Result<Self> {
        if channel_access_token.trim().is_empty() {
            bail!("channel access token must not be empty");
        }
        Self::with_options(
            channel_secret,
            Some(channel_access_token),
            crate::config::DEFAULT_LINE_API_BASE_URL,
            Duration::from_secs(crate::config::DEFAULT_REPLY_TIMEOUT_SECS),
        )
    }

    /// Build from `[line]`. Without an access token the client can still
    /// verify and parse webhooks, but every reply fails.
    pub fn from_config(config: &LineConfig) -> Result<Self> {
        let secret = config
            .channel_secret
            .as_deref()
            .context("line.channel_secret is not set")?;
        let token = config
            .channel_access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty());
        Self::with_options(
            secret,
            token,
            &config.api_base_url,
            Duration::from_secs(config.reply_timeout_secs),
        )
    }

    fn with_options(
        channel_secret: &str,
        channel_access_token: Option<&str>,
        api_base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if channel_secret.trim().is_empty() {
            bail!("channel secret must not be empty");
        }
        let mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
            .map_err(|_| anyhow::anyhow!("Invalid channel secret"))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            mac,
            channel_access_token: channel_access_token.map(str::to_string),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base64 HMAC-SHA256 of `body` under the channel secret.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(body);
        STANDARD.encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of a signature header against `body`.
    pub fn verify_signature(&self, body: &[u8], signature: &str) -> bool {
        let Ok(expected) = STANDARD.decode(signature.trim()) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(body);
        mac.verify_slice(&expected).is_ok()
    }

    fn reply_url(&self) -> String {
        format!("{}{REPLY_PATH}", self.api_base_url)
    }
}

impl WebhookParser for LineClient {
    fn parse(&self, signature: Option<&str>, body: &[u8]) -> Result<Vec<Event>, ParseError> {
        let signature = signature.ok_or(ParseError::InvalidSignature)?;
        if !self.verify_signature(body, signature) {
            return Err(ParseError::InvalidSignature);
        }
        let body: WebhookBody = serde_json::from_slice(body)?;
        tracing::debug!(
            destination = body.destination.as_deref().unwrap_or(""),
            events = body.events.len(),
            "parsed webhook body"
        );
        Ok(body.events)
    }

    fn name(&self) -> &str {
        "line"
    }
}

#[async_trait]
impl ReplySink for LineClient {
    async fn send(&self, reply_token: &str, messages: &[OutboundMessage]) -> Result<()> {
        let access_token = self
            .channel_access_token
            .as_deref()
            .context("line.channel_access_token is not set; cannot reply")?;
        let response = self
            .http
            .post(self.reply_url())
            .bearer_auth(access_token)
            .json(&ReplyRequest {
                reply_token,
                messages,
            })
            .send()
            .await
            .context("LINE reply request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("LINE reply API returned {status}: {body}");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "line"
    }
}
