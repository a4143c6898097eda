use thiserror::Error;

use crate::events::Event;

/// Why a webhook request could not be turned into events.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Missing or mismatching request signature. Maps to a client error.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Signature matched but the body is not a valid webhook payload.
    #[error("malformed webhook body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Verifies and decodes a raw webhook request into event records.
pub trait WebhookParser: Send + Sync {
    /// `signature` is the raw signature header value, if the request had one.
    fn parse(&self, signature: Option<&str>, body: &[u8]) -> Result<Vec<Event>, ParseError>;
    fn name(&self) -> &str;
}
