//! In-memory reply sink that records every send.

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

use super::traits::{OutboundMessage, ReplySink};

/// One recorded `send` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SentReply {
    pub reply_token: String,
    pub messages: Vec<OutboundMessage>,
}

/// Records replies instead of transmitting them. Tokens added with
/// [`MemoryReplySink::fail_token`] are rejected, to simulate delivery errors.
pub struct MemoryReplySink {
    sent: Mutex<Vec<SentReply>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryReplySink {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make every future send to `reply_token` fail.
    pub fn fail_token(&self, reply_token: &str) {
        self.failing.lock().insert(reply_token.to_string());
    }

    /// Snapshot of successful sends, in completion order.
    pub fn sent(&self) -> Vec<SentReply> {
        self.sent.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl Default for MemoryReplySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplySink for MemoryReplySink {
    async fn send(&self, reply_token: &str, messages: &[OutboundMessage]) -> Result<()> {
        if self.failing.lock().contains(reply_token) {
            bail!("reply rejected for token {reply_token}");
        }
        self.sent.lock().push(SentReply {
            reply_token: reply_token.to_string(),
            messages: messages.to_vec(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
