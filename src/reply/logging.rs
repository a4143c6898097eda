use anyhow::Result;
use async_trait::async_trait;

use super::traits::{OutboundMessage, ReplySink};

/// Reply sink that only logs what it would have sent. Used for dry runs.
pub struct LoggingReplySink;

#[async_trait]
impl ReplySink for LoggingReplySink {
    async fn send(&self, reply_token: &str, messages: &[OutboundMessage]) -> Result<()> {
        tracing::info!(
            reply_token = %reply_token,
            messages = messages.len(),
            "dispatching reply (dry run)"
        );
        for message in messages {
            tracing::debug!(reply_token = %reply_token, ?message, "reply message");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_reply_succeeds() {
        let sink = LoggingReplySink;
        let messages = vec![OutboundMessage::text("test reply")];
        assert!(sink.send("T1", &messages).await.is_ok());
    }

    #[test]
    fn name_is_logging() {
        assert_eq!(LoggingReplySink.name(), "logging");
    }
}
