use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An outbound message object, serialized in the platform's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    Sticker {
        #[serde(rename = "packageId")]
        package_id: String,
        #[serde(rename = "stickerId")]
        sticker_id: String,
    },
    Image {
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        #[serde(rename = "previewImageUrl")]
        preview_image_url: String,
    },
    Video {
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        #[serde(rename = "previewImageUrl")]
        preview_image_url: String,
    },
    Audio {
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        /// Length in milliseconds.
        duration: u64,
    },
    Location {
        title: String,
        address: String,
        latitude: f64,
        longitude: f64,
    },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn sticker(package_id: impl Into<String>, sticker_id: impl Into<String>) -> Self {
        Self::Sticker {
            package_id: package_id.into(),
            sticker_id: sticker_id.into(),
        }
    }
}

/// Ordered messages a handler wants sent back. Empty means "no reply".
pub type Reply = Vec<OutboundMessage>;

/// Delivers replies addressed by a reply token.
///
/// The dispatcher calls `send` concurrently from many event tasks, each with
/// a distinct token, and places no serialization around the sink.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Transmit `messages` in order as the reply to `reply_token`.
    async fn send(&self, reply_token: &str, messages: &[OutboundMessage]) -> Result<()>;
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message_wire_shape() {
        let json = serde_json::to_value(OutboundMessage::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "text": "hi"}));
    }

    #[test]
    fn sticker_message_wire_shape() {
        let json = serde_json::to_value(OutboundMessage::sticker("446", "1988")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "sticker", "packageId": "446", "stickerId": "1988"})
        );
    }

    #[test]
    fn image_message_uses_camel_case_urls() {
        let msg = OutboundMessage::Image {
            original_content_url: "https://example.com/a.jpg".into(),
            preview_image_url: "https://example.com/a_s.jpg".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"originalContentUrl\""));
        assert!(json.contains("\"previewImageUrl\""));
    }
}
