//! Inbound message payloads carried by `message` events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The message carried by a `message` event. Exactly one variant is present.
///
/// Message types this crate does not know yet (files, new media kinds)
/// deserialize to [`Message::Unsupported`] and are never dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Text(TextMessage),
    Image(ImageMessage),
    Video(VideoMessage),
    Audio(AudioMessage),
    Location(LocationMessage),
    Sticker(StickerMessage),
    #[serde(other)]
    Unsupported,
}

impl Message {
    /// The routing subcategory of this message, `None` for unsupported kinds.
    pub fn message_type(&self) -> Option<MessageType> {
        match self {
            Self::Text(_) => Some(MessageType::Text),
            Self::Image(_) => Some(MessageType::Image),
            Self::Video(_) => Some(MessageType::Video),
            Self::Audio(_) => Some(MessageType::Audio),
            Self::Location(_) => Some(MessageType::Location),
            Self::Sticker(_) => Some(MessageType::Sticker),
            Self::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMessage {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMessage {
    pub id: String,
    /// Length in milliseconds, when the platform reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMessage {
    pub id: String,
    /// Length in milliseconds, when the platform reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMessage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerMessage {
    pub id: String,
    #[serde(rename = "packageId")]
    pub package_id: String,
    #[serde(rename = "stickerId")]
    pub sticker_id: String,
}

/// Subcategory of a `message` event used as part of a handler slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    Location,
    Sticker,
}

impl MessageType {
    pub const ALL: [MessageType; 6] = [
        MessageType::Text,
        MessageType::Image,
        MessageType::Video,
        MessageType::Audio,
        MessageType::Location,
        MessageType::Sticker,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Location => "location",
            Self::Sticker => "sticker",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sticker_message_uses_platform_field_names() {
        let msg: Message = serde_json::from_str(
            r#"{"type":"sticker","id":"325708","packageId":"1","stickerId":"1"}"#,
        )
        .unwrap();
        match msg {
            Message::Sticker(sticker) => {
                assert_eq!(sticker.package_id, "1");
                assert_eq!(sticker.sticker_id, "1");
            }
            other => panic!("Expected sticker, got {:?}", other),
        }
    }

    #[test]
    fn unknown_message_type_is_unsupported() {
        let msg: Message =
            serde_json::from_str(r#"{"type":"file","id":"9","fileName":"a.pdf"}"#).unwrap();
        assert_eq!(msg, Message::Unsupported);
        assert_eq!(msg.message_type(), None);
    }

    #[test]
    fn location_without_title_parses() {
        let msg: Message = serde_json::from_str(
            r#"{"type":"location","id":"1","address":"Tokyo","latitude":35.65910807942215,"longitude":139.70372892916203}"#,
        )
        .unwrap();
        match msg {
            Message::Location(loc) => {
                assert!(loc.title.is_none());
                assert_eq!(loc.address, "Tokyo");
                assert!((loc.latitude - 35.659).abs() < 0.001);
            }
            other => panic!("Expected location, got {:?}", other),
        }
    }

    #[test]
    fn message_type_display_matches_wire_name() {
        for ty in MessageType::ALL {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{ty}\""));
        }
    }
}
