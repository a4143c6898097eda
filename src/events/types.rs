//! Webhook event records and the category taxonomy used for routing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::message::Message;

/// Reply token the platform attaches to webhook verification requests.
///
/// Events carrying it are reachability checks: they are never routed and
/// never replied to.
pub const VERIFICATION_REPLY_TOKEN: &str = "00000000000000000000000000000000";

/// One inbound occurrence extracted from a webhook batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Empty for event kinds the platform never lets you reply to.
    #[serde(rename = "replyToken", default)]
    pub reply_token: String,
    pub source: Source,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Build an event stamped with the current time.
    pub fn new(reply_token: impl Into<String>, source: Source, kind: EventKind) -> Self {
        Self {
            reply_token: reply_token.into(),
            source,
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn is_verification(&self) -> bool {
        self.reply_token == VERIFICATION_REPLY_TOKEN
    }

    pub fn category(&self) -> Option<EventCategory> {
        self.kind.category()
    }
}

/// Category-specific body of an event. The variant is the category, so a
/// record can never carry a payload that disagrees with its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    Message { message: Message },
    Follow,
    Unfollow,
    Join,
    Leave,
    Postback { postback: Postback },
    Beacon { beacon: Beacon },
    /// Event types added to the platform after this crate was written.
    #[serde(other)]
    Unsupported,
}

impl EventKind {
    pub fn category(&self) -> Option<EventCategory> {
        match self {
            Self::Message { .. } => Some(EventCategory::Message),
            Self::Follow => Some(EventCategory::Follow),
            Self::Unfollow => Some(EventCategory::Unfollow),
            Self::Join => Some(EventCategory::Join),
            Self::Leave => Some(EventCategory::Leave),
            Self::Postback { .. } => Some(EventCategory::Postback),
            Self::Beacon { .. } => Some(EventCategory::Beacon),
            Self::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Message,
    Follow,
    Unfollow,
    Join,
    Leave,
    Postback,
    Beacon,
}

impl EventCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Follow => "follow",
            Self::Unfollow => "unfollow",
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Postback => "postback",
            Self::Beacon => "beacon",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an event came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    User {
        #[serde(rename = "userId")]
        user_id: String,
    },
    Group {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    Room {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl Source {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
        }
    }

    pub fn group(group_id: impl Into<String>) -> Self {
        Self::Group {
            group_id: group_id.into(),
            user_id: None,
        }
    }

    pub fn room(room_id: impl Into<String>) -> Self {
        Self::Room {
            room_id: room_id.into(),
            user_id: None,
        }
    }

    /// The sending user, if the platform disclosed one.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User { user_id } => Some(user_id),
            Self::Group { user_id, .. } | Self::Room { user_id, .. } => user_id.as_deref(),
            Self::Unknown => None,
        }
    }

    /// The multi-person chat this source belongs to, with its id.
    pub fn chat(&self) -> Option<(ChatKind, &str)> {
        match self {
            Self::Group { group_id, .. } => Some((ChatKind::Group, group_id)),
            Self::Room { room_id, .. } => Some((ChatKind::Room, room_id)),
            Self::User { .. } | Self::Unknown => None,
        }
    }
}

/// Subcategory of join/leave events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Group,
    Room,
}

impl fmt::Display for ChatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Group => "group",
            Self::Room => "room",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Postback {
    pub data: String,
    /// Date/time picker selections, when the postback came from one.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beacon {
    pub hwid: String,
    #[serde(rename = "type")]
    pub kind: BeaconKind,
    /// Device message, hex encoded.
    #[serde(rename = "dm", default, skip_serializing_if = "Option::is_none")]
    pub device_message: Option<String>,
}

/// Subcategory of beacon events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeaconKind {
    Enter,
    Leave,
    Banner,
    #[serde(other)]
    Unsupported,
}

impl fmt::Display for BeaconKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::Banner => "banner",
            Self::Unsupported => "unsupported",
        })
    }
}
