//! Handler contract and the composite key handlers are registered under.

use async_trait::async_trait;
use std::fmt;

use crate::events::{
    AudioMessage, BeaconKind, ChatKind, Event, EventCategory, ImageMessage, LocationMessage,
    MessageType, StickerMessage, TextMessage, VideoMessage,
};
use crate::reply::Reply;

/// A `(category, subcategory)` routing slot. Every event the dispatcher can
/// route resolves to exactly one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerSlot {
    Message(MessageType),
    Follow,
    Unfollow,
    Join(ChatKind),
    Leave(ChatKind),
    Postback,
    Beacon(BeaconKind),
}

impl HandlerSlot {
    /// Every routable slot, in display order.
    pub const ALL: [HandlerSlot; 16] = [
        HandlerSlot::Message(MessageType::Text),
        HandlerSlot::Message(MessageType::Image),
        HandlerSlot::Message(MessageType::Video),
        HandlerSlot::Message(MessageType::Audio),
        HandlerSlot::Message(MessageType::Location),
        HandlerSlot::Message(MessageType::Sticker),
        HandlerSlot::Follow,
        HandlerSlot::Unfollow,
        HandlerSlot::Join(ChatKind::Group),
        HandlerSlot::Leave(ChatKind::Group),
        HandlerSlot::Join(ChatKind::Room),
        HandlerSlot::Leave(ChatKind::Room),
        HandlerSlot::Postback,
        HandlerSlot::Beacon(BeaconKind::Enter),
        HandlerSlot::Beacon(BeaconKind::Leave),
        HandlerSlot::Beacon(BeaconKind::Banner),
    ];

    pub fn category(self) -> EventCategory {
        match self {
            Self::Message(_) => EventCategory::Message,
            Self::Follow => EventCategory::Follow,
            Self::Unfollow => EventCategory::Unfollow,
            Self::Join(_) => EventCategory::Join,
            Self::Leave(_) => EventCategory::Leave,
            Self::Postback => EventCategory::Postback,
            Self::Beacon(_) => EventCategory::Beacon,
        }
    }
}

impl fmt::Display for HandlerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(ty) => write!(f, "message.{ty}"),
            Self::Join(chat) => write!(f, "join.{chat}"),
            Self::Leave(chat) => write!(f, "leave.{chat}"),
            Self::Beacon(kind) => write!(f, "beacon.{kind}"),
            Self::Follow | Self::Unfollow | Self::Postback => f.write_str(self.category().as_str()),
        }
    }
}

/// The category-specific argument a handler receives next to the event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandlerArg<'a> {
    Text(&'a TextMessage),
    Image(&'a ImageMessage),
    Video(&'a VideoMessage),
    Audio(&'a AudioMessage),
    Location(&'a LocationMessage),
    Sticker(&'a StickerMessage),
    /// Follow/unfollow: the user who (un)followed.
    UserId(&'a str),
    /// Join/leave of a group chat.
    GroupId(&'a str),
    /// Join/leave of a multi-person room.
    RoomId(&'a str),
    PostbackData(&'a str),
    /// Beacon events: the beacon's hardware id.
    Hwid(&'a str),
}

impl<'a> HandlerArg<'a> {
    /// The string id for non-message slots, `None` for message payloads.
    pub fn id(&self) -> Option<&'a str> {
        match *self {
            Self::UserId(id)
            | Self::GroupId(id)
            | Self::RoomId(id)
            | Self::PostbackData(id)
            | Self::Hwid(id) => Some(id),
            _ => None,
        }
    }
}

/// User-supplied logic bound to one [`HandlerSlot`].
///
/// The returned messages are sent back with the event's reply token; an
/// empty reply sends nothing. Handlers run concurrently on the tokio runtime,
/// one task per event, so implementations must be `Send + Sync`.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Event, arg: HandlerArg<'_>) -> Reply;
}
