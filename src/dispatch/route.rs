//! Resolves an event to its handler slot and handler argument.

use crate::events::{BeaconKind, ChatKind, Event, EventKind, Message, MessageType};
use crate::handlers::{HandlerArg, HandlerSlot};

/// A resolved routing decision for one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route<'a> {
    pub slot: HandlerSlot,
    pub arg: HandlerArg<'a>,
}

/// Pick the slot for `event`.
///
/// Returns `None` when the event's payload is a variant this crate does not
/// know, or a join/leave comes from a source that is not a group or room.
/// Such events are dropped without being reported. Follow and unfollow always
/// route; the user id is empty when the source carries none.
pub fn route(event: &Event) -> Option<Route<'_>> {
    match &event.kind {
        EventKind::Message { message } => {
            let (ty, arg) = match message {
                Message::Text(m) => (MessageType::Text, HandlerArg::Text(m)),
                Message::Image(m) => (MessageType::Image, HandlerArg::Image(m)),
                Message::Video(m) => (MessageType::Video, HandlerArg::Video(m)),
                Message::Audio(m) => (MessageType::Audio, HandlerArg::Audio(m)),
                Message::Location(m) => (MessageType::Location, HandlerArg::Location(m)),
                Message::Sticker(m) => (MessageType::Sticker, HandlerArg::Sticker(m)),
                Message::Unsupported => return None,
            };
            Some(Route {
                slot: HandlerSlot::Message(ty),
                arg,
            })
        }
        EventKind::Follow => Some(user_route(event, HandlerSlot::Follow)),
        EventKind::Unfollow => Some(user_route(event, HandlerSlot::Unfollow)),
        EventKind::Join => chat_route(event, HandlerSlot::Join),
        EventKind::Leave => chat_route(event, HandlerSlot::Leave),
        EventKind::Postback { postback } => Some(Route {
            slot: HandlerSlot::Postback,
            arg: HandlerArg::PostbackData(&postback.data),
        }),
        EventKind::Beacon { beacon } => match beacon.kind {
            BeaconKind::Unsupported => None,
            kind => Some(Route {
                slot: HandlerSlot::Beacon(kind),
                arg: HandlerArg::Hwid(&beacon.hwid),
            }),
        },
        EventKind::Unsupported => None,
    }
}

fn user_route(event: &Event, slot: HandlerSlot) -> Route<'_> {
    Route {
        slot,
        arg: HandlerArg::UserId(event.source.user_id().unwrap_or("")),
    }
}

fn chat_route(event: &Event, slot: fn(ChatKind) -> HandlerSlot) -> Option<Route<'_>> {
    let (kind, id) = event.source.chat()?;
    let arg = match kind {
        ChatKind::Group => HandlerArg::GroupId(id),
        ChatKind::Room => HandlerArg::RoomId(id),
    };
    Some(Route {
        slot: slot(kind),
        arg,
    })
}
