//! Built-in echo bot served by `linehook serve`.

use crate::events::{Event, Source};
use crate::handlers::HandlerRegistry;
use crate::reply::{OutboundMessage, Reply};

pub const FOLLOW_GREETING: &str = "Thanks for adding me! Send me anything and I'll say it back.";
pub const JOIN_GREETING: &str = "Hello, everyone! I repeat whatever you say here.";

/// Registry answering text and stickers with themselves and greeting new chats.
pub fn echo_registry() -> HandlerRegistry {
    HandlerRegistry::builder()
        .on_text(|_, message| vec![OutboundMessage::text(message.text.clone())])
        .on_sticker(|_, sticker| {
            vec![OutboundMessage::sticker(
                sticker.package_id.clone(),
                sticker.sticker_id.clone(),
            )]
        })
        .on_follow(|_, _user_id| vec![OutboundMessage::text(FOLLOW_GREETING)])
        .on_join_group(|_, _| vec![OutboundMessage::text(JOIN_GREETING)])
        .on_join_room(|_, _| vec![OutboundMessage::text(JOIN_GREETING)])
        .on_postback(|_, data| vec![OutboundMessage::text(format!("Got postback: {data}"))])
        .on_beacon_enter(beacon_greeting)
        .build()
}

fn beacon_greeting(event: &Event, hwid: &str) -> Reply {
    let text = match &event.source {
        Source::User { user_id } => format!("Welcome, {user_id}! You are near beacon {hwid}."),
        _ => format!("Welcome! You are near beacon {hwid}."),
    };
    vec![OutboundMessage::text(text)]
}
