//! Event records delivered by the webhook, and their routing taxonomy.

pub mod message;
pub mod types;

pub use message::{
    AudioMessage, ImageMessage, LocationMessage, Message, MessageType, StickerMessage,
    TextMessage, VideoMessage,
};
pub use types::{
    Beacon, BeaconKind, ChatKind, Event, EventCategory, EventKind, Postback, Source,
    VERIFICATION_REPLY_TOKEN,
};
