//! Slot-keyed handler registry, built once at startup and shared read-only.

use std::collections::HashMap;
use std::sync::Arc;

use super::func::handler_fn;
use super::traits::{EventHandler, HandlerArg, HandlerSlot};
use crate::events::{
    AudioMessage, BeaconKind, ChatKind, Event, ImageMessage, LocationMessage, MessageType,
    StickerMessage, TextMessage, VideoMessage,
};
use crate::reply::Reply;

/// Immutable mapping from [`HandlerSlot`] to handler. Unset slots are normal.
pub struct HandlerRegistry {
    handlers: HashMap<HandlerSlot, Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The handler bound to `slot`, or `None` when the slot is unset.
    pub fn lookup(&self, slot: HandlerSlot) -> Option<&Arc<dyn EventHandler>> {
        self.handlers.get(&slot)
    }

    pub fn contains(&self, slot: HandlerSlot) -> bool {
        self.handlers.contains_key(&slot)
    }

    /// Registered slots in [`HandlerSlot::ALL`] order.
    pub fn slots(&self) -> Vec<HandlerSlot> {
        HandlerSlot::ALL
            .into_iter()
            .filter(|slot| self.handlers.contains_key(slot))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Builder for [`HandlerRegistry`]. Registering a slot twice keeps only the
/// last handler.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<HandlerSlot, Arc<dyn EventHandler>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind any [`EventHandler`] to `slot`, replacing a previous binding.
    pub fn register<H: EventHandler + 'static>(mut self, slot: HandlerSlot, handler: H) -> Self {
        if self.handlers.insert(slot, Arc::new(handler)).is_some() {
            tracing::debug!(slot = %slot, "replacing previously registered handler");
        }
        self
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }

    // ── Message events ──────────────────────────────────────────

    pub fn on_text<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &TextMessage) -> Reply + Send + Sync + 'static,
    {
        self.register(
            HandlerSlot::Message(MessageType::Text),
            handler_fn(move |event, arg| match arg {
                HandlerArg::Text(message) => f(event, message),
                _ => Reply::new(),
            }),
        )
    }

    pub fn on_image<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &ImageMessage) -> Reply + Send + Sync + 'static,
    {
        self.register(
            HandlerSlot::Message(MessageType::Image),
            handler_fn(move |event, arg| match arg {
                HandlerArg::Image(message) => f(event, message),
                _ => Reply::new(),
            }),
        )
    }

    pub fn on_video<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &VideoMessage) -> Reply + Send + Sync + 'static,
    {
        self.register(
            HandlerSlot::Message(MessageType::Video),
            handler_fn(move |event, arg| match arg {
                HandlerArg::Video(message) => f(event, message),
                _ => Reply::new(),
            }),
        )
    }

    pub fn on_audio<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &AudioMessage) -> Reply + Send + Sync + 'static,
    {
        self.register(
            HandlerSlot::Message(MessageType::Audio),
            handler_fn(move |event, arg| match arg {
                HandlerArg::Audio(message) => f(event, message),
                _ => Reply::new(),
            }),
        )
    }

    pub fn on_location<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &LocationMessage) -> Reply + Send + Sync + 'static,
    {
        self.register(
            HandlerSlot::Message(MessageType::Location),
            handler_fn(move |event, arg| match arg {
                HandlerArg::Location(message) => f(event, message),
                _ => Reply::new(),
            }),
        )
    }

    pub fn on_sticker<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &StickerMessage) -> Reply + Send + Sync + 'static,
    {
        self.register(
            HandlerSlot::Message(MessageType::Sticker),
            handler_fn(move |event, arg| match arg {
                HandlerArg::Sticker(message) => f(event, message),
                _ => Reply::new(),
            }),
        )
    }

    // ── Id-carrying events ──────────────────────────────────────

    /// Second argument is the user id.
    pub fn on_follow<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register_id(HandlerSlot::Follow, f)
    }

    /// Second argument is the user id.
    pub fn on_unfollow<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register_id(HandlerSlot::Unfollow, f)
    }

    /// Second argument is the group id.
    pub fn on_join_group<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register_id(HandlerSlot::Join(ChatKind::Group), f)
    }

    /// Second argument is the group id.
    pub fn on_leave_group<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register_id(HandlerSlot::Leave(ChatKind::Group), f)
    }

    /// Second argument is the room id.
    pub fn on_join_room<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register_id(HandlerSlot::Join(ChatKind::Room), f)
    }

    /// Second argument is the room id.
    pub fn on_leave_room<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register_id(HandlerSlot::Leave(ChatKind::Room), f)
    }

    /// Second argument is the postback data.
    pub fn on_postback<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register_id(HandlerSlot::Postback, f)
    }

    /// Second argument is the beacon hwid.
    pub fn on_beacon_enter<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register_id(HandlerSlot::Beacon(BeaconKind::Enter), f)
    }

    /// Second argument is the beacon hwid.
    pub fn on_beacon_leave<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register_id(HandlerSlot::Beacon(BeaconKind::Leave), f)
    }

    /// Called when the user taps a beacon banner. Second argument is the hwid.
    pub fn on_beacon_banner<F>(self, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register_id(HandlerSlot::Beacon(BeaconKind::Banner), f)
    }

    fn register_id<F>(self, slot: HandlerSlot, f: F) -> Self
    where
        F: Fn(&Event, &str) -> Reply + Send + Sync + 'static,
    {
        self.register(
            slot,
            handler_fn(move |event, arg| match arg.id() {
                Some(id) => f(event, id),
                None => Reply::new(),
            }),
        )
    }
}
