use async_trait::async_trait;

use super::traits::{EventHandler, HandlerArg};
use crate::events::Event;
use crate::reply::Reply;

/// Adapts a synchronous closure into an [`EventHandler`].
pub struct FnHandler<F> {
    f: F,
}

/// Wrap `f` so it can be registered for any slot.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Event, HandlerArg<'_>) -> Reply + Send + Sync + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&Event, HandlerArg<'_>) -> Reply + Send + Sync + 'static,
{
    async fn handle(&self, event: &Event, arg: HandlerArg<'_>) -> Reply {
        (self.f)(event, arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, Source};
    use crate::reply::OutboundMessage;

    #[tokio::test]
    async fn closure_receives_argument() {
        let handler = handler_fn(|_event, arg| match arg.id() {
            Some(id) => vec![OutboundMessage::text(format!("saw {id}"))],
            None => Vec::new(),
        });
        let event = Event::new("T1", Source::user("U1"), EventKind::Follow);

        let reply = handler.handle(&event, HandlerArg::UserId("U1")).await;
        assert_eq!(reply, vec![OutboundMessage::text("saw U1")]);
    }
}
