//! Concurrent batch dispatcher: one task per event, joined before returning.

use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::{self, JoinSet};

use super::route::route;
use super::traits::{
    BatchReport, DispatchError, Dispatcher, EventReport, MissingHandlerPolicy, Outcome,
};
use crate::events::Event;
use crate::handlers::HandlerRegistry;
use crate::reply::ReplySink;

/// Routes each event to its registered handler and sends non-empty replies.
///
/// The registry and sink are shared by every event task; neither is mutated
/// while a batch is in flight.
pub struct DefaultDispatcher {
    registry: Arc<HandlerRegistry>,
    sink: Arc<dyn ReplySink>,
    missing_handler: MissingHandlerPolicy,
}

impl DefaultDispatcher {
    pub fn new(registry: Arc<HandlerRegistry>, sink: Arc<dyn ReplySink>) -> Self {
        Self {
            registry,
            sink,
            missing_handler: MissingHandlerPolicy::default(),
        }
    }

    pub fn with_missing_handler(mut self, policy: MissingHandlerPolicy) -> Self {
        self.missing_handler = policy;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }
}

#[async_trait]
impl Dispatcher for DefaultDispatcher {
    async fn handle_batch(&self, events: Vec<Event>) -> BatchReport {
        let total = events.len();
        let mut slots: Vec<Option<EventReport>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);

        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(total);
        for (index, event) in events.into_iter().enumerate() {
            // Checked per event: a verification event never stops the rest of the batch.
            if event.is_verification() {
                tracing::info!(index, "webhook verification event, not dispatching");
                slots[index] = Some(EventReport {
                    reply_token: event.reply_token,
                    outcome: Outcome::Verification,
                });
                continue;
            }

            let registry = Arc::clone(&self.registry);
            let sink = Arc::clone(&self.sink);
            let policy = self.missing_handler;
            let reply_token = event.reply_token.clone();
            let handle = tasks.spawn(async move {
                let outcome = AssertUnwindSafe(process_event(&registry, &*sink, policy, &event))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Outcome::Failed(DispatchError::Panicked(panic_message(&*panic)))
                    });
                EventReport {
                    reply_token: event.reply_token,
                    outcome,
                }
            });
            pending.insert(handle.id(), (index, reply_token));
        }

        join_reports(tasks, pending, &mut slots).await;

        BatchReport {
            events: slots.into_iter().flatten().collect(),
        }
    }

    fn name(&self) -> &str {
        "default"
    }
}

/// Wait for every event task and store its report at the event's index.
///
/// A task that fails to join still gets a report, so the batch report keeps
/// one entry per event.
async fn join_reports(
    mut tasks: JoinSet<EventReport>,
    mut pending: HashMap<task::Id, (usize, String)>,
    slots: &mut [Option<EventReport>],
) {
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, result) = match joined {
            Ok((id, report)) => (id, Ok(report)),
            Err(e) => (e.id(), Err(e)),
        };
        let Some((index, reply_token)) = pending.remove(&id) else {
            continue;
        };
        let report = result.unwrap_or_else(|e| {
            tracing::error!(error = %e, index, "event task did not complete");
            EventReport {
                reply_token,
                outcome: Outcome::Failed(DispatchError::Panicked(e.to_string())),
            }
        });
        log_report(&report);
        slots[index] = Some(report);
    }
}

/// Route, invoke and reply for one event. Steps run strictly in sequence.
async fn process_event(
    registry: &HandlerRegistry,
    sink: &dyn ReplySink,
    policy: MissingHandlerPolicy,
    event: &Event,
) -> Outcome {
    let Some(route) = route(event) else {
        return Outcome::Unrouted;
    };
    let slot = route.slot;

    let Some(handler) = registry.lookup(slot) else {
        return match policy {
            MissingHandlerPolicy::Ignore => Outcome::Skipped(slot),
            MissingHandlerPolicy::Report => Outcome::Failed(DispatchError::NoHandler { slot }),
        };
    };

    let reply = handler.handle(event, route.arg).await;
    if reply.is_empty() {
        return Outcome::NoReply(slot);
    }

    match sink.send(&event.reply_token, &reply).await {
        Ok(()) => Outcome::Replied {
            slot,
            messages: reply.len(),
        },
        Err(e) => Outcome::Failed(DispatchError::Reply {
            slot,
            source: e.into(),
        }),
    }
}

fn log_report(report: &EventReport) {
    let token = report.reply_token.as_str();
    match &report.outcome {
        Outcome::Failed(error) => tracing::warn!(
            reply_token = %token,
            kind = error.as_label(),
            error = %error,
            "event dispatch failed"
        ),
        Outcome::Replied { slot, messages } => {
            tracing::debug!(reply_token = %token, slot = %slot, messages, "reply sent");
        }
        Outcome::Skipped(slot) => {
            tracing::debug!(reply_token = %token, slot = %slot, "no handler registered, skipping");
        }
        Outcome::NoReply(slot) => {
            tracing::debug!(reply_token = %token, slot = %slot, "handler returned no reply");
        }
        Outcome::Unrouted => {
            tracing::debug!(reply_token = %token, "unrecognized event variant, dropping");
        }
        Outcome::Verification => {}
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
