use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::Event;
use crate::handlers::HandlerSlot;

/// What happens to an event whose slot has no registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingHandlerPolicy {
    /// Drop the event quietly.
    Ignore,
    /// Record the event as failed and log a warning.
    #[default]
    Report,
}

impl std::fmt::Display for MissingHandlerPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Ignore => "ignore",
            Self::Report => "report",
        })
    }
}

/// Per-event failures. None of them abort the batch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no handler registered for {slot}")]
    NoHandler { slot: HandlerSlot },

    #[error("failed to send reply for {slot}: {source}")]
    Reply {
        slot: HandlerSlot,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl DispatchError {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::NoHandler { .. } => "no_handler",
            Self::Reply { .. } => "reply_failed",
            Self::Panicked(_) => "handler_panicked",
        }
    }
}

/// How a single event's processing ended.
#[derive(Debug)]
pub enum Outcome {
    /// Platform verification event; not routed.
    Verification,
    /// Payload or source variant not known to this crate; dropped.
    Unrouted,
    /// No handler for the slot and the policy is [`MissingHandlerPolicy::Ignore`].
    Skipped(HandlerSlot),
    /// Handler ran and returned an empty reply.
    NoReply(HandlerSlot),
    /// Handler ran and its reply was delivered.
    Replied { slot: HandlerSlot, messages: usize },
    Failed(DispatchError),
}

#[derive(Debug)]
pub struct EventReport {
    pub reply_token: String,
    pub outcome: Outcome,
}

/// Outcomes of one batch, in arrival order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub events: Vec<EventReport>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events whose outcome matches `predicate`.
    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.events.iter().filter(|r| predicate(&r.outcome)).count()
    }

    pub fn replied(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Replied { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &DispatchError)> {
        self.events.iter().filter_map(|r| match &r.outcome {
            Outcome::Failed(error) => Some((r.reply_token.as_str(), error)),
            _ => None,
        })
    }
}

/// Processes a batch of webhook events.
///
/// Implementations must not fail the batch as a whole: every per-event
/// failure is isolated and reported in the returned [`BatchReport`].
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Returns once every event in the batch has finished processing.
    async fn handle_batch(&self, events: Vec<Event>) -> BatchReport;
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MessageType;

    #[test]
    fn missing_handler_policy_defaults_to_report() {
        assert_eq!(MissingHandlerPolicy::default(), MissingHandlerPolicy::Report);
    }

    #[test]
    fn missing_handler_policy_parses_lowercase() {
        let policy: MissingHandlerPolicy = serde_json::from_str("\"ignore\"").unwrap();
        assert_eq!(policy, MissingHandlerPolicy::Ignore);
    }

    #[test]
    fn report_counts_and_failures() {
        let slot = HandlerSlot::Message(MessageType::Text);
        let report = BatchReport {
            events: vec![
                EventReport {
                    reply_token: "T1".into(),
                    outcome: Outcome::Replied { slot, messages: 1 },
                },
                EventReport {
                    reply_token: "T2".into(),
                    outcome: Outcome::Failed(DispatchError::NoHandler { slot }),
                },
                EventReport {
                    reply_token: "T3".into(),
                    outcome: Outcome::Unrouted,
                },
            ],
        };

        assert_eq!(report.len(), 3);
        assert_eq!(report.replied(), 1);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "T2");
        assert_eq!(failures[0].1.as_label(), "no_handler");
        assert_eq!(
            failures[0].1.to_string(),
            "no handler registered for message.text"
        );
    }
}
