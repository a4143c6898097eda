//! Reply delivery: the outbound message model and the sinks that send it.

pub mod logging;
pub mod memory;
pub mod traits;

pub use logging::LoggingReplySink;
pub use memory::{MemoryReplySink, SentReply};
pub use traits::{OutboundMessage, Reply, ReplySink};

use std::sync::Arc;

/// Sink used by `serve --dry-run`.
pub fn create_logging_sink() -> Arc<dyn ReplySink> {
    Arc::new(LoggingReplySink)
}
