#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_raw_string_hashes,
    clippy::redundant_closure_for_method_calls,
    clippy::return_self_not_must_use,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::too_many_lines,
    clippy::uninlined_format_args,
    clippy::unnecessary_literal_bound,
    clippy::unnecessary_map_or
)]

pub mod channels;
pub mod config;
pub mod dispatch;
pub mod echo;
pub mod events;
pub mod gateway;
pub mod handlers;
pub mod reply;

pub use config::Config;
pub use dispatch::{BatchReport, DefaultDispatcher, Dispatcher, MissingHandlerPolicy};
pub use events::Event;
pub use handlers::{EventHandler, HandlerRegistry, HandlerSlot};
pub use reply::{OutboundMessage, Reply, ReplySink};
