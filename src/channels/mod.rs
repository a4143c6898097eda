//! Messaging-platform clients: request verification, parsing and replies.

pub mod line;
pub mod traits;

pub use line::{LineClient, SIGNATURE_HEADER};
pub use traits::{ParseError, WebhookParser};
