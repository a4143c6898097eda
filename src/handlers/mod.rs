//! Handler registration: which callback answers which kind of event.

pub mod func;
pub mod registry;
pub mod traits;

pub use func::{handler_fn, FnHandler};
pub use registry::{HandlerRegistry, RegistryBuilder};
pub use traits::{EventHandler, HandlerArg, HandlerSlot};
