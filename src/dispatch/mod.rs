//! Batch dispatch: routes every event of a webhook batch to its handler.

pub mod dispatcher;
pub mod route;
pub mod traits;

pub use dispatcher::DefaultDispatcher;
pub use route::{route, Route};
pub use traits::{
    BatchReport, DispatchError, Dispatcher, EventReport, MissingHandlerPolicy, Outcome,
};

use std::sync::Arc;

use crate::handlers::HandlerRegistry;
use crate::reply::ReplySink;

pub fn create_dispatcher(
    registry: Arc<HandlerRegistry>,
    sink: Arc<dyn ReplySink>,
    missing_handler: MissingHandlerPolicy,
) -> Arc<dyn Dispatcher> {
    Arc::new(DefaultDispatcher::new(registry, sink).with_missing_handler(missing_handler))
}
