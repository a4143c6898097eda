pub mod schema;
pub mod traits;

pub use schema::{
    Config, DispatchConfig, GatewayConfig, LineConfig, DEFAULT_LINE_API_BASE_URL,
    DEFAULT_REPLY_TIMEOUT_SECS,
};
pub use traits::{ConfigIssue, ConfigIssueSeverity};
