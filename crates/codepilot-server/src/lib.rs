// Codepilot - HTTP API
//
// axum router exposing the AI actions of codepilot-lib as JSON endpoints.

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorBody};
pub use rate_limit::RateLimiter;
pub use routes::build_router;
