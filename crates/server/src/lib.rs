pub mod http;
pub mod service;

pub use http::router;
pub use service::{ApiError, AppState, SessionRegistry};
