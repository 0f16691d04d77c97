//! Utility modules for the latency router
//!
//! - **error**: Error type and `Result` alias
//! - **logging**: Tracing subscriber setup
//! - **time**: Clock abstraction and minute buckets

pub mod error;
pub mod logging;
pub mod time;

pub use error::{Result, RouterError};
pub use time::{Clock, ManualClock, SystemClock, minute_bucket};

/// Sanitize a backend URL for logging (hide password)
pub fn sanitize_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut sanitized = parsed.clone();
        if sanitized.password().is_some() {
            let _ = sanitized.set_password(Some("***"));
        }
        sanitized.to_string()
    } else {
        "invalid_url".to_string()
    }
}
