//! HTTP request parsing.
//!
//! Turns raw request bytes into an [`HttpRequest`]: request line, headers,
//! query string and a `Content-Length` delimited body.

mod request;
mod line;
mod error;

// Re-export public items
pub use request::HttpRequest;
pub use line::{HttpVersion, Method};
pub use error::Error;

pub use request::{parse_request, request_len};
