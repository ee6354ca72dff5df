//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::{Error as ParserError, Method};
use crate::server::response::StatusCode;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Requested resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Method not allowed for the requested resource.
    #[error("Method {0} not allowed for path: {1}")]
    MethodNotAllowed(Method, String),

    /// The request exceeded the size the server is willing to buffer.
    #[error("Request of {0} bytes exceeds the size limit")]
    PayloadTooLarge(usize),

    /// A before hook answered the request instead of the route handler.
    #[error("Request halted with status {0}")]
    Halted(StatusCode),

    /// A route pattern could not be parsed.
    #[error("Invalid route pattern {0:?}: {1}")]
    InvalidPattern(String, String),

    /// No serializer is registered under this identifier.
    #[error("Unknown serializer: {0}")]
    UnknownSerializer(String),

    /// The serializer can only encode values.
    #[error("The {0} serializer cannot deserialize")]
    DeserializeUnsupported(&'static str),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
