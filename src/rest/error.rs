//! Error types for the REST plugin.

use thiserror::Error;

/// Errors raised while configuring the plugin or registering its routes.
///
/// All of these surface at startup; nothing here is produced per request.
#[derive(Debug, Error)]
pub enum RestError {
    /// A resource was declared without any action.
    #[error("resource {0:?} should be given with at least one action")]
    NoActions(String),

    /// The resource name is empty once slashes are trimmed.
    #[error("invalid resource name: {0:?}")]
    InvalidResourceName(String),

    /// A format maps to a serializer the server does not know.
    #[error("unknown serializer {serializer:?} for format {format:?}")]
    UnknownSerializer { format: String, serializer: String },

    /// A content type was configured for a format that has no serializer.
    #[error("format {0:?} has a content type but no serializer")]
    MissingSerializer(String),

    /// The status for unsupported formats is not a known error status.
    #[error("status {0} cannot answer unsupported formats")]
    InvalidStatus(u16),

    /// Reading the configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`RestConfig`](crate::rest::RestConfig).
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The server refused a generated route.
    #[error("Route registration failed: {0}")]
    Server(#[from] crate::server::Error),
}
