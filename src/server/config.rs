//! Server configuration.

use std::net::SocketAddr;

use crate::server::serializer::SerializerKind;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size.
    pub read_buffer_size: usize,
    /// Serializer for entity replies when no before hook selected one.
    pub default_serializer: SerializerKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_connections: 1024,
            read_buffer_size: 8192,
            default_serializer: SerializerKind::Json,
        }
    }
}
