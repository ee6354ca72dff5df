//! HTTP server implementation for microhttp-rest.
//!
//! A small async server: pattern routes with captures, an ordered chain of
//! before hooks, and handlers that return either a finished response or an
//! [`Entity`] for the server to serialize.

mod response;
mod config;
mod error;
mod handler;
mod http_server;
mod pattern;
mod router;
mod serializer;
mod tests;

// Re-export public items
pub use response::{Entity, HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use error::Error;
pub use handler::{HandlerFn, HandlerFuture, HookFn, Reply, ResponseParts, Route, handler_fn};
pub use http_server::{HttpServer, MAX_REQUEST_SIZE};
pub use pattern::PathPattern;
pub use router::{Lookup, Router};
pub use serializer::SerializerKind;
