//! REST conventions for a minimal async HTTP server.
//!
//! The crate has two layers:
//!
//! - [`parser`] and [`server`]: a small tokio HTTP server with pattern
//!   routes, before hooks and serializer engines (JSON, YAML, `Data::Dumper`).
//! - [`rest`]: the REST plugin. It selects the serializer from a URL format
//!   suffix, expands resource declarations into CRUD routes, and provides
//!   one response helper per HTTP status code.
//!
//! # Examples
//!
//! ## Format suffixes
//!
//! ```no_run
//! use microhttp_rest::{HttpServer, Method, ServerConfig};
//! use microhttp_rest::rest::Rest;
//! use microhttp_rest::rest::status::status_ok;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = HttpServer::new(ServerConfig::default());
//! Rest::default().prepare_serializer_for_format(&server).await;
//!
//! // GET /hello.json, /hello.yml and /hello.dump each get their own encoding
//! server.add_route("/hello[.:format]", vec![Method::GET], |_req| async {
//!     Ok(status_ok(json!({"greeting": "hello"})))
//! }).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Status helpers
//!
//! ```
//! use microhttp_rest::StatusCode;
//! use microhttp_rest::rest::status::{status_bad_request, status_helper_for};
//! use serde_json::json;
//!
//! let entity = status_bad_request("name is required");
//! assert_eq!(entity.status, StatusCode::BadRequest);
//! assert_eq!(entity.data, json!({"error": "name is required"}));
//!
//! let teapot = status_helper_for(418).unwrap();
//! assert_eq!(teapot.name, "status_i_m_a_teapot");
//! ```

pub mod parser;
pub mod server;
pub mod rest;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{Entity, Error as ServerError, HttpResponse, HttpServer, SerializerKind, ServerConfig, StatusCode};
pub use rest::{Actions, Rest, RestConfig, RestError};
