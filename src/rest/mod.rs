//! REST conventions on top of [`HttpServer`].
//!
//! - [`Rest::prepare_serializer_for_format`] installs a before hook that picks
//!   the response serializer from a `.json` / `.yml` / `.dump` path suffix.
//! - [`Rest::resource`] expands one resource declaration into CRUD routes.
//! - [`status`] holds one helper per HTTP status code.
//!
//! ```no_run
//! use microhttp_rest::rest::{Actions, Rest};
//! use microhttp_rest::rest::status::{status_created, status_ok};
//! use microhttp_rest::{HttpServer, ServerConfig};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = HttpServer::new(ServerConfig::default());
//! let rest = Rest::default();
//!
//! rest.prepare_serializer_for_format(&server).await;
//! rest.resource(&server, "user", Actions::new()
//!     .get(|req| async move { Ok(status_ok(json!({"id": req.param("id")}))) })
//!     .create(|_req| async move { Ok(status_created(json!({"id": 1}))) }),
//! ).await?;
//!
//! server.start().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod format;
pub mod resource;
pub mod status;

use std::sync::Arc;
use log::{debug, info};

use crate::server::{HttpServer, Route, StatusCode};

pub use config::RestConfig;
pub use error::RestError;
pub use format::{FormatEntry, FormatTable, format_hook};
pub use resource::{Action, Actions, RouteDescriptor, expand_resource};
pub use status::{send_entity, send_status};

/// The plugin: a resolved format table plus the directives that register
/// hooks and routes on a server.
#[derive(Debug, Clone)]
pub struct Rest {
    formats: Arc<FormatTable>,
    unsupported_status: StatusCode,
}

impl Default for Rest {
    fn default() -> Self {
        Self {
            formats: Arc::new(FormatTable::default()),
            unsupported_status: StatusCode::NotFound,
        }
    }
}

impl Rest {
    /// Resolve `config` into a ready plugin, validating every override.
    pub fn new(config: RestConfig) -> Result<Self, RestError> {
        let unsupported_status = config.unsupported_status()?;
        let formats = FormatTable::from_config(&config)?;
        debug!("Formats available: {}", formats.tokens().join(", "));

        Ok(Self {
            formats: Arc::new(formats),
            unsupported_status,
        })
    }

    pub fn formats(&self) -> &FormatTable {
        &self.formats
    }

    pub fn unsupported_status(&self) -> StatusCode {
        self.unsupported_status
    }

    /// Serialize responses according to the request's `format` parameter.
    pub async fn prepare_serializer_for_format(&self, server: &HttpServer) {
        let hook = format_hook(self.formats.clone(), self.unsupported_status);
        server.router.write().await.add_hook(hook);
    }

    /// Register the routes for `name` and the supplied actions.
    ///
    /// Every route is validated before any is added, so an error leaves the
    /// server untouched.
    pub async fn resource(&self, server: &HttpServer, name: &str, actions: Actions) -> Result<(), RestError> {
        let routes = expand_resource(name, actions)?
            .into_iter()
            .map(|route| {
                debug!("  {method} {pattern} -> {action}", method = route.method, pattern = route.pattern, action = route.action);
                Route::new(route.pattern, vec![route.method], route.handler)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Registering resource {name} with {count} routes", count = routes.len());
        server.add_routes(routes).await;

        Ok(())
    }
}
