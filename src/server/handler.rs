//! Route handlers, before hooks and reply rendering.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use serde_json::Value;

use crate::parser::{HttpRequest, Method};
use crate::server::{Entity, Error, HttpResponse, PathPattern, SerializerKind, StatusCode};

/// What a handler produces: a finished response, or an entity for the
/// server to serialize.
#[derive(Debug, Clone)]
pub enum Reply {
    Response(HttpResponse),
    Entity(Entity),
}

impl From<HttpResponse> for Reply {
    fn from(response: HttpResponse) -> Self {
        Reply::Response(response)
    }
}

impl From<Entity> for Reply {
    fn from(entity: Entity) -> Self {
        Reply::Entity(entity)
    }
}

impl From<Value> for Reply {
    fn from(data: Value) -> Self {
        Reply::Entity(Entity::new(StatusCode::Ok, data))
    }
}

/// Type alias for a boxed future that returns a Result<Reply, Error>.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Reply, Error>> + Send>>;

/// Type alias for a handler function that takes an HttpRequest and returns a HandlerFuture.
pub type HandlerFn = Arc<dyn Fn(HttpRequest) -> HandlerFuture + Send + Sync>;

/// A callback run after route matching and before the handler.
///
/// Returning `Err` halts the request; the returned response is sent as-is
/// and the handler never runs.
pub type HookFn = Arc<dyn Fn(&HttpRequest, &mut ResponseParts) -> Result<(), HttpResponse> + Send + Sync>;

/// Box an async closure into a [`HandlerFn`].
pub fn handler_fn<F, Fut, R>(handler: F) -> HandlerFn
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: Into<Reply> + Send + 'static,
{
    Arc::new(move |req: HttpRequest| -> HandlerFuture {
        let fut = handler(req);
        Box::pin(async move { fut.await.map(Into::into) })
    })
}

/// Represents a route in the HTTP server.
pub struct Route {
    /// The pattern as registered.
    pub path: String,
    /// The parsed pattern used for matching.
    pub pattern: PathPattern,
    /// The HTTP methods to match.
    pub methods: Vec<Method>,
    /// The handler function.
    pub handler: HandlerFn,
}

impl Route {
    pub fn new(path: impl Into<String>, methods: Vec<Method>, handler: HandlerFn) -> Result<Self, Error> {
        let path = path.into();
        let pattern = PathPattern::parse(&path)?;
        Ok(Self {
            path,
            pattern,
            methods,
            handler,
        })
    }
}

/// Response state that before hooks may adjust for the current request.
#[derive(Debug, Clone, Default)]
pub struct ResponseParts {
    /// Headers added to the final response.
    pub headers: HashMap<String, String>,
    /// Serializer for entity replies; the server default applies when unset.
    pub serializer: Option<SerializerKind>,
}

impl ResponseParts {
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.set_header("Content-Type", content_type);
    }

    pub fn set_serializer(&mut self, serializer: SerializerKind) {
        self.serializer = Some(serializer);
    }

    /// Turn a handler reply into the response to send.
    ///
    /// Entities are encoded with the selected serializer and hook headers
    /// override the serializer's own content type. Statuses that forbid a
    /// body are sent without one. A prebuilt response keeps
    /// any header the handler set itself.
    pub fn render(self, reply: Reply, default_serializer: SerializerKind) -> Result<HttpResponse, Error> {
        match reply {
            Reply::Response(mut response) => {
                for (name, value) in self.headers {
                    if !response.has_header(&name) {
                        response.headers.insert(name, value);
                    }
                }
                Ok(response)
            }
            Reply::Entity(entity) if !entity.status.allows_body() => {
                let mut response = HttpResponse::new(entity.status);
                for (name, value) in self.headers {
                    if !name.eq_ignore_ascii_case("Content-Type") {
                        response = response.with_header(name, value);
                    }
                }
                Ok(response)
            }
            Reply::Entity(entity) => {
                let serializer = self.serializer.unwrap_or(default_serializer);
                let body = serializer.serialize(&entity.data)?;

                let mut response = HttpResponse::new(entity.status)
                    .with_content_type(serializer.content_type());
                for (name, value) in self.headers {
                    response = response.with_header(name, value);
                }
                Ok(response.with_body_bytes(body))
            }
        }
    }
}
