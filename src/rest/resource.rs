//! Resource declarations: one name plus CRUD handlers expanded into routes.

use std::fmt;
use std::future::Future;

use crate::parser::{HttpRequest, Method};
use crate::rest::error::RestError;
use crate::server::{Error, HandlerFn, Reply, handler_fn};

/// The CRUD actions a resource can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Get,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Get, Action::Create, Action::Update, Action::Delete];

    pub fn name(&self) -> &'static str {
        match self {
            Action::Get => "get",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Action::Get => Method::GET,
            Action::Create => Method::POST,
            Action::Update => Method::PUT,
            Action::Delete => Method::DELETE,
        }
    }

    /// Route pattern for this action on `resource`.
    ///
    /// Creation targets the collection; the others address one member by `:id`.
    pub fn pattern(&self, resource: &str) -> String {
        match self {
            Action::Create => format!("/{resource}[.:format]"),
            Action::Get | Action::Update | Action::Delete => format!("/{resource}/:id[.:format]"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handlers for the actions a resource supports. Unset actions get no route.
#[derive(Clone, Default)]
pub struct Actions {
    get: Option<HandlerFn>,
    create: Option<HandlerFn>,
    update: Option<HandlerFn>,
    delete: Option<HandlerFn>,
}

impl Actions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle `GET /<resource>/:id`.
    pub fn get<F, Fut, R>(self, handler: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: Into<Reply> + Send + 'static,
    {
        self.with(Action::Get, handler_fn(handler))
    }

    /// Handle `POST /<resource>`.
    pub fn create<F, Fut, R>(self, handler: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: Into<Reply> + Send + 'static,
    {
        self.with(Action::Create, handler_fn(handler))
    }

    /// Handle `PUT /<resource>/:id`.
    pub fn update<F, Fut, R>(self, handler: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: Into<Reply> + Send + 'static,
    {
        self.with(Action::Update, handler_fn(handler))
    }

    /// Handle `DELETE /<resource>/:id`.
    pub fn delete<F, Fut, R>(self, handler: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: Into<Reply> + Send + 'static,
    {
        self.with(Action::Delete, handler_fn(handler))
    }

    /// Set the handler for `action`, replacing any previous one.
    pub fn with(mut self, action: Action, handler: HandlerFn) -> Self {
        *self.slot(action) = Some(handler);
        self
    }

    pub fn is_empty(&self) -> bool {
        Action::ALL.iter().all(|action| self.handler(*action).is_none())
    }

    pub fn handler(&self, action: Action) -> Option<&HandlerFn> {
        match action {
            Action::Get => self.get.as_ref(),
            Action::Create => self.create.as_ref(),
            Action::Update => self.update.as_ref(),
            Action::Delete => self.delete.as_ref(),
        }
    }

    fn slot(&mut self, action: Action) -> &mut Option<HandlerFn> {
        match action {
            Action::Get => &mut self.get,
            Action::Create => &mut self.create,
            Action::Update => &mut self.update,
            Action::Delete => &mut self.delete,
        }
    }
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<&str> = Action::ALL
            .iter()
            .filter(|action| self.handler(**action).is_some())
            .map(Action::name)
            .collect();
        f.debug_tuple("Actions").field(&set).finish()
    }
}

/// One route produced by expanding a resource.
#[derive(Clone)]
pub struct RouteDescriptor {
    pub action: Action,
    pub method: Method,
    pub pattern: String,
    pub handler: HandlerFn,
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("action", &self.action)
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Expand a resource declaration into its routes, in get, create, update,
/// delete order.
///
/// Leading and trailing slashes on `name` are ignored; inner ones are kept,
/// so `api/user` yields `/api/user/:id[.:format]`.
pub fn expand_resource(name: &str, actions: Actions) -> Result<Vec<RouteDescriptor>, RestError> {
    let resource = name.trim_matches('/');
    if resource.is_empty() {
        return Err(RestError::InvalidResourceName(name.to_string()));
    }
    if actions.is_empty() {
        return Err(RestError::NoActions(resource.to_string()));
    }

    let routes = Action::ALL
        .iter()
        .filter_map(|action| {
            actions.handler(*action).map(|handler| RouteDescriptor {
                action: *action,
                method: action.method(),
                pattern: action.pattern(resource),
                handler: handler.clone(),
            })
        })
        .collect();

    Ok(routes)
}
