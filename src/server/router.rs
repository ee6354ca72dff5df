//! Route table and before-hook chain.

use std::collections::HashMap;

use crate::parser::Method;
use crate::server::handler::{HandlerFn, HookFn, Route};
use crate::server::serializer::SerializerKind;

/// Outcome of looking up a request in the route table.
pub enum Lookup {
    /// A route matched both path and method.
    Found {
        handler: HandlerFn,
        params: HashMap<String, String>,
    },
    /// Some route matched the path, none the method.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Routes in registration order plus the hooks run before every handler.
pub struct Router {
    routes: Vec<Route>,
    hooks: Vec<HookFn>,
    default_serializer: SerializerKind,
}

impl Router {
    pub fn new(default_serializer: SerializerKind) -> Self {
        Self {
            routes: Vec::new(),
            hooks: Vec::new(),
            default_serializer,
        }
    }

    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn add_hook(&mut self, hook: HookFn) {
        self.hooks.push(hook);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn hooks(&self) -> &[HookFn] {
        &self.hooks
    }

    pub fn default_serializer(&self) -> SerializerKind {
        self.default_serializer
    }

    /// Find the first route whose pattern and method both match.
    pub fn lookup(&self, method: Method, path: &str) -> Lookup {
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };

            if route.methods.contains(&method) {
                return Lookup::Found {
                    handler: route.handler.clone(),
                    params,
                };
            }

            for m in &route.methods {
                if !allowed.contains(m) {
                    allowed.push(*m);
                }
            }
        }

        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::MethodNotAllowed(allowed)
        }
    }
}
