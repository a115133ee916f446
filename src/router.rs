//! Radix-tree request router.
//!
//! One `matchit` tree per method. A path that exists under some other method
//! is reported separately so the server can answer 405 instead of 404.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// The application router. Build it once at startup and pass it to
/// [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

/// Outcome of a route lookup.
pub(crate) enum Route {
    Matched(BoxedHandler, HashMap<String, String>),
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Path parameters use
    /// `{name}` syntax and are read back with `req.param("name")`.
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting route. Routes are fixed at
    /// startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Route {
        if let Some(matched) = self.routes.get(&method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Route::Matched(Arc::clone(matched.value), params);
        }
        if self.allows_path(path) {
            Route::MethodNotAllowed
        } else {
            Route::NotFound
        }
    }

    /// True when `path` is routed under any method.
    pub(crate) fn allows_path(&self, path: &str) -> bool {
        self.routes.values().any(|tree| tree.at(path).is_ok())
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
