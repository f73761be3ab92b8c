//! Path-to-handler mapping.
//!
//! Legacy handlers see every method on their path and branch on
//! [`LegacyRequest::method`](crate::LegacyRequest::method) themselves, so there
//! is one radix tree for all methods. O(path-length) lookup.

use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: MatchitRouter<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: MatchitRouter::new() }
    }

    /// Mount a handler on a path pattern. Returns `self` for chaining.
    ///
    /// Patterns use `matchit` syntax; `{*rest}` mounts a whole subtree:
    ///
    /// ```rust
    /// # use reqbridge::{LegacyRequest, Response, Router};
    /// # fn users(_: &dyn LegacyRequest) -> Response { Response::text("") }
    /// # fn files(_: &dyn LegacyRequest) -> Response { Response::text("") }
    /// Router::new()
    ///     .route("/users", users)
    ///     .route("/files/{*rest}", files);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the pattern is malformed or conflicts with one already mounted.
    pub fn route(mut self, path: &str, handler: impl Handler) -> Self {
        self.routes
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<BoxedHandler> {
        let matched = self.routes.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
