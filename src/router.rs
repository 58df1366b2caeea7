//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. A single trailing slash
//! is ignored. Requests that match no route go to the fallback handler when
//! one is set, otherwise `404`.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;

use crate::handler::{Handler, SharedHandler, share};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and hand it to [`Server::serve`](crate::Server::serve).
/// Registration methods return `self` so they chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<SharedHandler>>,
    fallback: Option<SharedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), fallback: None }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax and are read back with
    /// [`Request::param`]:
    ///
    /// ```rust,no_run
    /// # use usuarios::{Method, Request, Response, Router};
    /// # async fn show(_: Request) -> Response { Response::text("") }
    /// # async fn remove(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,    "/api/usuarios/{id}", show)
    ///     .on(Method::Delete, "/api/usuarios/{id}", remove);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` conflicts with a route already registered for
    /// `method`. Routes are fixed at startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, share(handler))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Handler for requests no route matches, e.g. static assets.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(share(handler));
        self
    }

    /// Finds the handler for `path`, retrying without a trailing slash.
    /// Parameter values are percent-decoded.
    fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(SharedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok().or_else(|| {
            let trimmed = path.strip_suffix('/').filter(|p| !p.is_empty())?;
            tree.at(trimmed).ok()
        })?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), percent_decode_str(v).decode_utf8_lossy().into_owned()))
            .collect();
        Some((handler, params))
    }

    /// Routes one request to its handler and awaits the response.
    ///
    /// `HEAD` falls back to the `GET` route with the body stripped.
    pub(crate) async fn route(&self, mut req: Request) -> Response {
        if let Some((handler, params)) = self.lookup(req.method, &req.path) {
            req.params = params;
            return handler.call(req).await;
        }

        if req.method == Method::Head {
            if let Some((handler, params)) = self.lookup(Method::Get, &req.path) {
                req.params = params;
                return handler.call(req).await.without_body();
            }
        }

        match &self.fallback {
            Some(handler) => handler.call(req).await,
            None => Response::status(Status::NotFound),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, path: &str) -> Request {
        Request::new(method, path, Vec::new(), Vec::new())
    }

    async fn echo_id(req: Request) -> String {
        req.param("id").unwrap_or("none").to_owned()
    }

    #[tokio::test]
    async fn binds_path_params() {
        let router = Router::new().get("/items/{id}", echo_id);
        let res = router.route(request(Method::Get, "/items/17")).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"17");
    }

    #[tokio::test]
    async fn unmatched_without_fallback_is_404() {
        let router = Router::new().get("/items/{id}", echo_id);
        let res = router.route(request(Method::Delete, "/items/17")).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn unmatched_goes_to_fallback() {
        let router = Router::new()
            .get("/items/{id}", echo_id)
            .fallback(|req: Request| async move { format!("fallback {}", req.path()) });
        let res = router.route(request(Method::Get, "/elsewhere")).await;
        assert_eq!(res.body(), b"fallback /elsewhere");
    }

    #[tokio::test]
    async fn head_uses_get_route_without_body() {
        let router = Router::new().get("/items/{id}", echo_id);
        let res = router.route(request(Method::Head, "/items/3")).await;
        assert_eq!(res.status_code(), 200);
        assert!(res.body().is_empty());
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    }

    #[tokio::test]
    async fn trailing_slash_and_encoded_params() {
        let router = Router::new()
            .get("/items", |_req: Request| async { "all" })
            .get("/items/{id}", echo_id);

        let res = router.route(request(Method::Get, "/items/")).await;
        assert_eq!(res.body(), b"all");

        let res = router.route(request(Method::Get, "/items/%31%32/")).await;
        assert_eq!(res.body(), b"12");

        let res = router.route(request(Method::Get, "/")).await;
        assert_eq!(res.status_code(), 404);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new()
            .get("/items/{id}", echo_id)
            .get("/items/{key}", echo_id);
    }
}
