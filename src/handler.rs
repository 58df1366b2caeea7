//! Route handlers.
//!
//! A handler is anything callable as `Fn(Request) -> impl Future` whose
//! output converts into a [`Response`]. [`Handler`] is object safe, so the
//! router keeps every route as an `Arc<dyn Handler>` regardless of the
//! concrete closure type behind it:
//!
//! ```text
//! move |req| { let dir = dir.clone(); async move { … } }   ← route closure
//!        ↓ Router::get(path, closure)
//! Arc<dyn Handler>                                         ← stored per route
//!        ↓ at request time
//! handler.call(req) → BoxFuture resolving to Response
//! ```
//!
//! Closures are how state reaches a handler: the user directory is captured
//! by the closure and cloned (one `Arc` increment) into each request future.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A boxed future resolving to a [`Response`], as returned by [`Handler::call`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A handler shared by every request routed to it.
pub(crate) type SharedHandler = Arc<dyn Handler>;

/// Implemented for every valid route handler.
///
/// Never implemented by hand: the blanket impl covers any `async fn` or
/// closure shaped like
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoResponse>
/// ```
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = self(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Moves a handler behind the shared pointer the router stores.
pub(crate) fn share(handler: impl Handler) -> SharedHandler {
    Arc::new(handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::status::Status;

    fn request() -> Request {
        Request::new(Method::Get, "/", Vec::new(), Vec::new())
    }

    #[tokio::test]
    async fn async_fn_output_is_converted() {
        async fn missing(_req: Request) -> Status {
            Status::NotFound
        }
        let handler = share(missing);
        assert_eq!(handler.call(request()).await.status_code(), 404);
    }

    #[tokio::test]
    async fn closure_state_is_reused_across_calls() {
        let greeting = Arc::new(String::from("hola"));
        let handler = share(move |_req: Request| {
            let greeting = Arc::clone(&greeting);
            async move { format!("{greeting}!") }
        });
        for _ in 0..2 {
            assert_eq!(handler.call(request()).await.body(), b"hola!");
        }
    }
}
