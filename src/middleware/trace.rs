//! Per-request tracing span with method, path, status and latency.

use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};

use crate::method::Method;
use crate::response::Response;

/// Runs `handle` inside an `http.request` span and logs the outcome.
///
/// The span carries `method` and `path`; the completion event adds `status`
/// and `latency_ms`. Server errors are logged at `warn`.
pub async fn trace<F>(method: Method, path: &str, handle: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("http.request", %method, path);
    let started = Instant::now();

    async move {
        let response = handle.await;
        let status = response.status_code();
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        if status >= 500 {
            warn!(status, latency_ms, "request failed");
        } else {
            info!(status, latency_ms, "request completed");
        }
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;

    #[tokio::test]
    async fn passes_the_response_through() {
        let res = trace(Method::Get, "/x", async { Response::status(Status::NotFound) }).await;
        assert_eq!(res.status_code(), 404);
    }
}
