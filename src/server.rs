//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C (or when the future given to
//! [`Server::serve_with_shutdown`] resolves) the server:
//! 1. stops accepting new connections,
//! 2. lets every in-flight connection task run to completion,
//! 3. returns from `serve`, so `main` can exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use http::header::CONTENT_LENGTH;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Error;
use crate::method::Method;
use crate::middleware::trace::trace;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// Largest request body accepted, in bytes (100 kB).
pub const BODY_LIMIT: usize = 100 * 1024;

/// The HTTP server, bound to a listening socket.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Binds to `addr`. Port `0` picks a free port; see [`Server::local_addr`].
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains in-flight
    /// connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then drains in-flight
    /// connections.
    pub async fn serve_with_shutdown<S>(self, router: Router, signal: S) -> Result<(), Error>
    where
        S: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        let router = Arc::new(router);

        info!(%addr, "usuarios listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting at once,
                // even with connections queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = self.listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(&router, req).await }
                        });

                        // HTTP/1.1 or HTTP/2, whichever the client speaks.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connections so the set stays small.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("usuarios stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Converts one hyper request, routes it, and converts the response back.
///
/// Infallible: every failure becomes a status code here, so hyper never sees
/// an error.
async fn dispatch(
    router: &Router,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let Ok(method) = req.method().as_str().parse::<Method>() else {
        return Ok(Response::status(Status::MethodNotAllowed).into_inner());
    };
    let path = req.uri().path().to_owned();

    let response = trace(method, &path, async {
        let (parts, body) = req.into_parts();
        let body = match read_body(&parts.headers, body).await {
            Ok(body) => body,
            Err(res) => return res,
        };
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();
        router.route(Request::new(method, path.as_str(), headers, body)).await
    })
    .await;

    Ok(response.into_inner())
}

/// Buffers a request body of at most [`BODY_LIMIT`] bytes.
///
/// A declared `content-length` over the limit is refused before any of the
/// body is read; bodies without one are cut off once they cross it.
async fn read_body<B>(headers: &HeaderMap, body: B) -> Result<Vec<u8>, Response>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let declared = headers.get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > BODY_LIMIT as u64) {
        return Err(too_large());
    }

    match Limited::new(body, BODY_LIMIT).collect().await {
        Ok(collected) => Ok(collected.to_bytes().to_vec()),
        Err(e) if e.is::<LengthLimitError>() => Err(too_large()),
        Err(e) => {
            error!("failed to read request body: {e}");
            Err(Response::status(Status::BadRequest))
        }
    }
}

fn too_large() -> Response {
    Response::builder()
        .status(Status::PayloadTooLarge)
        .text(format!("request body exceeds {BODY_LIMIT} bytes"))
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM (Unix) or Ctrl-C the process receives.
///
/// If a handler cannot be installed that arm never resolves; the other one
/// still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn declared(len: usize) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        headers
    }

    #[tokio::test]
    async fn body_within_limit_is_buffered() {
        let body = Full::new(Bytes::from_static(br#"{"name":"Alice"}"#));
        let bytes = read_body(&HeaderMap::new(), body).await.unwrap();
        assert_eq!(bytes, br#"{"name":"Alice"}"#);
    }

    #[tokio::test]
    async fn undeclared_oversized_body_is_cut_off() {
        let body = Full::new(Bytes::from(vec![b'a'; BODY_LIMIT + 1]));
        let res = read_body(&HeaderMap::new(), body).await.unwrap_err();
        assert_eq!(res.status_code(), 413);
    }

    #[tokio::test]
    async fn declared_oversized_body_is_refused_up_front() {
        let res = read_body(&declared(BODY_LIMIT + 1), Full::new(Bytes::new())).await.unwrap_err();
        assert_eq!(res.status_code(), 413);

        let ok = read_body(&declared(BODY_LIMIT), Full::new(Bytes::from(vec![b' '; BODY_LIMIT]))).await;
        assert_eq!(ok.unwrap().len(), BODY_LIMIT);
    }
}
