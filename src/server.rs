//! HTTP server and graceful shutdown.
//!
//! The server is the non-blocking half of the bridge: hyper accepts and parses
//! requests, the body is buffered, and only then is an [`Adapter`] built and
//! the legacy handler run. Handlers never touch I/O.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`; no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`].

use std::convert::Infallible;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::adapter::Adapter;
use crate::error::Error;
use crate::exchange::HttpExchange;
use crate::form;
use crate::response::Response;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    default_scheme: Arc<str>,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    ///
    /// ```rust,no_run
    /// use reqbridge::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr, default_scheme: Arc::from("http") }
    }

    /// Scheme reported for origin-form requests. Set to `"https"` behind a
    /// TLS-terminating proxy.
    pub fn default_scheme(mut self, scheme: &str) -> Self {
        self.default_scheme = Arc::from(scheme);
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let router = Arc::new(router);

        info!(addr = %self.addr, "reqbridge listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let scheme = Arc::clone(&self.default_scheme);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                            let router = Arc::clone(&router);
                            let scheme = Arc::clone(&scheme);
                            async move {
                                Ok::<_, Infallible>(dispatch(&router, req, Some(remote_addr), &scheme).await)
                            }
                        });

                        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("reqbridge stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request, runs its legacy handler and produces one response.
///
/// Failures become responses here: unmatched path → 404, unreadable body or
/// unresolvable URI → 400.
pub(crate) async fn dispatch<B>(
    router: &Router,
    req: http::Request<B>,
    remote_addr: Option<SocketAddr>,
    default_scheme: &str,
) -> http::Response<Full<Bytes>>
where
    B: Body,
    B::Error: Display,
{
    let (parts, body) = req.into_parts();

    let Some(handler) = router.lookup(parts.uri.path()) else {
        debug!(path = parts.uri.path(), "no route");
        return Response::status(StatusCode::NOT_FOUND).into_http();
    };

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            let e = Error::Body(e.to_string());
            warn!(error = %e, "failed to read request body");
            return Response::status(StatusCode::BAD_REQUEST).into_http();
        }
    };

    let form = form::decode(&parts.headers, &body);
    let exchange = HttpExchange::with_default_scheme(parts, remote_addr, default_scheme);

    let mut builder = Adapter::builder(&exchange);
    if let Some(form) = &form {
        builder = builder.form(form);
    }

    match builder.build() {
        Ok(adapter) => handler.call(&adapter).into_http(),
        Err(e) => {
            warn!(error = %e, "rejecting request");
            Response::status(StatusCode::BAD_REQUEST).into_http()
        }
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C on Windows).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use crate::LegacyRequest;

    use super::*;

    fn echo(req: &dyn LegacyRequest) -> Response {
        let values = req.parameter_values("a").join(",");
        Response::text(format!(
            "{} {} {} a={values} from={}",
            req.method(),
            req.scheme(),
            req.request_url(),
            req.remote_addr().unwrap_or_default(),
        ))
    }

    fn router() -> Router {
        Router::new().route("/echo", echo)
    }

    async fn body_text(res: http::Response<Full<Bytes>>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn query_and_form_reach_the_handler() {
        let req = http::Request::post("/echo?a=1")
            .header("host", "test.org")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from_static(b"a=2&a=3")))
            .unwrap();
        let remote = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 4000));

        let res = dispatch(&router(), req, Some(remote), "http").await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            body_text(res).await,
            "POST http http://test.org/echo a=1,2,3 from=127.0.0.1:4000"
        );
    }

    #[tokio::test]
    async fn default_scheme_is_applied() {
        let req = http::Request::get("/echo")
            .header("host", "test.org")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let res = dispatch(&router(), req, None, "https").await;

        assert_eq!(body_text(res).await, "GET https https://test.org/echo a= from=");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let req = http::Request::get("/nope").body(Full::new(Bytes::new())).unwrap();
        let res = dispatch(&router(), req, None, "http").await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unresolvable_uri_is_bad_request() {
        // A host with a space cannot form a URI authority.
        let req = http::Request::get("/echo")
            .header("host", "bad host")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let res = dispatch(&router(), req, None, "http").await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn http10_without_host_is_served() {
        let req = http::Request::get("/echo?a=1")
            .version(http::Version::HTTP_10)
            .body(Full::new(Bytes::new()))
            .unwrap();
        let res = dispatch(&router(), req, None, "http").await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "GET http http:///echo a=1 from=");
    }

    #[tokio::test]
    async fn query_too_long_once_re_encoded_is_served() {
        let target = format!("/echo?a=1&q={}", "%20".repeat(15_000));
        let req = http::Request::get(target.as_str())
            .header("host", "test.org")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let res = dispatch(&router(), req, None, "http").await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "GET http http://test.org/echo a=1 from=");
    }
}
