//! HTTP host for a `Router<BoxedHandler>`, with graceful shutdown.
//!
//! The server is the router's caller, nothing more: it turns each hyper
//! request into `(method, path)`, resolves, and either invokes the matched
//! handler with the bound values or answers `404` / `405` itself.
//!
//! On SIGTERM or Ctrl-C the server stops accepting, lets in-flight
//! connections finish, and then returns from [`Server::serve`].

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::ALLOW;
use http::StatusCode;
use http_body_util::BodyExt;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::Response;
use crate::router::{MatchResult, Router};

enum Bind {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// The HTTP server.
pub struct Server {
    bind: Bind,
}

impl Server {
    /// Bind to `addr` when [`serve`](Server::serve) is called.
    ///
    /// ```rust,no_run
    /// use tsuji::Server;
    /// let server = Server::bind(([0, 0, 0, 0], 3000));
    /// ```
    pub fn bind(addr: impl Into<SocketAddr>) -> Self {
        Self { bind: Bind::Addr(addr.into()) }
    }

    /// Serve on an already bound listener.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { bind: Bind::Listener(listener) }
    }

    /// Accept connections until SIGTERM / Ctrl-C, then drain and return.
    pub async fn serve(self, router: Router<BoxedHandler>) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `signal` resolves.
    pub async fn serve_with_shutdown(
        self,
        router: Router<BoxedHandler>,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = match self.bind {
            Bind::Addr(addr) => TcpListener::bind(addr).await?,
            Bind::Listener(listener) => listener,
        };

        let router = Arc::new(router);
        info!(addr = %listener.local_addr()?, routes = router.len(), "tsuji listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting immediately.
                biased;

                () = &mut signal => {
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
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move {
                                let res = dispatch(&router, req).await;
                                Ok::<_, std::convert::Infallible>(res.into_inner())
                            }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("tsuji stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response.
pub(crate) async fn dispatch<B>(router: &Router<BoxedHandler>, req: http::Request<B>) -> Response
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_owned();

    match router.resolve(parts.method.as_str(), &path) {
        MatchResult::Matched { handler, params } => {
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    warn!(%path, "failed to read request body: {e}");
                    return Response::status(StatusCode::BAD_REQUEST);
                }
            };
            handler.call(Request::new(parts, body, params)).await
        }
        MatchResult::NoMatch => {
            let allowed = router.allowed_methods(&path);
            debug!(method = %parts.method, %path, ?allowed, "no route matched");
            if allowed.is_empty() {
                return Response::status(StatusCode::NOT_FOUND);
            }
            let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
            Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .header(ALLOW.as_str(), &allow)
                .no_body()
        }
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on SIGTERM (Unix) or Ctrl-C, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
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
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::Full;

    use super::*;
    use crate::method::Method;

    async fn echo_id(req: Request) -> String {
        format!("user {}", req.param("id").unwrap_or("?"))
    }

    async fn echo_body(req: Request) -> Response {
        Response::builder()
            .status(StatusCode::CREATED)
            .text(String::from_utf8_lossy(req.body()).into_owned())
    }

    fn app() -> Router<BoxedHandler> {
        Router::new()
            .get("/users/{id:int}", echo_id)
            .post("/users", echo_body)
            .route(Method::Delete, "/users/{id}", |_req: Request| async { StatusCode::NO_CONTENT })
    }

    fn request(method: &str, uri: &str, body: &'static str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    async fn body_text(res: Response) -> String {
        let bytes = res.into_inner().into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn invokes_matched_handler_with_params() {
        let res = dispatch(&app(), request("GET", "/users/42?x=1", "")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(body_text(res).await, "user 42");
    }

    #[tokio::test]
    async fn passes_collected_body() {
        let res = dispatch(&app(), request("POST", "/users", "alice")).await;
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(body_text(res).await, "alice");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let res = dispatch(&app(), request("GET", "/nope", "")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_is_405_with_allow() {
        let res = dispatch(&app(), request("PUT", "/users/7", "")).await;
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[ALLOW], "GET, DELETE");

        let res = dispatch(&app(), request("PUT", "/users/abc", "")).await;
        assert_eq!(res.headers()[ALLOW], "DELETE");
    }
}
