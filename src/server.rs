//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server stops accepting, lets every in-flight
//! connection finish, then returns from [`Server::serve`] so `main` can exit.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::{ApiError, Error, error_response};
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::middleware::{self, Cors};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::{Route, Router};
use crate::status::Status;

/// The HTTP server.
pub struct Server {
    listener: TcpListener,
    cors: Option<Cors>,
}

impl Server {
    /// Binds the listener. Port `0` picks an ephemeral port; read it back
    /// with [`local_addr`](Server::local_addr).
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, cors: None })
    }

    /// Applies `cors` to every response, including 404 and 405.
    pub fn cors(mut self, cors: Option<Cors>) -> Self {
        self.cors = cors;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until SIGTERM or Ctrl-C, then drains in-flight connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves until `signal` resolves, then drains in-flight connections.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let addr = self.listener.local_addr()?;
        let app = Arc::new(App { router, cors: self.cors });

        info!(%addr, "waybill listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Shutdown is checked first so a queued backlog cannot delay it.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = self.listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { Ok::<_, std::convert::Infallible>(app.dispatch(req).await) }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(%peer, "connection error: {e}");
                        }
                    });
                }

                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("waybill stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

struct App {
    router: Router,
    cors: Option<Cors>,
}

impl App {
    /// Routes one request and produces one response. Never fails: routing
    /// misses become 404/405 and handler panics become 500.
    async fn dispatch(
        &self,
        req: hyper::Request<hyper::body::Incoming>,
    ) -> http::Response<http_body_util::Full<bytes::Bytes>> {
        let started = Instant::now();
        let (parts, _body) = req.into_parts();
        let path = parts.uri.path().to_owned();

        let mut response = match Method::try_from(&parts.method) {
            Ok(method) => match self.router.lookup(method, &path) {
                Route::Matched(handler, params) => {
                    run(handler, Request::from_parts(method, &parts, params)).await
                }
                Route::MethodNotAllowed => error_response(Status::MethodNotAllowed, "Method not allowed"),
                Route::NotFound => error_response(Status::NotFound, "Not found"),
            },
            Err(_) => error_response(Status::MethodNotAllowed, "Method not allowed"),
        };

        if let Some(cors) = &self.cors {
            cors.apply(&mut response);
        }
        middleware::trace::record(&parts.method, &path, response.status_code(), started.elapsed());
        response.into_inner()
    }
}

/// Runs the handler on its own task so a panic is contained to this request
/// and reported to the caller as a 500 carrying the panic message.
async fn run(handler: BoxedHandler, req: Request) -> Response {
    match tokio::spawn(handler.call(req)).await {
        Ok(response) => response,
        Err(e) => {
            let message = if e.is_panic() {
                let payload = e.into_panic();
                payload.downcast_ref::<&str>().map(|s| (*s).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_owned())
            } else {
                e.to_string()
            };
            ApiError::Internal(message).into_response()
        }
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM (Unix) or Ctrl-C. A handler that fails to
/// install is logged and never fires.
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
            Ok(mut sig) => {
                sig.recv().await;
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
