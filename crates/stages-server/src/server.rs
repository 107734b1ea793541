//! HTTP server.
//!
//! A Tokio TCP listener feeding hyper HTTP/1.1 connections. Every request
//! is collected (bounded by size and time) and handed to [`App::handle`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use crate::app::{App, HttpResponse};
use crate::config::ServerConfig;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use crate::ServerError;

/// The construction stages HTTP server.
///
/// # Example
///
/// ```rust,ignore
/// use stages_server::{App, Server, ServerConfig};
///
/// let server = Server::new(ServerConfig::default(), app);
/// server.run().await?;
/// ```
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    app: Arc<App>,
}

impl Server {
    /// Creates a server that dispatches to `app`.
    pub fn new(config: ServerConfig, app: App) -> Self {
        Self {
            config,
            app: Arc::new(app),
        }
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::BindError(format!("Invalid address '{}': {}", self.config.http_addr(), e))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("Failed to bind to {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already-bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "Server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new(server.config.max_connections());

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let Some(token) = tracker.try_acquire() else {
                                tracing::warn!(
                                    remote = %remote_addr,
                                    active = tracker.active_connections(),
                                    "Connection limit reached, dropping connection"
                                );
                                continue;
                            };
                            let server = Arc::clone(&server);
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::debug!(remote = %remote_addr, error = %e, "Connection error");
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            timeout = ?shutdown_timeout,
            active = tracker.active_connections(),
            "Waiting for connections to close"
        );

        tokio::select! {
            () = tracker.wait_for_drain() => {
                tracing::info!("All connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    active = tracker.active_connections(),
                    "Shutdown timeout reached with connections still open"
                );
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                tracing::debug!(remote = %remote_addr, "Closing connection for shutdown");
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(&self, req: Request<Incoming>) -> HttpResponse {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let timeout = self.config.request_timeout();

        let work = async {
            let body = match collect_body(req, self.config.max_body_bytes()).await {
                Ok(body) => body,
                Err(reply) => return reply,
            };
            self.app.handle(&method, &path, &body).await
        };

        match tokio::time::timeout(timeout, work).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(http.method = %method, http.path = %path, "Request timed out");
                plain_error(StatusCode::GATEWAY_TIMEOUT, "Request timed out")
            }
        }
    }
}

async fn collect_body(req: Request<Incoming>, limit: usize) -> Result<Bytes, HttpResponse> {
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) => {
            if e.downcast_ref::<http_body_util::LengthLimitError>().is_some() {
                Err(plain_error(StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large"))
            } else {
                tracing::debug!(error = %e, "Failed to read request body");
                Err(plain_error(StatusCode::BAD_REQUEST, "Failed to read request body"))
            }
        }
    }
}

/// Transport-level failures that never reach the dispatcher.
fn plain_error(status: StatusCode, message: &str) -> HttpResponse {
    let body = serde_json::json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
        }
    });

    let mut response = HttpResponse::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerConfig, StageHandler};
    use stages_store::MemoryStore;
    use std::time::Duration;

    fn app() -> App {
        App::new(StageHandler::new(
            Arc::new(MemoryStore::new()),
            HandlerConfig::default(),
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_server_run_invalid_address() {
        let server = Server::new(
            ServerConfig::builder().http_addr("not-a-valid-address").build(),
            app(),
        );

        let result = server.run_with_shutdown(ShutdownSignal::new()).await;
        match result {
            Err(ServerError::BindError(msg)) => assert!(msg.contains("Invalid address")),
            other => panic!("expected BindError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_run_and_shutdown() {
        let server = Server::new(
            ServerConfig::builder()
                .http_addr("127.0.0.1:0")
                .shutdown_timeout(Duration::from_millis(100))
                .build(),
            app(),
        );

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result =
            tokio::time::timeout(Duration::from_secs(5), server.run_with_shutdown(shutdown)).await;
        assert!(result.is_ok());
        assert!(result.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_plain_error() {
        let response = plain_error(StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], 413);
        assert_eq!(body["error"]["message"], "Request body is too large");
    }
}
