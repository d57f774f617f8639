//! HTTP server: accept loop, admission, protocol selection.
//!
//! # Responsibilities
//! - Accept TCP connections and run the admission gates on each
//! - Perform the TLS handshake and read the negotiated protocol
//! - Hand the connection to the HTTP/1.1 or HTTP/2 dispatcher
//! - Close idle connections
//! - Stop accepting on shutdown
//!
//! # Design Decisions
//! - One task per connection; every stream of an HTTP/2 connection is served
//!   on that task
//! - Rejected connections are dropped before TLS, without a response
//! - Without TLS, `cleartext_protocol` decides the codec (HTTP/2 prior knowledge
//!   when set to `h2`)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_rustls::TlsAcceptor;

use crate::config::ServerConfig;
use crate::http::cors::CorsEvaluator;
use crate::http::h2::serve_h2;
use crate::http::http1::serve_http1;
use crate::net::connection::{ConnectionContext, ServingState};
use crate::net::idle::{IdleStream, IdleTimeouts};
use crate::net::listener::{Listener, ListenerError};
use crate::net::protocol::{Protocol, ProtocolError};
use crate::net::tls::{load_tls_acceptor, TlsError};
use crate::observability::metrics::ServerMetrics;
use crate::routing::RouteBuilder;
use crate::security::{AdmissionGates, RateLimitState};

/// Pause after a failed accept, so a persistent error (e.g. fd exhaustion)
/// does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("invalid cleartext protocol: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// State shared by the accept loop and every connection task.
struct Shared {
    state: Arc<ServingState>,
    gates: AdmissionGates,
    tls: Option<TlsAcceptor>,
    cleartext_protocol: Protocol,
    idle_timeouts: IdleTimeouts,
    max_concurrent_streams: u32,
}

pub struct HttpServer {
    shared: Arc<Shared>,
    bind_address: String,
    metrics: Arc<ServerMetrics>,
}

impl HttpServer {
    /// Compile the routes and prepare TLS and the admission gates.
    pub fn new(config: ServerConfig, routes: RouteBuilder) -> Result<Self, ServerError> {
        let metrics = Arc::new(ServerMetrics::new());

        let tls = match &config.listener.tls {
            Some(tls) => Some(load_tls_acceptor(
                Path::new(&tls.cert_path),
                Path::new(&tls.key_path),
            )?),
            None => None,
        };
        let cleartext_protocol = Protocol::from_name(&config.listener.cleartext_protocol)?;

        let routes = routes.compile();
        tracing::info!(routes = routes.len(), "Routes compiled");

        let state = Arc::new(ServingState {
            routes: Arc::new(routes),
            metrics: Arc::clone(&metrics),
            cors: CorsEvaluator::from_config(&config.cors),
            max_payload_bytes: config.limits.max_payload_bytes,
        });

        let shared = Arc::new(Shared {
            state,
            gates: AdmissionGates::new(&config, Arc::clone(&metrics)),
            tls,
            cleartext_protocol,
            idle_timeouts: IdleTimeouts::from(&config.timeouts),
            max_concurrent_streams: config.limits.max_concurrent_streams,
        });

        Ok(Self {
            shared,
            bind_address: config.listener.bind_address,
            metrics,
        })
    }

    /// Server-wide meters.
    pub fn metrics(&self) -> Arc<ServerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn bind_and_run(self, shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let listener = Listener::bind(&self.bind_address).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        self.serve(Listener::from_tcp(listener), shutdown).await
    }

    async fn serve(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            tls = self.shared.tls.is_some(),
            cleartext_protocol = %self.shared.cleartext_protocol,
            "HTTP server starting"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to accept connection");
                            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                            continue;
                        }
                    };

                    let admitted = match self.shared.gates.admit(peer) {
                        Ok(admitted) => admitted,
                        Err(rejection) => {
                            tracing::debug!(peer_addr = %peer, reason = %rejection, "Connection rejected");
                            continue;
                        }
                    };

                    let shared = Arc::clone(&self.shared);
                    tokio::spawn(async move {
                        let _slot = admitted.slot;
                        handle_connection(stream, peer, admitted.rate_limit, shared).await;
                    });
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    rate_limit: RateLimitState,
    shared: Arc<Shared>,
) {
    let stream = IdleStream::new(stream);
    let watchdog = stream.activity().watchdog(shared.idle_timeouts);

    tokio::select! {
        _ = negotiate(stream, peer, rate_limit, &shared) => {}
        kind = watchdog => {
            tracing::debug!(peer_addr = %peer, idle = %kind, "Closing idle connection");
        }
    }
}

async fn negotiate(
    stream: IdleStream<TcpStream>,
    peer: SocketAddr,
    rate_limit: RateLimitState,
    shared: &Shared,
) {
    let Some(acceptor) = &shared.tls else {
        serve_protocol(stream, shared.cleartext_protocol, peer, rate_limit, shared).await;
        return;
    };

    let tls_stream = match acceptor.accept(stream).await {
        Ok(tls_stream) => tls_stream,
        Err(e) => {
            tracing::debug!(peer_addr = %peer, error = %e, "TLS handshake failed");
            return;
        }
    };

    let protocol = match Protocol::from_alpn(tls_stream.get_ref().1.alpn_protocol()) {
        Ok(protocol) => protocol,
        Err(e) => {
            tracing::error!(peer_addr = %peer, error = %e, "Negotiated protocol has no codec, closing");
            return;
        }
    };
    serve_protocol(tls_stream, protocol, peer, rate_limit, shared).await;
}

async fn serve_protocol<IO>(
    io: IO,
    protocol: Protocol,
    peer: SocketAddr,
    rate_limit: RateLimitState,
    shared: &Shared,
) where
    IO: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let ctx = ConnectionContext::new(peer, protocol, rate_limit, Arc::clone(&shared.state));
    let connection_id = ctx.id;
    let _guard = ctx.track();

    let result = match protocol {
        Protocol::Http1 => serve_http1(io, ctx).await.map_err(|e| e.to_string()),
        Protocol::Http2 => serve_h2(io, ctx, shared.max_concurrent_streams)
            .await
            .map_err(|e| e.to_string()),
    };

    if let Err(e) = result {
        tracing::debug!(connection_id = %connection_id, error = %e, "Connection ended with error");
    }
}
