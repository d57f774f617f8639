//! xrpc-server
//!
//! Runs the server core with a small set of demo routes.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──TCP──▶ net::listener ──▶ security gates ──▶ net::tls (ALPN)
//!                                      │  limit        │
//!                                      │  rate         ├─ http/1.1 ─▶ http::http1 ─┐
//!                                      │  ip filter    │                           │
//!                                      │  firewall     └─ h2 ───────▶ http::h2 ────┤
//!                                      ▼                                           ▼
//!                                    drop                           routing::CompiledRoutes
//!                                                                                  │
//!   Client ◀──────────────────────────── response ◀── status meter ◀── handler ◀──┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use http::StatusCode;
use serde::Deserialize;

use xrpc_server::config::{load_config, ServerConfig};
use xrpc_server::lifecycle::signals::shutdown_on_signal;
use xrpc_server::observability::{logging, metrics};
use xrpc_server::{HandlerError, HandlerResult, HttpServer, Request, Response, RouteBuilder, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "xrpc-server", version, about = "Embeddable HTTP/1.1 + HTTP/2 server core")]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Person {
    name: String,
}

fn demo_routes() -> Result<RouteBuilder, xrpc_server::routing::RouteError> {
    let mut routes = RouteBuilder::new();

    routes.get("/people/{name}", |req: &Request| -> HandlerResult {
        let name = req.variable("name").unwrap_or_default();
        Ok(Response::text(StatusCode::OK, format!("hello {}", name)))
    })?;

    routes.post("/people", |req: &Request| -> HandlerResult {
        let person: Person = req.json()?;
        if person.name.is_empty() {
            return Err(HandlerError::bad_request("name must not be empty"));
        }
        Response::json(StatusCode::CREATED, &serde_json::json!({ "created": person.name }))
    })?;

    routes.post("/echo", |req: &Request| -> HandlerResult {
        Ok(Response::text(StatusCode::OK, req.body().clone()))
    })?;

    Ok(routes)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "xrpc-server starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        event_loop_threads = config.listener.event_loop_threads,
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.listener.event_loop_threads.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        if config.observability.metrics_enabled {
            match config.observability.metrics_address.parse() {
                Ok(addr) => metrics::init_metrics(addr),
                Err(e) => tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    error = %e,
                    "Failed to parse metrics address"
                ),
            }
        }

        let server = HttpServer::new(config, demo_routes()?)?;

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        let signals = shutdown.clone();
        tokio::spawn(async move { shutdown_on_signal(&signals).await });

        server.bind_and_run(receiver).await?;
        tracing::info!("Shutdown complete");
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}
