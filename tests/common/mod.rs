//! Shared utilities for the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use tokio::net::TcpListener;

use rustls::pki_types::CertificateDer;
use xrpc_server::config::{ServerConfig, TlsConfig};
use xrpc_server::observability::metrics::ServerMetrics;
use xrpc_server::{HandlerError, HandlerResult, HttpServer, Request, Response, RouteBuilder, Shutdown};

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub metrics: Arc<ServerMetrics>,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config suitable for tests: loopback, generous rate limits.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.rate_limit.global_soft_rps = 100_000.0;
    config.rate_limit.global_hard_rps = 100_000.0;
    config.rate_limit.soft_rps = 100_000.0;
    config.rate_limit.hard_rps = 100_000.0;
    config
}

/// Routes used across the integration tests.
pub fn test_routes() -> RouteBuilder {
    let mut routes = RouteBuilder::new();
    routes
        .get("/people/{name}", |req: &Request| -> HandlerResult {
            let name = req.variable("name").unwrap_or_default();
            Ok(Response::text(StatusCode::OK, format!("hello {}", name)))
        })
        .unwrap()
        .post("/echo", |req: &Request| -> HandlerResult {
            Ok(Response::text(StatusCode::OK, req.body().clone()))
        })
        .unwrap()
        .post("/checksum", |req: &Request| -> HandlerResult {
            let checksum = req.header("x-checksum").unwrap_or("none").to_string();
            Ok(Response::text(StatusCode::OK, checksum))
        })
        .unwrap()
        .get("/forbidden", |_: &Request| -> HandlerResult {
            Err(HandlerError::forbidden("no"))
        })
        .unwrap()
        .get("/panic", |_: &Request| -> HandlerResult { panic!("handler bug") })
        .unwrap();
    routes
}

/// Start a server with `config` and the shared test routes.
pub async fn start_server(config: ServerConfig) -> TestServer {
    start_server_with_routes(config, test_routes()).await
}

pub async fn start_server_with_routes(config: ServerConfig, routes: RouteBuilder) -> TestServer {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, routes).unwrap();
    let metrics = server.metrics();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    TestServer {
        addr,
        metrics,
        shutdown,
    }
}

/// Client that opens a fresh connection per request, matching the server's
/// one-request-per-connection HTTP/1.1 behavior.
pub fn http1_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Poll `condition` until it holds or a second passes.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Self-signed `localhost` certificate written as PEM files.
pub struct TestCert {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub der: CertificateDer<'static>,
}

impl TestCert {
    pub fn generate(tag: &str) -> Self {
        let rcgen::CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();

        let dir = std::env::temp_dir();
        let stem = format!("xrpc-{}-{}", tag, std::process::id());
        let cert_path = dir.join(format!("{}-cert.pem", stem));
        let key_path = dir.join(format!("{}-key.pem", stem));
        std::fs::write(&cert_path, cert.pem()).unwrap();
        std::fs::write(&key_path, key_pair.serialize_pem()).unwrap();

        Self {
            cert_path,
            key_path,
            der: cert.der().clone(),
        }
    }

    pub fn tls_config(&self) -> TlsConfig {
        TlsConfig {
            cert_path: self.cert_path.to_string_lossy().into_owned(),
            key_path: self.key_path.to_string_lossy().into_owned(),
        }
    }
}

impl Drop for TestCert {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.cert_path);
        let _ = std::fs::remove_file(&self.key_path);
    }
}
