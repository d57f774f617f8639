//! HTTP/1.1 dispatcher: one aggregated request, one response, then close.
//!
//! # Data Flow
//! ```text
//! hyper http1 codec (keep-alive off)
//!     → request meter
//!     → soft rate limit? → 429
//!     → CORS evaluation (preflight / forbidden short-circuit)
//!     → declared content-length over max_payload_bytes → 413
//!     → aggregate body up to max_payload_bytes → 413 when exceeded
//!     → route lookup → 404 / 405 / handler
//!     → status meter, write response, close
//! ```

use std::convert::Infallible;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::http::cors::{apply_outbound, CorsDecision};
use crate::http::dispatch::invoke;
use crate::http::request::{declared_length, path_of, Request};
use crate::http::response::Response;
use crate::net::connection::ConnectionContext;
use crate::net::protocol::Protocol;
use crate::routing::Match;

/// Serve a single request on `io`.
pub async fn serve_http1<IO>(io: IO, ctx: ConnectionContext) -> Result<(), hyper::Error>
where
    IO: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = service_fn(move |request: hyper::Request<Incoming>| {
        let ctx = ctx.clone();
        async move {
            let response = handle(&ctx, request).await;
            ctx.metrics().mark_status(response.status());
            tracing::trace!(connection_id = %ctx.id, status = %response.status(), "Writing response");

            let (head, body) = response.into_head();
            Ok::<_, Infallible>(head.map(|()| Full::new(body)))
        }
    });

    http1::Builder::new()
        .keep_alive(false)
        .serve_connection(TokioIo::new(io), service)
        .await
}

async fn handle(ctx: &ConnectionContext, request: hyper::Request<Incoming>) -> Response {
    ctx.metrics().requests().mark();

    if ctx.is_soft_limited() {
        return Response::too_many_requests();
    }

    let (parts, body) = request.into_parts();

    let cors_headers = match ctx.cors().map(|c| c.evaluate(&parts.method, &parts.headers)) {
        Some(CorsDecision::Respond(response)) => return response,
        Some(CorsDecision::Continue(outbound)) => outbound,
        None => HeaderMap::new(),
    };

    if let Some(declared) = declared_length(&parts.headers) {
        if declared > ctx.max_payload_bytes() as u64 {
            tracing::debug!(
                connection_id = %ctx.id,
                peer_addr = %ctx.peer,
                content_length = declared,
                "Declared payload too large"
            );
            return Response::payload_too_large();
        }
    }

    let body = match read_body(ctx, body).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    let uri = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.to_string());

    let mut response = match ctx.routes().match_request(path_of(&uri), &parts.method) {
        Match::Matched { handler, variables } => {
            let request = Request::new(parts.method, uri, parts.headers, body)
                .with_variables(variables)
                .with_protocol(Protocol::Http1)
                .with_peer_addr(ctx.peer);
            invoke(handler.as_ref(), &request)
        }
        Match::NotFound => Response::empty(StatusCode::NOT_FOUND),
        Match::MethodNotAllowed => Response::empty(StatusCode::METHOD_NOT_ALLOWED),
    };
    apply_outbound(&cors_headers, &mut response);
    response
}

async fn read_body(ctx: &ConnectionContext, body: Incoming) -> Result<Bytes, Response> {
    match Limited::new(body, ctx.max_payload_bytes()).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            tracing::debug!(connection_id = %ctx.id, peer_addr = %ctx.peer, "Payload too large");
            Err(Response::payload_too_large())
        }
        Err(e) => {
            tracing::debug!(connection_id = %ctx.id, error = %e, "Failed to read request body");
            Err(Response::empty(StatusCode::BAD_REQUEST))
        }
    }
}
