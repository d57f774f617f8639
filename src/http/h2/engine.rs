//! HTTP/2 per-stream state machine.
//!
//! # Responsibilities
//! - Turn header and data events for many interleaved streams into handler calls
//! - Accumulate request bodies per stream, enforcing the payload limit
//! - Apply the soft rate limit and CORS before touching the route table
//! - Write exactly one response per stream and mark exactly one status meter
//!
//! # States
//! ```text
//! AwaitingHeaders ──headers(eos)──────────────────────────→ Complete
//!        │
//!        └─headers(!eos)─→ AwaitingBody ──data(eos)──────→ Complete
//!                             │  ▲   │
//!                             └──┘   ├─data over limit───→ Complete
//!                            data    └─trailers(eos)─────→ Complete
//! ```
//!
//! # Design Decisions
//! - No I/O here: events come in as method calls, frames go out through a
//!   [`FrameSink`], so the engine is driven by the h2 connection task and by
//!   tests alike
//! - Pending stream state lives in a plain map owned by the connection task;
//!   an entry is removed on every path that completes or aborts its stream
//! - Any headers block for a stream with pending state is treated as a
//!   trailer continuation and merged without re-routing

use std::collections::HashMap;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Method, StatusCode};

use crate::http::cors::{apply_outbound, CorsDecision};
use crate::http::dispatch::invoke;
use crate::http::request::{declared_length, path_of, Request};
use crate::http::response::Response;
use crate::net::connection::ConnectionContext;
use crate::net::protocol::Protocol;
use crate::routing::{Match, MeteredHandler};

/// Outbound half of an HTTP/2 connection as seen by the engine.
pub trait FrameSink {
    fn write_headers(&mut self, stream_id: u32, head: http::Response<()>, end_stream: bool);

    fn write_data(&mut self, stream_id: u32, data: Bytes, end_stream: bool);
}

/// A headers block received on a stream.
#[derive(Debug, Clone)]
pub enum StreamHeaders {
    /// Initial request headers, pseudo-headers already split out.
    Request {
        method: Method,
        uri: String,
        headers: HeaderMap,
    },
    /// A trailer block.
    Trailers(HeaderMap),
}

#[derive(Debug)]
struct PendingStream {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: BytesMut,
    /// Body bytes plus padding, as counted against the payload limit.
    received: usize,
    handler: Arc<MeteredHandler>,
    variables: HashMap<String, String>,
    cors_headers: HeaderMap,
}

pub struct StreamEngine {
    ctx: ConnectionContext,
    pending: HashMap<u32, PendingStream>,
}

impl StreamEngine {
    pub fn new(ctx: ConnectionContext) -> Self {
        Self {
            ctx,
            pending: HashMap::new(),
        }
    }

    /// Streams waiting for body data or trailers.
    pub fn pending_streams(&self) -> usize {
        self.pending.len()
    }

    pub fn on_headers<S: FrameSink>(
        &mut self,
        stream_id: u32,
        block: StreamHeaders,
        end_stream: bool,
        sink: &mut S,
    ) {
        if self.pending.contains_key(&stream_id) {
            self.on_trailers(stream_id, block, end_stream, sink);
            return;
        }

        let (method, uri, headers) = match block {
            StreamHeaders::Request {
                method,
                uri,
                headers,
            } => (method, uri, headers),
            StreamHeaders::Trailers(_) => {
                tracing::debug!(
                    connection_id = %self.ctx.id,
                    stream_id,
                    "Trailers for stream with no pending request, ignoring"
                );
                return;
            }
        };

        self.ctx.metrics().requests().mark();

        if self.ctx.is_soft_limited() {
            self.write_response(sink, stream_id, Response::too_many_requests());
            return;
        }

        let cors_headers = match self.ctx.cors().map(|c| c.evaluate(&method, &headers)) {
            Some(CorsDecision::Respond(response)) => {
                self.write_response(sink, stream_id, response);
                return;
            }
            Some(CorsDecision::Continue(outbound)) => outbound,
            None => HeaderMap::new(),
        };

        if !end_stream {
            if let Some(declared) = declared_length(&headers) {
                if declared > self.ctx.max_payload_bytes() as u64 {
                    tracing::debug!(
                        connection_id = %self.ctx.id,
                        stream_id,
                        content_length = declared,
                        "Declared payload too large"
                    );
                    self.write_response(sink, stream_id, Response::payload_too_large());
                    return;
                }
            }
        }

        let (handler, variables) = match self.ctx.routes().match_request(path_of(&uri), &method) {
            Match::Matched { handler, variables } => (handler, variables),
            Match::NotFound => {
                self.write_response(sink, stream_id, Response::empty(StatusCode::NOT_FOUND));
                return;
            }
            Match::MethodNotAllowed => {
                self.write_response(
                    sink,
                    stream_id,
                    Response::empty(StatusCode::METHOD_NOT_ALLOWED),
                );
                return;
            }
        };

        let stream = PendingStream {
            method,
            uri,
            headers,
            body: BytesMut::new(),
            received: 0,
            handler,
            variables,
            cors_headers,
        };

        if end_stream {
            self.dispatch(sink, stream_id, stream);
        } else {
            self.pending.insert(stream_id, stream);
        }
    }

    fn on_trailers<S: FrameSink>(
        &mut self,
        stream_id: u32,
        block: StreamHeaders,
        end_stream: bool,
        sink: &mut S,
    ) {
        let extra = match block {
            StreamHeaders::Request { headers, .. } => headers,
            StreamHeaders::Trailers(headers) => headers,
        };

        let Some(stream) = self.pending.get_mut(&stream_id) else {
            return;
        };
        // Append: a trailer never replaces a field the request already carried.
        let mut current = None;
        for (name, value) in extra {
            if let Some(name) = name {
                current = Some(name);
            }
            if let Some(name) = &current {
                stream.headers.append(name.clone(), value);
            }
        }

        if end_stream {
            if let Some(stream) = self.pending.remove(&stream_id) {
                self.dispatch(sink, stream_id, stream);
            }
        }
    }

    /// Handle a data frame. Returns the number of bytes to credit back to
    /// flow control: always `data.len() + padding`.
    pub fn on_data<S: FrameSink>(
        &mut self,
        stream_id: u32,
        data: Bytes,
        padding: usize,
        end_stream: bool,
        sink: &mut S,
    ) -> usize {
        let processed = data.len() + padding;

        let Some(stream) = self.pending.get_mut(&stream_id) else {
            if !data.is_empty() || padding > 0 {
                tracing::debug!(
                    connection_id = %self.ctx.id,
                    stream_id,
                    bytes = processed,
                    "Data for stream with no pending request, ignoring"
                );
            }
            return processed;
        };

        stream.received += processed;
        if stream.received > self.ctx.max_payload_bytes() {
            tracing::debug!(
                connection_id = %self.ctx.id,
                stream_id,
                received = stream.received,
                "Payload too large"
            );
            self.pending.remove(&stream_id);
            self.write_response(sink, stream_id, Response::payload_too_large());
            return processed;
        }
        stream.body.extend_from_slice(&data);

        if end_stream {
            if let Some(stream) = self.pending.remove(&stream_id) {
                self.dispatch(sink, stream_id, stream);
            }
        }
        processed
    }

    /// The stream was reset or failed; drop anything held for it.
    pub fn on_stream_closed(&mut self, stream_id: u32) {
        if self.pending.remove(&stream_id).is_some() {
            tracing::debug!(
                connection_id = %self.ctx.id,
                stream_id,
                "Stream closed before request completed"
            );
        }
    }

    fn dispatch<S: FrameSink>(&self, sink: &mut S, stream_id: u32, stream: PendingStream) {
        let request = Request::new(stream.method, stream.uri, stream.headers, stream.body.freeze())
            .with_variables(stream.variables)
            .with_protocol(Protocol::Http2)
            .with_peer_addr(self.ctx.peer);

        let mut response = invoke(stream.handler.as_ref(), &request);
        apply_outbound(&stream.cors_headers, &mut response);
        self.write_response(sink, stream_id, response);
    }

    fn write_response<S: FrameSink>(&self, sink: &mut S, stream_id: u32, response: Response) {
        let status = response.status();
        self.ctx.metrics().mark_status(status);
        tracing::trace!(connection_id = %self.ctx.id, stream_id, status = %status, "Writing response");

        let (head, body) = response.into_head();
        if body.is_empty() {
            sink.write_headers(stream_id, head, true);
        } else {
            sink.write_headers(stream_id, head, false);
            sink.write_data(stream_id, body, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorsConfig;
    use crate::http::cors::CorsEvaluator;
    use crate::http::handler::{HandlerError, HandlerResult};
    use crate::http::response::{PAYLOAD_TOO_LARGE_BODY, RATE_LIMIT_BODY};
    use crate::net::connection::ServingState;
    use crate::observability::metrics::ServerMetrics;
    use crate::routing::RouteBuilder;
    use crate::security::RateLimitState;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq)]
    enum Written {
        Headers {
            stream_id: u32,
            status: StatusCode,
            end_stream: bool,
        },
        Data {
            stream_id: u32,
            data: Bytes,
            end_stream: bool,
        },
    }

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<Written>,
        heads: Vec<http::Response<()>>,
    }

    impl RecordingSink {
        fn headers_count(&self) -> usize {
            self.writes
                .iter()
                .filter(|w| matches!(w, Written::Headers { .. }))
                .count()
        }

        fn data_count(&self) -> usize {
            self.writes
                .iter()
                .filter(|w| matches!(w, Written::Data { .. }))
                .count()
        }

        fn status(&self) -> Option<StatusCode> {
            self.writes.iter().find_map(|w| match w {
                Written::Headers { status, .. } => Some(*status),
                _ => None,
            })
        }

        fn body(&self) -> Bytes {
            self.writes
                .iter()
                .find_map(|w| match w {
                    Written::Data { data, .. } => Some(data.clone()),
                    _ => None,
                })
                .unwrap_or_default()
        }
    }

    impl FrameSink for RecordingSink {
        fn write_headers(&mut self, stream_id: u32, head: http::Response<()>, end_stream: bool) {
            self.writes.push(Written::Headers {
                stream_id,
                status: head.status(),
                end_stream,
            });
            self.heads.push(head);
        }

        fn write_data(&mut self, stream_id: u32, data: Bytes, end_stream: bool) {
            self.writes.push(Written::Data {
                stream_id,
                data,
                end_stream,
            });
        }
    }

    struct Fixture {
        engine: StreamEngine,
        metrics: Arc<ServerMetrics>,
        seen_bodies: Arc<Mutex<Vec<Bytes>>>,
        seen_headers: Arc<Mutex<Vec<HeaderMap>>>,
    }

    fn fixture_with(rate_limit: RateLimitState, cors: Option<CorsEvaluator>) -> Fixture {
        let seen_bodies = Arc::new(Mutex::new(Vec::new()));
        let seen_headers = Arc::new(Mutex::new(Vec::new()));

        let mut builder = RouteBuilder::new();
        builder
            .get("/people/{name}", |_: &Request| -> HandlerResult { Ok(Response::ok()) })
            .unwrap();
        let bodies = Arc::clone(&seen_bodies);
        let headers = Arc::clone(&seen_headers);
        builder
            .post("/echo", move |req: &Request| -> HandlerResult {
                bodies.lock().unwrap().push(req.body().clone());
                headers.lock().unwrap().push(req.headers().clone());
                Ok(Response::text(StatusCode::OK, req.body().clone()))
            })
            .unwrap();
        builder
            .get("/fail", |_: &Request| -> HandlerResult {
                Err(HandlerError::Message("broken".into()))
            })
            .unwrap();

        let metrics = Arc::new(ServerMetrics::new());
        let state = Arc::new(ServingState {
            routes: Arc::new(builder.compile()),
            metrics: Arc::clone(&metrics),
            cors,
            max_payload_bytes: 8,
        });
        let ctx = ConnectionContext::new(
            "127.0.0.1:40000".parse().unwrap(),
            Protocol::Http2,
            rate_limit,
            state,
        );

        Fixture {
            engine: StreamEngine::new(ctx),
            metrics,
            seen_bodies,
            seen_headers,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RateLimitState::NotLimited, None)
    }

    fn request(method: Method, uri: &str, headers: &[(&'static str, &'static str)]) -> StreamHeaders {
        StreamHeaders::Request {
            method,
            uri: uri.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (http::HeaderName::from_static(k), http::HeaderValue::from_static(v)))
                .collect(),
        }
    }

    #[test]
    fn headers_only_get_writes_single_headers_frame() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine
            .on_headers(1, request(Method::GET, "/people/jeff", &[]), true, &mut sink);

        assert_eq!(
            sink.writes,
            vec![Written::Headers {
                stream_id: 1,
                status: StatusCode::OK,
                end_stream: true
            }]
        );
        assert_eq!(f.metrics.status_count(StatusCode::OK), 1);
        assert_eq!(f.metrics.requests().count(), 1);
        assert_eq!(f.engine.pending_streams(), 0);
    }

    #[test]
    fn data_frames_accumulate_in_order() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine
            .on_headers(3, request(Method::POST, "/echo", &[]), false, &mut sink);
        assert_eq!(f.engine.pending_streams(), 1);
        assert!(sink.writes.is_empty());

        f.engine.on_data(3, Bytes::from_static(b"a"), 0, false, &mut sink);
        f.engine.on_data(3, Bytes::from_static(b"b"), 0, false, &mut sink);
        f.engine.on_data(3, Bytes::from_static(b"c"), 0, true, &mut sink);

        assert_eq!(*f.seen_bodies.lock().unwrap(), vec![Bytes::from_static(b"abc")]);
        assert_eq!(sink.headers_count(), 1);
        assert_eq!(sink.data_count(), 1);
        assert_eq!(sink.body(), Bytes::from_static(b"abc"));
        assert_eq!(
            sink.writes.last(),
            Some(&Written::Data {
                stream_id: 3,
                data: Bytes::from_static(b"abc"),
                end_stream: true
            })
        );
        assert_eq!(f.engine.pending_streams(), 0);
        assert_eq!(f.metrics.requests().count(), 1);
    }

    #[test]
    fn declared_oversize_rejected_before_body() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine.on_headers(
            5,
            request(Method::POST, "/echo", &[("content-length", "100")]),
            false,
            &mut sink,
        );

        assert_eq!(sink.status(), Some(StatusCode::PAYLOAD_TOO_LARGE));
        assert_eq!(sink.body(), Bytes::from_static(PAYLOAD_TOO_LARGE_BODY));
        assert_eq!(f.engine.pending_streams(), 0);
        assert_eq!(f.metrics.status_count(StatusCode::PAYLOAD_TOO_LARGE), 1);
    }

    #[test]
    fn unparsable_content_length_is_ignored() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine.on_headers(
            5,
            request(Method::POST, "/echo", &[("content-length", "lots")]),
            false,
            &mut sink,
        );
        assert!(sink.writes.is_empty());
        assert_eq!(f.engine.pending_streams(), 1);

        f.engine.on_data(5, Bytes::from_static(b"ok"), 0, true, &mut sink);
        assert_eq!(sink.status(), Some(StatusCode::OK));
    }

    #[test]
    fn oversize_through_data_frames() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine
            .on_headers(7, request(Method::POST, "/echo", &[]), false, &mut sink);
        assert_eq!(f.engine.on_data(7, Bytes::from_static(b"12345"), 0, false, &mut sink), 5);
        assert!(sink.writes.is_empty());

        // 5 + 4 + 1 padding > 8
        let processed = f.engine.on_data(7, Bytes::from_static(b"6789"), 1, false, &mut sink);
        assert_eq!(processed, 5);
        assert_eq!(sink.status(), Some(StatusCode::PAYLOAD_TOO_LARGE));
        assert_eq!(f.engine.pending_streams(), 0);
        assert!(f.seen_bodies.lock().unwrap().is_empty());

        // The rest of the body is credited but otherwise ignored.
        assert_eq!(f.engine.on_data(7, Bytes::from_static(b"0"), 0, true, &mut sink), 1);
        assert_eq!(sink.headers_count(), 1);
    }

    #[test]
    fn padding_counts_towards_processed_bytes() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine
            .on_headers(9, request(Method::POST, "/echo", &[]), false, &mut sink);
        assert_eq!(f.engine.on_data(9, Bytes::from_static(b"ab"), 3, true, &mut sink), 5);
        assert_eq!(sink.body(), Bytes::from_static(b"ab"));
    }

    #[test]
    fn data_for_unknown_stream_is_a_no_op() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        assert_eq!(f.engine.on_data(11, Bytes::from_static(b"xyz"), 2, true, &mut sink), 5);
        assert!(sink.writes.is_empty());
        assert_eq!(f.metrics.requests().count(), 0);
    }

    #[test]
    fn soft_limited_connection_gets_429() {
        let mut f = fixture_with(RateLimitState::SoftLimited, None);
        let mut sink = RecordingSink::default();

        f.engine
            .on_headers(1, request(Method::GET, "/people/jeff", &[]), true, &mut sink);
        f.engine
            .on_headers(3, request(Method::POST, "/echo", &[]), false, &mut sink);

        assert_eq!(f.metrics.requests().count(), 2);
        assert_eq!(f.metrics.status_count(StatusCode::TOO_MANY_REQUESTS), 2);
        assert_eq!(f.metrics.status_count(StatusCode::OK), 0);
        assert_eq!(f.engine.pending_streams(), 0);
        assert_eq!(sink.body(), Bytes::from_static(RATE_LIMIT_BODY));
    }

    #[test]
    fn trailers_are_merged_without_new_request() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine.on_headers(
            13,
            request(Method::POST, "/echo", &[("x-first", "1")]),
            false,
            &mut sink,
        );
        f.engine.on_data(13, Bytes::from_static(b"hi"), 0, false, &mut sink);

        let mut trailers = HeaderMap::new();
        trailers.insert("x-checksum", "abc".parse().unwrap());
        trailers.insert("x-first", "2".parse().unwrap());
        f.engine
            .on_headers(13, StreamHeaders::Trailers(trailers), true, &mut sink);

        let seen = f.seen_headers.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["x-checksum"], "abc");
        let firsts: Vec<_> = seen[0].get_all("x-first").iter().collect();
        assert_eq!(firsts, ["1", "2"]);
        assert_eq!(f.metrics.requests().count(), 1);
        assert_eq!(sink.body(), Bytes::from_static(b"hi"));
        assert_eq!(f.engine.pending_streams(), 0);
    }

    #[test]
    fn routing_misses_have_empty_bodies() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine
            .on_headers(1, request(Method::GET, "/nowhere", &[]), true, &mut sink);
        f.engine
            .on_headers(3, request(Method::DELETE, "/echo", &[]), true, &mut sink);

        assert_eq!(sink.data_count(), 0);
        assert_eq!(f.metrics.status_count(StatusCode::NOT_FOUND), 1);
        assert_eq!(f.metrics.status_count(StatusCode::METHOD_NOT_ALLOWED), 1);
    }

    #[test]
    fn query_string_is_not_part_of_route() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine.on_headers(
            1,
            request(Method::GET, "/people/jeff?verbose=true", &[]),
            true,
            &mut sink,
        );
        assert_eq!(sink.status(), Some(StatusCode::OK));
    }

    #[test]
    fn handler_error_becomes_500() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine
            .on_headers(1, request(Method::GET, "/fail", &[]), true, &mut sink);
        assert_eq!(sink.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(f.metrics.status_count(StatusCode::INTERNAL_SERVER_ERROR), 1);

        // The engine keeps serving.
        f.engine
            .on_headers(3, request(Method::GET, "/people/ann", &[]), true, &mut sink);
        assert_eq!(f.metrics.status_count(StatusCode::OK), 1);
    }

    #[test]
    fn cors_preflight_short_circuits() {
        let cors = CorsEvaluator::from_config(&CorsConfig {
            enabled: true,
            allowed_origins: vec!["foo.bar".into()],
            ..Default::default()
        });
        let mut f = fixture_with(RateLimitState::NotLimited, cors);
        let mut sink = RecordingSink::default();

        f.engine.on_headers(
            1,
            request(
                Method::OPTIONS,
                "/nowhere",
                &[("origin", "foo.bar"), ("access-control-request-method", "GET")],
            ),
            true,
            &mut sink,
        );

        assert_eq!(sink.writes.len(), 1);
        assert_eq!(sink.status(), Some(StatusCode::OK));
        let head = &sink.heads[0];
        assert_eq!(head.headers()["access-control-allow-origin"], "foo.bar");
        assert_eq!(head.headers()["access-control-allow-methods"], "GET,POST");
        assert_eq!(f.metrics.status_count(StatusCode::NOT_FOUND), 0);
    }

    #[test]
    fn cors_forbidden_origin_short_circuits() {
        let cors = CorsEvaluator::from_config(&CorsConfig {
            enabled: true,
            allowed_origins: vec!["foo.bar".into()],
            short_circuit: true,
            ..Default::default()
        });
        let mut f = fixture_with(RateLimitState::NotLimited, cors);
        let mut sink = RecordingSink::default();

        f.engine.on_headers(
            1,
            request(Method::POST, "/echo", &[("origin", "evil.example")]),
            false,
            &mut sink,
        );

        assert_eq!(
            sink.writes,
            vec![Written::Headers {
                stream_id: 1,
                status: StatusCode::FORBIDDEN,
                end_stream: true
            }]
        );
        assert_eq!(f.engine.pending_streams(), 0);
        assert_eq!(f.metrics.status_count(StatusCode::FORBIDDEN), 1);
    }

    #[test]
    fn cors_headers_merged_into_response() {
        let cors = CorsEvaluator::from_config(&CorsConfig {
            enabled: true,
            allowed_origins: vec!["foo.bar".into()],
            ..Default::default()
        });
        let mut f = fixture_with(RateLimitState::NotLimited, cors);
        let mut sink = RecordingSink::default();

        f.engine.on_headers(
            1,
            request(Method::GET, "/people/jeff", &[("origin", "foo.bar")]),
            true,
            &mut sink,
        );
        assert_eq!(sink.heads[0].headers()["access-control-allow-origin"], "foo.bar");
    }

    #[test]
    fn closed_stream_discards_pending_state() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine
            .on_headers(1, request(Method::POST, "/echo", &[]), false, &mut sink);
        f.engine
            .on_headers(3, request(Method::POST, "/echo", &[]), false, &mut sink);
        assert_eq!(f.engine.pending_streams(), 2);

        f.engine.on_stream_closed(1);
        assert_eq!(f.engine.pending_streams(), 1);

        f.engine.on_data(3, Bytes::from_static(b"z"), 0, true, &mut sink);
        assert_eq!(f.engine.pending_streams(), 0);
        assert_eq!(sink.body(), Bytes::from_static(b"z"));
    }

    #[test]
    fn interleaved_streams_complete_independently() {
        let mut f = fixture();
        let mut sink = RecordingSink::default();

        f.engine
            .on_headers(1, request(Method::POST, "/echo", &[]), false, &mut sink);
        f.engine
            .on_headers(3, request(Method::POST, "/echo", &[]), false, &mut sink);
        f.engine.on_data(3, Bytes::from_static(b"three"), 0, false, &mut sink);
        f.engine.on_data(1, Bytes::from_static(b"one"), 0, true, &mut sink);
        f.engine.on_data(3, Bytes::from_static(b"!"), 0, true, &mut sink);

        assert_eq!(
            *f.seen_bodies.lock().unwrap(),
            vec![Bytes::from_static(b"one"), Bytes::from_static(b"three!")]
        );
    }
}
