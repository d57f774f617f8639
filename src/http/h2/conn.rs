//! Drives one HTTP/2 connection with the `h2` crate and feeds the stream engine.
//!
//! # Data Flow
//! ```text
//! h2::server::Connection
//!     → accept(): new stream (request head + RecvStream)
//!         → StreamEngine::on_headers
//!         → poll its RecvStream for the next frame
//!     → frame ready:
//!         Data     → StreamEngine::on_data → release flow-control capacity
//!         Trailers → StreamEngine::on_headers (end of stream)
//!         Error    → StreamEngine::on_stream_closed
//!     ← StreamEngine writes through H2Sink (SendResponse / SendStream)
//! ```
//!
//! Everything runs on the connection task: the engine, the pending stream map,
//! and the handlers all share one event loop per connection.

use std::collections::HashMap;
use std::future::poll_fn;

use bytes::Bytes;
use futures_util::stream::{FuturesUnordered, StreamExt};
use h2::server::{Builder, SendResponse};
use h2::{RecvStream, SendStream};
use http::HeaderMap;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::http::h2::engine::{FrameSink, StreamEngine, StreamHeaders};
use crate::net::connection::ConnectionContext;

/// Send halves of the streams on one connection.
#[derive(Default)]
struct H2Sink {
    responders: HashMap<u32, SendResponse<Bytes>>,
    bodies: HashMap<u32, SendStream<Bytes>>,
}

impl H2Sink {
    fn register(&mut self, stream_id: u32, responder: SendResponse<Bytes>) {
        self.responders.insert(stream_id, responder);
    }

    fn forget(&mut self, stream_id: u32) {
        self.responders.remove(&stream_id);
        self.bodies.remove(&stream_id);
    }
}

impl FrameSink for H2Sink {
    fn write_headers(&mut self, stream_id: u32, head: http::Response<()>, end_stream: bool) {
        let Some(mut responder) = self.responders.remove(&stream_id) else {
            tracing::warn!(stream_id, "Response already sent for stream");
            return;
        };
        match responder.send_response(head, end_stream) {
            Ok(body) if !end_stream => {
                self.bodies.insert(stream_id, body);
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(stream_id, error = %e, "Failed to send response headers"),
        }
    }

    fn write_data(&mut self, stream_id: u32, data: Bytes, end_stream: bool) {
        let Some(mut body) = self.bodies.remove(&stream_id) else {
            tracing::warn!(stream_id, "Data written for stream without open response");
            return;
        };
        if let Err(e) = body.send_data(data, end_stream) {
            tracing::debug!(stream_id, error = %e, "Failed to send response data");
            return;
        }
        if !end_stream {
            self.bodies.insert(stream_id, body);
        }
    }
}

enum Frame {
    Data(Result<Bytes, h2::Error>),
    Trailers(Result<Option<HeaderMap>, h2::Error>),
}

async fn next_frame(stream_id: u32, mut body: RecvStream) -> (u32, Frame, RecvStream) {
    match body.data().await {
        Some(data) => (stream_id, Frame::Data(data), body),
        None => {
            let trailers = body.trailers().await;
            (stream_id, Frame::Trailers(trailers), body)
        }
    }
}

/// Serve HTTP/2 on `io` until the peer closes the connection.
pub async fn serve_h2<IO>(
    io: IO,
    ctx: ConnectionContext,
    max_concurrent_streams: u32,
) -> Result<(), h2::Error>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    let connection_id = ctx.id;
    let mut conn = Builder::new()
        .max_concurrent_streams(max_concurrent_streams)
        .handshake::<_, Bytes>(io)
        .await?;

    let mut engine = StreamEngine::new(ctx);
    let mut sink = H2Sink::default();
    let mut reads = FuturesUnordered::new();

    loop {
        tokio::select! {
            accepted = conn.accept() => match accepted {
                Some(Ok((request, responder))) => {
                    let stream_id = responder.stream_id().as_u32();
                    let (parts, body) = request.into_parts();
                    let end_stream = body.is_end_stream();
                    let uri = parts
                        .uri
                        .path_and_query()
                        .map(|pq| pq.as_str().to_string())
                        .unwrap_or_else(|| "/".to_string());

                    sink.register(stream_id, responder);
                    let block = StreamHeaders::Request {
                        method: parts.method,
                        uri,
                        headers: parts.headers,
                    };
                    engine.on_headers(stream_id, block, end_stream, &mut sink);
                    if !end_stream {
                        reads.push(next_frame(stream_id, body));
                    }
                }
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "HTTP/2 connection error");
                    return Err(e);
                }
                None => break,
            },
            Some((stream_id, frame, body)) = reads.next(), if !reads.is_empty() => {
                if let Some(body) = on_frame(&mut engine, &mut sink, stream_id, frame, body) {
                    reads.push(next_frame(stream_id, body));
                }
            }
        }
    }

    // No more inbound streams; finish the ones in flight.
    loop {
        tokio::select! {
            closed = poll_fn(|cx| conn.poll_closed(cx)) => {
                tracing::trace!(
                    connection_id = %connection_id,
                    abandoned_streams = engine.pending_streams(),
                    "HTTP/2 connection closed"
                );
                return closed;
            }
            Some((stream_id, frame, body)) = reads.next(), if !reads.is_empty() => {
                if let Some(body) = on_frame(&mut engine, &mut sink, stream_id, frame, body) {
                    reads.push(next_frame(stream_id, body));
                }
            }
        }
    }
}

/// Feed one received frame to the engine. Returns the stream if more frames
/// are expected on it.
fn on_frame(
    engine: &mut StreamEngine,
    sink: &mut H2Sink,
    stream_id: u32,
    frame: Frame,
    mut body: RecvStream,
) -> Option<RecvStream> {
    match frame {
        Frame::Data(Ok(data)) => {
            let end_stream = body.is_end_stream();
            let processed = engine.on_data(stream_id, data, 0, end_stream, sink);
            if let Err(e) = body.flow_control().release_capacity(processed) {
                tracing::debug!(stream_id, error = %e, "Failed to release capacity");
            }
            (!end_stream).then_some(body)
        }
        Frame::Trailers(Ok(Some(trailers))) => {
            engine.on_headers(stream_id, StreamHeaders::Trailers(trailers), true, sink);
            None
        }
        Frame::Trailers(Ok(None)) => {
            engine.on_data(stream_id, Bytes::new(), 0, true, sink);
            None
        }
        Frame::Data(Err(e)) | Frame::Trailers(Err(e)) => {
            tracing::debug!(stream_id, error = %e, "Stream aborted");
            engine.on_stream_closed(stream_id);
            sink.forget(stream_id);
            None
        }
    }
}
