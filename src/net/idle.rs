//! Idle connection detection.
//!
//! # Responsibilities
//! - Record the instant of the last successful read and write on a socket
//! - Resolve a watchdog future when a reader, writer, or all-idle timeout elapses
//!
//! # Design Decisions
//! - Activity is stored as milliseconds since the wrapper was created, in atomics,
//!   so the watchdog can observe it from a different task without locks
//! - The watchdog sleeps until the earliest possible deadline instead of ticking

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::Instant;

use crate::config::TimeoutConfig;

/// Which idle timeout fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleKind {
    Reader,
    Writer,
    All,
}

impl fmt::Display for IdleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdleKind::Reader => f.write_str("reader"),
            IdleKind::Writer => f.write_str("writer"),
            IdleKind::All => f.write_str("all"),
        }
    }
}

/// Idle timeouts for one connection; `None` disables a check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleTimeouts {
    pub reader: Option<Duration>,
    pub writer: Option<Duration>,
    pub all: Option<Duration>,
}

impl IdleTimeouts {
    pub fn is_disabled(&self) -> bool {
        self.reader.is_none() && self.writer.is_none() && self.all.is_none()
    }
}

impl From<&TimeoutConfig> for IdleTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));
        Self {
            reader: secs(config.reader_idle_secs),
            writer: secs(config.writer_idle_secs),
            all: secs(config.all_idle_secs),
        }
    }
}

/// Shared record of socket activity.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    inner: Arc<Activity>,
}

#[derive(Debug)]
struct Activity {
    origin: Instant,
    last_read_ms: AtomicU64,
    last_write_ms: AtomicU64,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Activity {
                origin: Instant::now(),
                last_read_ms: AtomicU64::new(0),
                last_write_ms: AtomicU64::new(0),
            }),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.inner.origin.elapsed().as_millis() as u64
    }

    fn record_read(&self) {
        self.inner
            .last_read_ms
            .store(self.elapsed_ms(), Ordering::Relaxed);
    }

    fn record_write(&self) {
        self.inner
            .last_write_ms
            .store(self.elapsed_ms(), Ordering::Relaxed);
    }

    pub fn last_read(&self) -> Instant {
        self.inner.origin + Duration::from_millis(self.inner.last_read_ms.load(Ordering::Relaxed))
    }

    pub fn last_write(&self) -> Instant {
        self.inner.origin + Duration::from_millis(self.inner.last_write_ms.load(Ordering::Relaxed))
    }

    /// Resolves once any enabled timeout has elapsed without matching activity.
    /// Never resolves if every timeout is disabled.
    pub async fn watchdog(self, timeouts: IdleTimeouts) -> IdleKind {
        if timeouts.is_disabled() {
            return std::future::pending().await;
        }

        loop {
            let last_read = self.last_read();
            let last_write = self.last_write();
            let checks = [
                (IdleKind::Reader, timeouts.reader, last_read),
                (IdleKind::Writer, timeouts.writer, last_write),
                (IdleKind::All, timeouts.all, last_read.max(last_write)),
            ];

            let now = Instant::now();
            let mut next_deadline: Option<Instant> = None;
            for (kind, timeout, last) in checks {
                let Some(timeout) = timeout else { continue };
                let deadline = last + timeout;
                if now >= deadline {
                    return kind;
                }
                next_deadline = Some(next_deadline.map_or(deadline, |d| d.min(deadline)));
            }

            if let Some(deadline) = next_deadline {
                tokio::time::sleep_until(deadline).await;
            }
        }
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream wrapper that reports reads and writes to an [`ActivityTracker`].
#[derive(Debug)]
pub struct IdleStream<S> {
    inner: S,
    activity: ActivityTracker,
}

impl<S> IdleStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            activity: ActivityTracker::new(),
        }
    }

    pub fn activity(&self) -> ActivityTracker {
        self.activity.clone()
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for IdleStream<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            if buf.filled().len() > before {
                self.activity.record_read();
            }
        }
        poll
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for IdleStream<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let poll = Pin::new(&mut self.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = poll {
            if n > 0 {
                self.activity.record_write();
            }
        }
        poll
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let poll = Pin::new(&mut self.inner).poll_write_vectored(cx, bufs);
        if let Poll::Ready(Ok(n)) = poll {
            if n > 0 {
                self.activity.record_write();
            }
        }
        poll
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
