//! Per-request stage timing.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::Stream;
use tracing::info;

/// Measures one pipeline stage and logs its duration when finished.
pub struct StageTimer {
    request_id: String,
    stage: &'static str,
    started: Instant,
}

impl StageTimer {
    pub fn start(request_id: &str, stage: &'static str) -> Self {
        Self {
            request_id: request_id.to_string(),
            stage,
            started: Instant::now(),
        }
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.started.elapsed();
        info!(
            request_id = %self.request_id,
            stage = self.stage,
            elapsed_ms = elapsed.as_millis() as u64,
            "stage complete"
        );
        elapsed
    }
}

/// Wraps the outgoing audio stream and logs streaming time and byte count
/// when the body is dropped, whether it finished or the client went away.
pub struct StreamTimer<S> {
    inner: S,
    request_id: String,
    started: Instant,
    bytes: usize,
    finished: bool,
}

impl<S> StreamTimer<S> {
    pub fn new(inner: S, request_id: &str) -> Self {
        Self {
            inner,
            request_id: request_id.to_string(),
            started: Instant::now(),
            bytes: 0,
            finished: false,
        }
    }
}

impl<S, E> Stream for StreamTimer<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.inner).poll_next(cx);
        match &polled {
            Poll::Ready(Some(Ok(chunk))) => self.bytes += chunk.len(),
            Poll::Ready(None) => self.finished = true,
            _ => {}
        }
        polled
    }
}

impl<S> Drop for StreamTimer<S> {
    fn drop(&mut self) {
        info!(
            request_id = %self.request_id,
            stage = "stream",
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            bytes = self.bytes,
            completed = self.finished,
            "audio stream closed"
        );
    }
}
