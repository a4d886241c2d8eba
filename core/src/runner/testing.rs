//! Test doubles for pump and runtime tests.
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use super::state::BufferingState;
use super::traits::RunnerSession;
use super::types::ExitOutcome;

/// Records every individual write so tests can tell a contiguous flush from per-line writes.
#[derive(Clone, Default)]
pub struct RecordingSink {
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingSink {
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap().clone()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.writes().concat()
    }
}

impl AsyncWrite for RecordingSink {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.writes.lock().unwrap().push(buf.to_vec());
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Serves one line per read and disables buffering right before serving line `flip_at`.
pub struct FlippingReader {
    lines: VecDeque<Vec<u8>>,
    served: usize,
    flip_at: usize,
    buffering: Arc<BufferingState>,
}

impl FlippingReader {
    pub fn new(lines: Vec<Vec<u8>>, flip_at: usize, buffering: Arc<BufferingState>) -> Self {
        Self {
            lines: lines.into(),
            served: 0,
            flip_at,
            buffering,
        }
    }
}

impl AsyncRead for FlippingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        let Some(mut line) = this.lines.pop_front() else {
            return Poll::Ready(Ok(()));
        };
        if this.served == this.flip_at {
            this.buffering.disable();
        }
        let n = line.len().min(buf.remaining());
        buf.put_slice(&line[..n]);
        if n < line.len() {
            // Rest of a line larger than the caller's buffer; not a new line.
            this.lines.push_front(line.split_off(n));
        } else {
            this.served += 1;
        }
        Poll::Ready(Ok(()))
    }
}

type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;

/// In-memory child: scripted streams and a scripted exit.
pub struct FakeSession {
    stdout: Option<BoxedReader>,
    stderr: Option<BoxedReader>,
    outcome: Option<anyhow::Result<ExitOutcome>>,
    exit_after: Duration,
}

impl FakeSession {
    pub fn new(stdout: &[u8], stderr: &[u8], outcome: anyhow::Result<ExitOutcome>) -> Self {
        Self::from_readers(
            io::Cursor::new(stdout.to_vec()),
            io::Cursor::new(stderr.to_vec()),
            outcome,
        )
    }

    pub fn from_readers<O, E>(stdout: O, stderr: E, outcome: anyhow::Result<ExitOutcome>) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        Self {
            stdout: Some(Box::new(stdout)),
            stderr: Some(Box::new(stderr)),
            outcome: Some(outcome),
            exit_after: Duration::ZERO,
        }
    }

    pub fn exit_after(mut self, delay: Duration) -> Self {
        self.exit_after = delay;
        self
    }

    pub fn without_stderr(mut self) -> Self {
        self.stderr = None;
        self
    }
}

#[async_trait]
impl RunnerSession for FakeSession {
    fn stdout(&mut self) -> Option<BoxedReader> {
        self.stdout.take()
    }

    fn stderr(&mut self) -> Option<BoxedReader> {
        self.stderr.take()
    }

    async fn wait(&mut self) -> anyhow::Result<ExitOutcome> {
        tokio::time::sleep(self.exit_after).await;
        self.outcome
            .take()
            .unwrap_or_else(|| Err(anyhow::anyhow!("already waited")))
    }
}
