use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;

use crate::error::RunnerError;

use super::state::{BufferingState, FlushWait, RunContext};
use super::types::PumpReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStream {
    Stdout,
    Stderr,
}

impl LineStream {
    pub fn label(&self) -> &'static str {
        match self {
            LineStream::Stdout => "stdout",
            LineStream::Stderr => "stderr",
        }
    }
}

pub fn pump<R, W>(rd: R, wr: W, stream: LineStream, ctx: RunContext) -> JoinHandle<PumpReport>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(run_pump(rd, wr, stream, ctx))
}

/// Reads `rd` line by line, withholding lines while buffering is enabled and passing
/// them straight to `wr` afterwards. Once `rd` is exhausted, waits for the final-flush
/// decision: a fired trigger releases anything still withheld, an abandoned one drops it.
pub async fn run_pump<R, W>(rd: R, wr: W, stream: LineStream, ctx: RunContext) -> PumpReport
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let RunContext {
        buffering,
        mut flush,
    } = ctx;
    let mut out = GatedSink::new(wr, stream, buffering);
    let mut reader = BufReader::new(rd);
    let mut line: Vec<u8> = Vec::with_capacity(8 * 1024);

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                normalize_line(&mut line);
                out.accept(&line).await;
            }
            Err(e) => {
                // Best-effort capture: a broken source is just the end of it.
                if !line.is_empty() {
                    normalize_line(&mut line);
                    out.accept(&line).await;
                }
                let err = RunnerError::StreamIo {
                    stream: stream.label(),
                    source: e,
                };
                tracing::debug!(error = %err, "source stream ended with read error");
                break;
            }
        }
    }

    match flush.wait().await {
        FlushWait::Fired => out.final_flush().await,
        FlushWait::Abandoned => {
            tracing::debug!(
                stream = stream.label(),
                withheld_bytes = out.withheld(),
                "final flush abandoned"
            );
        }
    }

    out.into_report()
}

/// Owns one stream's private buffer and its destination.
struct GatedSink<W> {
    sink: W,
    stream: LineStream,
    buffering: Arc<BufferingState>,
    still_buffering: bool,
    buffer: Vec<u8>,
    report: PumpReport,
}

impl<W> GatedSink<W>
where
    W: AsyncWrite + Unpin,
{
    fn new(sink: W, stream: LineStream, buffering: Arc<BufferingState>) -> Self {
        Self {
            sink,
            stream,
            buffering,
            still_buffering: true,
            buffer: Vec::new(),
            report: PumpReport::default(),
        }
    }

    async fn accept(&mut self, line: &[u8]) {
        self.report.lines += 1;
        self.report.bytes += line.len() as u64;

        // Latched: once this stream goes live it never looks at the shared flag again.
        if self.still_buffering && !self.buffering.is_enabled() {
            self.still_buffering = false;
            tracing::debug!(
                stream = self.stream.label(),
                bytes = self.buffer.len(),
                "buffering disabled, releasing withheld output"
            );
            self.flush_buffer().await;
        }

        if self.still_buffering {
            self.buffer.extend_from_slice(line);
        } else {
            self.write(line).await;
        }
    }

    async fn final_flush(&mut self) {
        self.report.final_flush = true;
        tracing::debug!(
            stream = self.stream.label(),
            bytes = self.buffer.len(),
            "final flush"
        );
        self.flush_buffer().await;
    }

    async fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.buffer);
        self.write(&data).await;
        self.report.flushes += 1;
    }

    async fn write(&mut self, data: &[u8]) {
        let res = match self.sink.write_all(data).await {
            Ok(()) => self.sink.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = res {
            tracing::debug!(stream = self.stream.label(), error = %e, "destination write failed");
        }
    }

    fn withheld(&self) -> usize {
        self.buffer.len()
    }

    fn into_report(self) -> PumpReport {
        self.report
    }
}

/// Every emitted unit ends in exactly one `\n`; a `\r` before it is dropped.
fn normalize_line(buf: &mut Vec<u8>) {
    trim_newline(buf);
    buf.push(b'\n');
}

fn trim_newline(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}
