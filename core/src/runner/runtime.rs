//! Runner runtime: wires the child's streams into the pumps, starts the timeout gate,
//! waits for the child and decides whether withheld output is released or dropped.
use std::time::{Duration, Instant};

use tokio::io::AsyncWrite;

use crate::error::RunnerError;

use super::gate;
use super::io_pump::{self, LineStream};
use super::state::RunContext;
use super::traits::RunnerSession;
use super::types::{ExitOutcome, PumpReport, RunPhase, RunnerResult, SilentFailurePolicy};

type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// Destinations for the two captured streams.
pub struct Sinks {
    pub stdout: BoxedWriter,
    pub stderr: BoxedWriter,
}

impl Sinks {
    pub fn stdio() -> Self {
        Self {
            stdout: Box::new(tokio::io::stdout()),
            stderr: Box::new(tokio::io::stderr()),
        }
    }
}

pub struct RunSessionRuntimeInput<'a> {
    pub session: Box<dyn RunnerSession>,
    pub quick_threshold: Duration,
    pub silent_failure: SilentFailurePolicy,
    pub run_id: &'a str,
    pub sinks: Sinks,
}

pub async fn run_session_runtime(
    input: RunSessionRuntimeInput<'_>,
) -> Result<RunnerResult, RunnerError> {
    let RunSessionRuntimeInput {
        mut session,
        quick_threshold,
        silent_failure,
        run_id,
        sinks,
    } = input;

    let stdout = session
        .stdout()
        .ok_or_else(|| RunnerError::Spawn("no stdout".into()))?;
    let stderr = session
        .stderr()
        .ok_or_else(|| RunnerError::Spawn("no stderr".into()))?;

    let started_at = Instant::now();
    let (ctx, trigger) = RunContext::new();
    let buffering = ctx.buffering.clone();

    // Detached on purpose: the gate runs to completion on its own.
    drop(gate::spawn_timeout_gate(ctx.buffering.clone(), quick_threshold));
    let out_task = io_pump::pump(stdout, sinks.stdout, LineStream::Stdout, ctx.clone());
    let err_task = io_pump::pump(stderr, sinks.stderr, LineStream::Stderr, ctx);

    tracing::debug!(phase = ?RunPhase::Running, "child running");

    let outcome = match session.wait().await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "could not collect child exit status");
            ExitOutcome::Abnormal
        }
    };

    let phase = if outcome.success() {
        RunPhase::Succeeded
    } else {
        RunPhase::Failed
    };

    let drained = if phase == RunPhase::Failed && !silent_failure.allows_silence() {
        // Failure output is diagnostic: release everything and wait until it is written.
        trigger.fire();
        let (out, err) = tokio::join!(out_task, err_task);
        Some((join_report(out, "stdout"), join_report(err, "stderr")))
    } else if !buffering.is_enabled() {
        // Past the threshold the pumps are live: let them read to EOF so the tail is
        // shown. A buffer that never got released is still dropped on abandon.
        trigger.abandon();
        let (out, err) = tokio::join!(out_task, err_task);
        Some((join_report(out, "stdout"), join_report(err, "stderr")))
    } else {
        // Silent success must be silent; whatever is still withheld is dropped.
        trigger.abandon();
        out_task.abort();
        err_task.abort();
        None
    };

    let duration_ms = started_at.elapsed().as_millis() as u64;
    let exit_code = outcome.exit_code();

    tracing::debug!(
        run_id = %run_id,
        phase = ?phase,
        exit_code = exit_code,
        duration_ms = duration_ms,
        drained = drained.is_some(),
        "run finished"
    );

    Ok(RunnerResult {
        run_id: run_id.to_string(),
        outcome,
        exit_code,
        phase,
        duration_ms,
        drained,
    })
}

fn join_report(
    res: Result<PumpReport, tokio::task::JoinError>,
    stream: &'static str,
) -> PumpReport {
    res.unwrap_or_else(|e| {
        tracing::warn!(stream, error = %e, "pump task did not complete");
        PumpReport::default()
    })
}
