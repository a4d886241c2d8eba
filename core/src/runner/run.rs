use std::time::Duration;

use crate::error::RunnerError;

use super::runtime::{self, Sinks};
use super::traits::RunnerPlugin;
use super::types::{RunPhase, RunnerResult, RunnerStartArgs, SilentFailurePolicy};

pub struct RunSessionArgs<'a> {
    pub plugin: &'a dyn RunnerPlugin,
    pub start: &'a RunnerStartArgs,
    pub quick_threshold: Duration,
    pub silent_failure: SilentFailurePolicy,
    pub run_id: &'a str,
    pub sinks: Sinks,
}

/// Starts the child exactly once and hands it to the runtime. A start failure is final.
#[tracing::instrument(
    name = "runner.run_session",
    skip_all,
    fields(run_id = %args.run_id, runner = args.plugin.name())
)]
pub async fn run_session(args: RunSessionArgs<'_>) -> Result<RunnerResult, RunnerError> {
    tracing::debug!(
        phase = ?RunPhase::NotStarted,
        cmd = %args.start.cmd,
        argc = args.start.args.len(),
        "starting child"
    );

    let session = args
        .plugin
        .start_session(args.start)
        .await
        .map_err(|e| RunnerError::Spawn(format!("{}: {e:#}", args.start.cmd)))?;

    runtime::run_session_runtime(runtime::RunSessionRuntimeInput {
        session,
        quick_threshold: args.quick_threshold,
        silent_failure: args.silent_failure,
        run_id: args.run_id,
        sinks: args.sinks,
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::{FakeSession, RecordingSink};
    use crate::runner::traits::RunnerSession;
    use crate::runner::types::ExitOutcome;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPlugin {
        starts: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RunnerPlugin for CountingPlugin {
        fn name(&self) -> &str {
            "counting"
        }

        async fn start_session(
            &self,
            _args: &RunnerStartArgs,
        ) -> anyhow::Result<Box<dyn RunnerSession>> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("No such file or directory");
            }
            Ok(Box::new(FakeSession::new(
                b"out\n",
                b"",
                Ok(ExitOutcome::Code(2)),
            )))
        }
    }

    fn start_args() -> RunnerStartArgs {
        RunnerStartArgs::from_argv(&["does-not-exist".to_string()]).unwrap()
    }

    fn sinks(out: &RecordingSink) -> Sinks {
        Sinks {
            stdout: Box::new(out.clone()),
            stderr: Box::new(RecordingSink::default()),
        }
    }

    #[tokio::test]
    async fn start_failure_is_spawn_error_without_retry() {
        let plugin = CountingPlugin {
            starts: AtomicUsize::new(0),
            fail: true,
        };
        let out = RecordingSink::default();
        let start = start_args();

        let err = run_session(RunSessionArgs {
            plugin: &plugin,
            start: &start,
            quick_threshold: Duration::from_secs(5),
            silent_failure: SilentFailurePolicy::Forbid,
            run_id: "r1",
            sinks: sinks(&out),
        })
        .await
        .unwrap_err();

        assert!(matches!(err, RunnerError::Spawn(ref m) if m.contains("does-not-exist")));
        assert_eq!(plugin.starts.load(Ordering::SeqCst), 1);
        assert!(out.writes().is_empty());
    }

    #[tokio::test]
    async fn started_child_exit_code_propagates() {
        let plugin = CountingPlugin {
            starts: AtomicUsize::new(0),
            fail: false,
        };
        let out = RecordingSink::default();
        let start = start_args();

        let res = run_session(RunSessionArgs {
            plugin: &plugin,
            start: &start,
            quick_threshold: Duration::from_secs(5),
            silent_failure: SilentFailurePolicy::Forbid,
            run_id: "r2",
            sinks: sinks(&out),
        })
        .await
        .unwrap();

        assert_eq!(res.exit_code, 2);
        assert_eq!(res.run_id, "r2");
        assert_eq!(out.contents(), b"out\n".to_vec());
    }
}
