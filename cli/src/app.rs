//! CLI assembly: turns parsed arguments and config into one wrapped-command run.
use quietrun_core::api::{
    run_session, AppConfig, RunSessionArgs, RunnerError, RunnerStartArgs, Sinks,
};

use crate::commands::cli::Args;

/// Runs the wrapped command once and returns the exit code to terminate with.
#[tracing::instrument(name = "cli.run_app", skip_all)]
pub async fn run_app(args: Args, cfg: &AppConfig) -> Result<i32, RunnerError> {
    let start = RunnerStartArgs::from_argv(&args.command)
        .ok_or_else(|| RunnerError::Config("no command given".to_string()))?;

    let plugin = quietrun_plugins::factory::build_runner(cfg);
    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::debug!(
        run_id = %run_id,
        runner = plugin.name(),
        quick_threshold_ms = cfg.runner.quick_threshold_ms,
        silent_failure = ?args.silent_failure(),
        "run initialized"
    );

    let result = run_session(RunSessionArgs {
        plugin: plugin.as_ref(),
        start: &start,
        quick_threshold: cfg.runner.quick_threshold(),
        silent_failure: args.silent_failure(),
        run_id: &run_id,
        sinks: Sinks::stdio(),
    })
    .await?;

    Ok(result.exit_code)
}
