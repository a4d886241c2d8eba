use super::child::spawn_piped;
use super::{RunnerPlugin, RunnerSession, RunnerStartArgs};
use anyhow::Result;
use async_trait::async_trait;

/// Runs the command as-is, without a terminal. Programs that check `isatty` will see pipes.
pub struct DirectRunnerPlugin {}

impl DirectRunnerPlugin {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for DirectRunnerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunnerPlugin for DirectRunnerPlugin {
    fn name(&self) -> &str {
        "direct"
    }

    async fn start_session(&self, args: &RunnerStartArgs) -> Result<Box<dyn RunnerSession>> {
        spawn_piped(&args.cmd, &args.args, args)
    }
}
