use quietrun_core::config::{AppConfig, RunnerConfig};
use quietrun_core::runner::RunnerPlugin;

use crate::runner::direct::DirectRunnerPlugin;
use crate::runner::pty::PtyRunnerPlugin;

pub fn build_runner(cfg: &AppConfig) -> Box<dyn RunnerPlugin> {
    build_runner_from(&cfg.runner)
}

pub fn build_runner_from(cfg: &RunnerConfig) -> Box<dyn RunnerPlugin> {
    if cfg.use_pty {
        Box::new(PtyRunnerPlugin::new(cfg.pty_program.clone()))
    } else {
        Box::new(DirectRunnerPlugin::new())
    }
}
