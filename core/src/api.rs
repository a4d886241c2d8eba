//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `quietrun_core::api` instead of reaching into internal modules.

pub use crate::config::{load_default, AppConfig, LoggingConfig, RunnerConfig};
pub use crate::error::{CliError, RunnerError};
pub use crate::runner::{
    run_session, ExitOutcome, PumpReport, RunPhase, RunSessionArgs, RunnerPlugin, RunnerResult,
    RunnerSession, RunnerStartArgs, SilentFailurePolicy, Sinks, SENTINEL_EXIT_CODE,
};
