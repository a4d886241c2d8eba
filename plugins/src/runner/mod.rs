pub mod direct;
pub mod pty;

mod child;

pub use quietrun_core::runner::{ExitOutcome, RunnerPlugin, RunnerSession, RunnerStartArgs};
