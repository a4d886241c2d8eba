mod gate;
mod io_pump;
mod run;
mod runtime;
mod state;
mod traits;
pub mod types;

#[cfg(test)]
mod testing;

pub use gate::spawn_timeout_gate;
pub use io_pump::{pump, run_pump, LineStream};
pub use run::{run_session, RunSessionArgs};
pub use runtime::{run_session_runtime, RunSessionRuntimeInput, Sinks};
pub use state::{flush_channel, BufferingState, FlushSignal, FlushTrigger, FlushWait, RunContext};
pub use traits::{RunnerPlugin, RunnerSession};
pub use types::{
    ExitOutcome, PumpReport, RunPhase, RunnerResult, RunnerStartArgs, SilentFailurePolicy,
    SENTINEL_EXIT_CODE,
};
