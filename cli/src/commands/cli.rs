use clap::{ArgGroup, Parser};
use quietrun_core::runner::SilentFailurePolicy;

/// Run a command, hiding its output unless it runs long or fails.
#[derive(Parser, Debug)]
#[command(name = "quietrun", version)]
#[command(group(
    ArgGroup::new("silent_failure")
        .required(true)
        .args(["allow_silent_failure", "no_allow_silent_failure"]),
))]
pub struct Args {
    /// A failing quick command exits without showing its output.
    #[arg(long)]
    pub allow_silent_failure: bool,

    /// A failing command always shows everything it printed before exiting.
    #[arg(long)]
    pub no_allow_silent_failure: bool,

    /// Command to run, followed by its arguments.
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

impl Args {
    pub fn silent_failure(&self) -> SilentFailurePolicy {
        if self.allow_silent_failure {
            SilentFailurePolicy::Allow
        } else {
            SilentFailurePolicy::Forbid
        }
    }
}
