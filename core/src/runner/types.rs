use std::collections::HashMap;

/// Exit code reported when the child's own code cannot be determined
/// (spawn failure, signal termination, failed wait). Same value `exit(-1)` yields on Unix.
pub const SENTINEL_EXIT_CODE: i32 = 255;

/// How the child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal termination with a numeric status.
    Code(i32),
    /// Killed by a signal, or the status could not be collected.
    Abnormal,
}

impl ExitOutcome {
    pub fn from_status(status: std::process::ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::Code(code),
            None => Self::Abnormal,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, Self::Code(0))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Code(code) => *code,
            Self::Abnormal => SENTINEL_EXIT_CODE,
        }
    }
}

/// Whether a failing command may finish without showing its withheld output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilentFailurePolicy {
    Allow,
    Forbid,
}

impl SilentFailurePolicy {
    pub fn allows_silence(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct RunnerStartArgs {
    pub cmd: String,
    pub args: Vec<String>,
    pub envs: HashMap<String, String>,
}

impl RunnerStartArgs {
    /// Splits `argv` into program and arguments. Returns `None` for an empty command line.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (cmd, args) = argv.split_first()?;
        Some(Self {
            cmd: cmd.clone(),
            args: args.to_vec(),
            envs: HashMap::new(),
        })
    }
}

/// Per-stream counters returned by a Stream Pump after its final step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub lines: u64,
    pub bytes: u64,
    /// Number of buffer flushes that actually wrote something (at most two).
    pub flushes: u8,
    /// Whether the Flush Trigger fired and the final flush step ran.
    pub final_flush: bool,
}

#[derive(Debug, Clone)]
pub struct RunnerResult {
    pub run_id: String,
    pub outcome: ExitOutcome,
    pub exit_code: i32,
    pub phase: RunPhase,
    pub duration_ms: u64,
    /// Reports from both pumps, present only when the coordinator waited for them to drain.
    pub drained: Option<(PumpReport, PumpReport)>,
}
