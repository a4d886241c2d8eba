use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "warn" or "quietrun_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

// The wrapper must not add noise of its own to a quiet run.
fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Commands finishing within this many milliseconds keep their output buffered.
    #[serde(default = "default_quick_threshold_ms")]
    pub quick_threshold_ms: u64,

    /// Run the command under a pseudo-terminal wrapper so it behaves as if interactive.
    #[serde(default = "default_use_pty")]
    pub use_pty: bool,

    #[serde(default = "default_pty_program")]
    pub pty_program: String,
}

fn default_quick_threshold_ms() -> u64 {
    5_000
}

fn default_use_pty() -> bool {
    true
}

fn default_pty_program() -> String {
    "script".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            quick_threshold_ms: default_quick_threshold_ms(),
            use_pty: default_use_pty(),
            pty_program: default_pty_program(),
        }
    }
}

impl RunnerConfig {
    pub fn quick_threshold(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.quick_threshold_ms)
    }
}
