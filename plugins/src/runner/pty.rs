use super::child::spawn_piped;
use super::{RunnerPlugin, RunnerSession, RunnerStartArgs};
use anyhow::Result;
use async_trait::async_trait;

/// Command-line dialect of the `script` utility on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFlavor {
    /// `script -q /dev/null cmd args...` (macOS, FreeBSD).
    Bsd,
    /// `script -q -e -c "cmd args..." /dev/null` (util-linux).
    ///
    /// A child killed by signal N comes back as a normal exit with `128+N`.
    UtilLinux,
}

impl ScriptFlavor {
    pub fn host() -> Self {
        if cfg!(target_os = "linux") {
            ScriptFlavor::UtilLinux
        } else {
            ScriptFlavor::Bsd
        }
    }
}

/// Runs the command under `script` so it believes it is attached to a terminal.
/// Tools like docker builds only emit their nicer progress output in that case.
pub struct PtyRunnerPlugin {
    program: String,
    flavor: ScriptFlavor,
}

impl PtyRunnerPlugin {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_flavor(program, ScriptFlavor::host())
    }

    pub fn with_flavor(program: impl Into<String>, flavor: ScriptFlavor) -> Self {
        Self {
            program: program.into(),
            flavor,
        }
    }

    /// Arguments passed to the wrapper program for the given command.
    pub fn wrapper_args(&self, args: &RunnerStartArgs) -> Vec<String> {
        match self.flavor {
            ScriptFlavor::Bsd => {
                let mut out = vec!["-q".to_string(), "/dev/null".to_string()];
                out.push(args.cmd.clone());
                out.extend(args.args.iter().cloned());
                out
            }
            ScriptFlavor::UtilLinux => {
                let command_line = shell_words::join(
                    std::iter::once(args.cmd.as_str()).chain(args.args.iter().map(String::as_str)),
                );
                vec![
                    "-q".to_string(),
                    "-e".to_string(),
                    "-c".to_string(),
                    command_line,
                    "/dev/null".to_string(),
                ]
            }
        }
    }
}

#[async_trait]
impl RunnerPlugin for PtyRunnerPlugin {
    fn name(&self) -> &str {
        "pty"
    }

    async fn start_session(&self, args: &RunnerStartArgs) -> Result<Box<dyn RunnerSession>> {
        let wrapper_args = self.wrapper_args(args);
        tracing::debug!(program = %self.program, flavor = ?self.flavor, "wrapping command in pty");
        spawn_piped(&self.program, &wrapper_args, args)
            .map_err(|e| e.context(format!("failed to start pty wrapper `{}`", self.program)))
    }
}
