use anyhow::Result;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};

use super::{ExitOutcome, RunnerSession, RunnerStartArgs};

/// Spawns `program args...` with both output streams piped and stdin closed.
pub(crate) fn spawn_piped(
    program: &str,
    args: &[String],
    start: &RunnerStartArgs,
) -> Result<Box<dyn RunnerSession>> {
    let child = Command::new(program)
        .args(args)
        .envs(&start.envs)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    tracing::debug!(program, pid = child.id(), "child spawned");
    Ok(Box::new(ChildSession { child }))
}

struct ChildSession {
    child: Child,
}

#[async_trait]
impl RunnerSession for ChildSession {
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.child
            .stdout
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Unpin + Send>)
    }

    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.child
            .stderr
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Unpin + Send>)
    }

    async fn wait(&mut self) -> Result<ExitOutcome> {
        let status = self.child.wait().await?;
        Ok(ExitOutcome::from_status(status))
    }
}
