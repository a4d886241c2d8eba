use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::state::BufferingState;

/// Disables buffering once `threshold` has elapsed. Never cancelled by the runner; a
/// transition after the child has exited is harmless since nothing reads the flag anymore.
pub fn spawn_timeout_gate(buffering: Arc<BufferingState>, threshold: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(threshold).await;
        if buffering.disable() {
            tracing::debug!(
                threshold_ms = threshold.as_millis() as u64,
                "quick-command threshold reached, buffering disabled"
            );
        }
    })
}
