//! Shared state for one wrapped-command run: the buffering flag and the flush trigger.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

/// One-way `enabled -> disabled` flag. Written by the Timeout Gate, read by the pumps.
#[derive(Debug)]
pub struct BufferingState {
    enabled: AtomicBool,
}

impl BufferingState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            enabled: AtomicBool::new(true),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Returns true only for the call that performed the transition.
    pub fn disable(&self) -> bool {
        self.enabled.swap(false, Ordering::AcqRel)
    }
}

pub fn flush_channel() -> (FlushTrigger, FlushSignal) {
    let (tx, rx) = watch::channel(false);
    (FlushTrigger { tx }, FlushSignal { rx })
}

/// Writer side of the final-flush broadcast. Owned by the coordinator.
#[derive(Debug)]
pub struct FlushTrigger {
    tx: watch::Sender<bool>,
}

impl FlushTrigger {
    /// `pending -> fired`. Repeated calls are no-ops.
    pub fn fire(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Gives up on the final flush: waiters that have not seen `fired` resolve to
    /// [`FlushWait::Abandoned`] and discard what they hold.
    pub fn abandon(self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushWait {
    Fired,
    Abandoned,
}

/// Reader side of the final-flush broadcast. One clone per pump.
#[derive(Debug, Clone)]
pub struct FlushSignal {
    rx: watch::Receiver<bool>,
}

impl FlushSignal {
    pub async fn wait(&mut self) -> FlushWait {
        match self.rx.wait_for(|fired| *fired).await {
            Ok(_) => FlushWait::Fired,
            Err(_) => FlushWait::Abandoned,
        }
    }
}

/// Everything the gate and the pumps share, passed explicitly instead of via globals.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub buffering: Arc<BufferingState>,
    pub flush: FlushSignal,
}

impl RunContext {
    pub fn new() -> (Self, FlushTrigger) {
        let (trigger, flush) = flush_channel();
        let ctx = Self {
            buffering: BufferingState::new(),
            flush,
        };
        (ctx, trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffering_only_transitions_once() {
        let state = BufferingState::new();
        assert!(state.is_enabled());
        assert!(state.disable());
        assert!(!state.is_enabled());
        assert!(!state.disable());
        assert!(!state.is_enabled());
    }

    #[tokio::test]
    async fn fire_releases_every_waiter() {
        let (trigger, signal) = flush_channel();
        let mut a = signal.clone();
        let mut b = signal;

        let wa = tokio::spawn(async move { a.wait().await });
        let wb = tokio::spawn(async move { b.wait().await });

        trigger.fire();
        trigger.fire();
        assert!(trigger.is_fired());

        assert_eq!(wa.await.unwrap(), FlushWait::Fired);
        assert_eq!(wb.await.unwrap(), FlushWait::Fired);
    }

    #[tokio::test]
    async fn fired_is_still_observed_after_trigger_dropped() {
        let (trigger, mut signal) = flush_channel();
        trigger.fire();
        drop(trigger);
        assert_eq!(signal.wait().await, FlushWait::Fired);
    }

    #[tokio::test]
    async fn abandon_releases_waiters_without_firing() {
        let (trigger, mut signal) = flush_channel();
        let waiter = tokio::spawn(async move { signal.wait().await });
        trigger.abandon();
        assert_eq!(waiter.await.unwrap(), FlushWait::Abandoned);
    }
}
