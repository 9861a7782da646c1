//! Arms a countdown on `turn_started` that, left unanswered, asks the
//! coordinator to synthesize an `end_turn` for the current unit.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A single outstanding delayed message, cancellable by dropping or
/// re-arming it. Used for both the per-turn clock and the reconnect grace
/// window — the only difference is what message fires and how long the
/// delay is.
#[derive(Default)]
pub struct DelayedTrigger {
    handle: Option<JoinHandle<()>>,
}

impl DelayedTrigger {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Cancels any previously armed delay for this trigger.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Arms a new delay, replacing any prior one. A zero duration disables
    /// the timer outright (used for an unlimited turn timer).
    pub fn arm<T>(&mut self, duration: Duration, mailbox: mpsc::Sender<T>, message: T)
    where
        T: Send + 'static,
    {
        self.cancel();
        if duration.is_zero() {
            return;
        }
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = mailbox.send(message).await;
        }));
    }
}

impl Drop for DelayedTrigger {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_the_duration_elapses() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut trigger = DelayedTrigger::new();
        trigger.arm(Duration::from_secs(5), tx, "fired");

        tokio::time::advance(Duration::from_secs(5) + Duration::from_millis(1)).await;
        assert_eq!(rx.recv().await, Some("fired"));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_the_previous_delay() {
        let (tx, mut rx) = mpsc::channel(2);
        let mut trigger = DelayedTrigger::new();
        trigger.arm(Duration::from_secs(5), tx.clone(), "first");
        trigger.arm(Duration::from_secs(5), tx, "second");

        tokio::time::advance(Duration::from_secs(5) + Duration::from_millis(1)).await;
        assert_eq!(rx.recv().await, Some("second"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn zero_duration_disables_the_timer() {
        let (tx, mut rx) = mpsc::channel::<&str>(1);
        let mut trigger = DelayedTrigger::new();
        trigger.arm(Duration::ZERO, tx, "never");
        assert!(rx.try_recv().is_err());
    }
}
