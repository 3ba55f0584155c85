//! Cancellable timers
//!
//! A timer is a tokio task that posts an event into the dispatcher's
//! channel. Dropping the [`TimerHandle`] aborts the task, so a timer lives
//! exactly as long as whatever owns its handle.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Post `make()` every `period`, starting one period from now.
    /// Stops by itself once the receiver is gone.
    pub fn interval<E, F>(period: Duration, tx: mpsc::UnboundedSender<E>, make: F) -> Self
    where
        E: Send + 'static,
        F: Fn() -> E + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(make()).is_err() {
                    break;
                }
            }
        });
        Self { task }
    }

    /// Post `event` once after `delay`
    pub fn after<E>(delay: Duration, tx: mpsc::UnboundedSender<E>, event: E) -> Self
    where
        E: Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        });
        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
