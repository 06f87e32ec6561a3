//! Cancellable repeating task.
//!
//! Runs are awaited one after another on a single task, so a slow run delays the
//! next tick instead of overlapping it. Ticks missed while a run was in flight
//! are skipped rather than fired in a burst.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;

/// Owner of a running poll loop. Dropping it stops the loop once any run in
/// flight completes.
#[derive(Debug)]
pub struct PollHandle {
    alive: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn stop(&self) {
        // The loop may already have exited; nothing to signal then.
        let _ = self.alive.send(false);
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stop the loop and wait for it to wind down.
    pub async fn join(mut self) -> Result<(), JoinError> {
        self.stop();
        match self.task.take() {
            Some(task) => task.await,
            None => Ok(()),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Call `f` immediately and then once per `period` until the handle is
/// stopped or dropped.
pub fn spawn_interval<S, T, F>(state: S, period: Duration, f: T) -> PollHandle
where
    T: Fn(&S) -> F + Send + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
    S: Send + Sync + 'static,
{
    let (alive_tx, mut alive) = watch::channel(true);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while *alive.borrow_and_update() {
            tokio::select! {
                biased;
                _ = alive.changed() => break,
                _ = interval.tick() => f(&state).await,
            }
        }
        tracing::debug!("Poll loop stopped");
    });

    PollHandle {
        alive: alive_tx,
        task: Some(task),
    }
}
