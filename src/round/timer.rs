use crate::messages::CoordinatorMessage;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Tags every firing so the hub can tell a live timer from a stale one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// An armed timer. Cancelling takes effect at most once; cancelling a timer
/// that already fired, or cancelling twice, does nothing. Dropping the handle
/// cancels it.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    pub fn new(id: TimerId, abort: AbortHandle) -> Self {
        Self {
            id,
            abort: Some(abort),
        }
    }

    /// A handle with no task behind it; firings are delivered by hand.
    #[cfg(test)]
    pub fn detached(id: TimerId) -> Self {
        Self { id, abort: None }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn cancel(&mut self) -> bool {
        match self.abort.take() {
            Some(abort) => {
                abort.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Arms timers on behalf of the round coordinator.
pub trait Scheduler {
    /// Fires `id` every `period`, first after one full period.
    fn every(&mut self, id: TimerId, period: Duration) -> TimerHandle;

    /// Fires `id` once after `delay`.
    fn once(&mut self, id: TimerId, delay: Duration) -> TimerHandle;
}

/// Runs timers as tokio tasks that post `TimerFired` back into the hub.
pub struct TokioScheduler {
    hub_tx: mpsc::UnboundedSender<CoordinatorMessage>,
}

impl TokioScheduler {
    pub fn new(hub_tx: mpsc::UnboundedSender<CoordinatorMessage>) -> Self {
        Self { hub_tx }
    }
}

impl Scheduler for TokioScheduler {
    fn every(&mut self, id: TimerId, period: Duration) -> TimerHandle {
        let hub_tx = self.hub_tx.clone();
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if hub_tx
                    .send(CoordinatorMessage::TimerFired { timer: id })
                    .is_err()
                {
                    break;
                }
            }
        });
        TimerHandle::new(id, task.abort_handle())
    }

    fn once(&mut self, id: TimerId, delay: Duration) -> TimerHandle {
        let hub_tx = self.hub_tx.clone();
        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = hub_tx.send(CoordinatorMessage::TimerFired { timer: id });
        });
        TimerHandle::new(id, task.abort_handle())
    }
}
