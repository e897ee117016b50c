use crate::client::ConnectionHandle;
use crate::round::timer::{Scheduler, TimerHandle, TimerId};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// A timer the coordinator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub id: TimerId,
    pub period: Duration,
    pub repeating: bool,
}

/// Records armed timers instead of running them, so tests fire them by hand.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pub armed: Vec<ArmedTimer>,
}

impl Scheduler for ManualScheduler {
    fn every(&mut self, id: TimerId, period: Duration) -> TimerHandle {
        self.armed.push(ArmedTimer {
            id,
            period,
            repeating: true,
        });
        TimerHandle::detached(id)
    }

    fn once(&mut self, id: TimerId, delay: Duration) -> TimerHandle {
        self.armed.push(ArmedTimer {
            id,
            period: delay,
            repeating: false,
        });
        TimerHandle::detached(id)
    }
}

pub fn test_connection() -> (ConnectionHandle, mpsc::UnboundedReceiver<Arc<str>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ConnectionHandle::new(tx), rx)
}

/// Everything queued for a connection so far, parsed.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Arc<str>>) -> Vec<Value> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        events.push(serde_json::from_str(&frame).expect("server sent invalid JSON"));
    }
    events
}

pub fn event_types(events: &[Value]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| event["type"].as_str().map(str::to_string))
        .collect()
}

pub fn count_of_type(events: &[Value], kind: &str) -> usize {
    events.iter().filter(|event| event["type"] == kind).count()
}
