use super::registry::ConnectionRegistry;
use crate::client::{ConnectionHandle, ConnectionId};
use crate::messages::ServerToClient;
use std::sync::Arc;
use tracing::trace;

/// Who receives an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every joined client
    All,
    /// Every joined client except the one that caused the event
    AllExcept(ConnectionId),
    /// A single connection, joined or not
    Only(ConnectionId),
}

pub struct Broadcaster<'a> {
    registry: &'a ConnectionRegistry,
}

impl<'a> Broadcaster<'a> {
    pub fn new(registry: &'a ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Serializes `event` once and queues it for every ready target.
    /// Returns how many connections accepted it.
    pub fn send(&self, event: ServerToClient, audience: Audience) -> usize {
        let frame: Arc<str> = Arc::from(event.to_json());
        match audience {
            Audience::All => Self::deliver_all(self.registry.all(), &frame),
            Audience::AllExcept(except) => {
                Self::deliver_all(self.registry.all_except(except), &frame)
            }
            Audience::Only(target) => Self::deliver_all(self.registry.get(target), &frame),
        }
    }

    fn deliver_all<'h>(
        targets: impl IntoIterator<Item = &'h ConnectionHandle>,
        frame: &Arc<str>,
    ) -> usize {
        let mut delivered = 0;
        for handle in targets {
            if !handle.is_ready() {
                trace!("Skipping connection {}, not ready", handle.id());
                continue;
            }
            if handle.deliver(Arc::clone(frame)) {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn broadcast(&self, event: ServerToClient) -> usize {
        self.send(event, Audience::All)
    }

    pub fn broadcast_except(&self, except: ConnectionId, event: ServerToClient) -> usize {
        self.send(event, Audience::AllExcept(except))
    }

    pub fn send_to(&self, target: ConnectionId, event: ServerToClient) -> usize {
        self.send(event, Audience::Only(target))
    }
}
