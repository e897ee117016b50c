use super::{
    broadcaster::Broadcaster, coordinator::RoundCoordinator, registry::ConnectionRegistry,
    router::MessageRouter, timer::Scheduler,
};
use crate::config::RoundTiming;
use crate::messages::{CoordinatorMessage, HealthStatus, ServerToClient};
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Everything shared between clients: who is connected and the round they
/// are playing. Only the hub task touches it.
pub struct Hub<S> {
    registry: ConnectionRegistry,
    round: RoundCoordinator<S>,
    shut_down: bool,
}

impl<S: Scheduler> Hub<S> {
    pub fn new(scheduler: S, timing: RoundTiming) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            round: RoundCoordinator::new(scheduler, timing),
            shut_down: false,
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn round(&self) -> &RoundCoordinator<S> {
        &self.round
    }

    pub fn handle(&mut self, msg: CoordinatorMessage) -> ControlFlow<()> {
        match msg {
            CoordinatorMessage::Connected { connection } => {
                debug!("Tracking connection {}", connection.id());
                self.registry.connect(connection);
            }
            CoordinatorMessage::ClientAction {
                connection_id,
                action,
            } => {
                MessageRouter::route(&mut self.registry, &mut self.round, connection_id, action);
            }
            CoordinatorMessage::Disconnected { connection_id } => {
                MessageRouter::handle_disconnect(&mut self.registry, connection_id);
            }
            CoordinatorMessage::TimerFired { timer } => {
                let broadcaster = Broadcaster::new(&self.registry);
                self.round
                    .on_timer(timer, self.registry.count(), &broadcaster);
            }
            CoordinatorMessage::Health { reply_tx } => {
                let _ = reply_tx.send(HealthStatus::ok(self.registry.count()));
            }
            CoordinatorMessage::Shutdown { done_tx } => {
                self.shutdown();
                let _ = done_tx.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Tells every joined client the server is going away, stops the round
    /// and closes every connection. Only the first call does anything.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        let notified =
            Broadcaster::new(&self.registry).broadcast(ServerToClient::ServerShutdown {});
        self.round.shutdown();
        let closed = self.registry.close_all();

        info!(
            "Hub shut down: notified {} clients, closed {} connections",
            notified, closed
        );
    }
}

/// The round hub: one task, one queue, every state change in order.
pub async fn hub_task<S: Scheduler>(
    mut hub: Hub<S>,
    mut rx: mpsc::UnboundedReceiver<CoordinatorMessage>,
) {
    info!("Round hub started");

    while let Some(msg) = rx.recv().await {
        if hub.handle(msg).is_break() {
            break;
        }
    }

    // Fallback only: the scheduler keeps a sender alive, so a Shutdown normally ends the loop
    hub.shutdown();

    debug!("Round hub task ended");
}
