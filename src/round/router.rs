use super::{
    broadcaster::Broadcaster, coordinator::RoundCoordinator, registry::ConnectionRegistry,
    timer::Scheduler,
};
use crate::client::ConnectionId;
use crate::messages::{ClientToServer, ServerToClient};
use tracing::{debug, info, warn};

// Single entry point for client-originated traffic
pub struct MessageRouter;

impl MessageRouter {
    pub fn route<S: Scheduler>(
        registry: &mut ConnectionRegistry,
        round: &mut RoundCoordinator<S>,
        connection_id: ConnectionId,
        action: ClientToServer,
    ) {
        match action {
            ClientToServer::Join { user_id, username } => {
                Self::handle_join(registry, round, connection_id, user_id, username);
            }
            ClientToServer::Bet {
                user_id,
                username,
                letter,
                bet_amount,
                balance,
            } => {
                debug!("User {} bet {} on {}", user_id, bet_amount, letter);
                Broadcaster::new(registry).broadcast_except(
                    connection_id,
                    ServerToClient::Bet {
                        user_id,
                        username,
                        letter,
                        bet_amount,
                        balance,
                    },
                );
            }
            ClientToServer::Message {
                user_id,
                username,
                message,
            } => {
                debug!("User {} sent a chat message", user_id);
                Broadcaster::new(registry).broadcast_except(
                    connection_id,
                    ServerToClient::Message {
                        user_id,
                        username,
                        message,
                    },
                );
            }
            ClientToServer::RoundStart {} | ClientToServer::RoundEnd {} => {
                debug!(
                    "Ignoring client-sent {} from {}, rounds are server-driven",
                    action.kind(),
                    connection_id
                );
            }
            ClientToServer::Unknown => {
                debug!("Ignoring message of unknown type from {}", connection_id);
            }
        }
    }

    fn handle_join<S: Scheduler>(
        registry: &mut ConnectionRegistry,
        round: &mut RoundCoordinator<S>,
        connection_id: ConnectionId,
        user_id: String,
        username: String,
    ) {
        let registration = registry.register(user_id.clone(), username.clone(), connection_id);
        if let Some(previous) = registration.displaced {
            if previous.connection != connection_id {
                warn!(
                    "User {} joined again from {}, replacing connection {}",
                    user_id, connection_id, previous.connection
                );
            }
        }

        info!("User joined: {} ({})", username, user_id);

        let broadcaster = Broadcaster::new(registry);
        if let Some(released) = registration.released {
            info!(
                "Connection {} switched from {} to {}",
                connection_id, released.user_id, user_id
            );
            broadcaster.broadcast_except(
                connection_id,
                ServerToClient::user_left(released.user_id, released.username),
            );
        }
        broadcaster.broadcast_except(
            connection_id,
            ServerToClient::user_joined(user_id, username),
        );

        // Start first so the snapshot already shows the round the joiner kicked off
        round.start_if_idle(registry.count(), &broadcaster);
        broadcaster.send_to(connection_id, round.snapshot());
    }

    pub fn handle_disconnect(registry: &mut ConnectionRegistry, connection_id: ConnectionId) {
        let Some(client) = registry.unregister(connection_id) else {
            debug!("Connection {} closed without joining", connection_id);
            return;
        };

        info!(
            "Client disconnected: {} ({})",
            client.user_id, client.username
        );

        Broadcaster::new(registry)
            .broadcast(ServerToClient::user_left(client.user_id, client.username));
    }
}
