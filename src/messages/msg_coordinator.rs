use tokio::sync::oneshot;

use crate::{
    client::{ConnectionHandle, ConnectionId},
    messages::{ClientToServer, HealthStatus},
    round::TimerId,
};

/// Messages sent to the round hub. Everything that mutates round or
/// connection state goes through this channel.
#[derive(Debug)]
pub enum CoordinatorMessage {
    /// A socket finished its handshake
    Connected { connection: ConnectionHandle },

    /// A decoded message from a connected client
    ClientAction {
        connection_id: ConnectionId,
        action: ClientToServer,
    },

    /// The socket closed or failed
    Disconnected { connection_id: ConnectionId },

    /// A countdown or restart timer went off
    TimerFired { timer: TimerId },

    Health {
        reply_tx: oneshot::Sender<HealthStatus>,
    },

    /// Notify everyone, close every connection, then acknowledge
    Shutdown { done_tx: oneshot::Sender<()> },
}
