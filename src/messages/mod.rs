mod msg_client_to_server;
mod msg_coordinator;
mod msg_server_to_client;

use serde::Serialize;

pub use self::msg_client_to_server::*;
pub use self::msg_coordinator::*;
pub use self::msg_server_to_client::*;

/// Body of the `/health` status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub clients: usize,
}

impl HealthStatus {
    pub fn ok(clients: usize) -> Self {
        Self {
            status: "ok",
            clients,
        }
    }
}
