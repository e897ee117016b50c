use crate::client::{ConnectionHandle, ConnectionId};
use std::collections::HashMap;

/// A joined client, bound to the connection it joined from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEntry {
    pub user_id: String,
    pub username: String,
    pub connection: ConnectionId,
}

/// Entries a join pushed out of the registry.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Registration {
    /// The previous holder of the same user id
    pub displaced: Option<ClientEntry>,
    /// This connection's entry under the id it used before
    pub released: Option<ClientEntry>,
}

/// Live sockets plus the clients that have joined through them.
///
/// A socket is tracked from its handshake until it disconnects. It only
/// receives broadcasts once it has joined, and holds at most one client entry.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, ConnectionHandle>,
    clients: HashMap<String, ClientEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, handle: ConnectionHandle) {
        self.connections.insert(handle.id(), handle);
    }

    /// Binds `user_id` to `connection`, overwriting any entry already holding
    /// that id. A connection holds one entry, so joining again under a new id
    /// releases the old one.
    pub fn register(
        &mut self,
        user_id: String,
        username: String,
        connection: ConnectionId,
    ) -> Registration {
        let released = self
            .clients
            .iter()
            .find(|(id, entry)| entry.connection == connection && **id != user_id)
            .map(|(id, _)| id.clone())
            .and_then(|id| self.clients.remove(&id));

        let displaced = self.clients.insert(
            user_id.clone(),
            ClientEntry {
                user_id,
                username,
                connection,
            },
        );

        Registration {
            displaced,
            released,
        }
    }

    /// Forgets the connection and returns the client bound to it, if any.
    /// Calling it again for the same connection returns `None`.
    pub fn unregister(&mut self, connection: ConnectionId) -> Option<ClientEntry> {
        self.connections.remove(&connection);

        let user_id = self
            .clients
            .values()
            .find(|entry| entry.connection == connection)
            .map(|entry| entry.user_id.clone())?;
        self.clients.remove(&user_id)
    }

    pub fn get(&self, connection: ConnectionId) -> Option<&ConnectionHandle> {
        self.connections.get(&connection)
    }

    #[cfg(test)]
    pub fn client(&self, user_id: &str) -> Option<&ClientEntry> {
        self.clients.get(user_id)
    }

    /// Handles of every joined client.
    pub fn all(&self) -> impl Iterator<Item = &ConnectionHandle> + '_ {
        self.clients
            .values()
            .filter_map(|entry| self.connections.get(&entry.connection))
    }

    pub fn all_except(
        &self,
        except: ConnectionId,
    ) -> impl Iterator<Item = &ConnectionHandle> + '_ {
        self.all().filter(move |handle| handle.id() != except)
    }

    /// Number of joined clients.
    pub fn count(&self) -> usize {
        self.clients.len()
    }

    #[cfg(test)]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Drops every handle, which closes every socket.
    pub fn close_all(&mut self) -> usize {
        let closed = self.connections.len();
        self.clients.clear();
        self.connections.clear();
        closed
    }
}
