use std::{collections::HashMap, fmt, net::SocketAddr};

/// Opaque handle of a connection tracked by the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        ConnectionId(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who is behind an admitted connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub address: SocketAddr,
    pub name: String,
}

impl ClientIdentity {
    pub fn new(address: SocketAddr, name: &str) -> Self {
        ClientIdentity {
            address,
            name: String::from(name),
        }
    }

    /// The host part shown to other users, the port is left out
    pub fn host(&self) -> String {
        self.address.ip().to_string()
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.address.ip())
    }
}

/// [ConnectionRegistry] keeps the identity of every connection that completed the handshake.
///
/// It is owned by the event loop alone, so there is no locking.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    identities: HashMap<ConnectionId, ClientIdentity>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        ConnectionRegistry {
            identities: HashMap::new(),
        }
    }

    pub fn register(&mut self, conn: ConnectionId, address: SocketAddr, name: &str) {
        self.identities
            .insert(conn, ClientIdentity::new(address, name));
    }

    pub fn lookup(&self, conn: ConnectionId) -> Option<&ClientIdentity> {
        self.identities.get(&conn)
    }

    /// Removes the connection, returns its identity if it was registered.
    /// Does nothing and returns None for unknown connections.
    pub fn unregister(&mut self, conn: ConnectionId) -> Option<ClientIdentity> {
        self.identities.remove(&conn)
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.identities.contains_key(&conn)
    }

    /// Number of admitted connections
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
