use anyhow::Context;
use tokio::net::{lookup_host, TcpListener, TcpSocket};

pub const SERVER_HOST: &str = "localhost";
/// Display name which makes the executable run the relay instead of a client
pub const CHAT_SERVER_NAME: &str = "server";
pub const DEFAULT_BACKLOG: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backlog: u32,
}

impl ServerConfig {
    /// Bind the listening socket with address reuse enabled, preferring IPv4 for hosts like `localhost`
    pub async fn bind(&self) -> anyhow::Result<TcpListener> {
        let addrs: Vec<_> = lookup_host((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("could not resolve {}", self.host))?
            .collect();
        let addr = addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("{} resolved to no address", self.host))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket
            .bind(addr)
            .with_context(|| format!("could not bind to {}", addr))?;

        Ok(socket.listen(self.backlog)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub room: String,
}

/// Which side of the chat this process plays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Server(ServerConfig),
    Client(ClientConfig),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let config = ServerConfig {
            host: String::from("127.0.0.1"),
            port: 0,
            backlog: DEFAULT_BACKLOG,
        };

        let listener = config.bind().await.unwrap();

        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
