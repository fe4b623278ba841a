use clap::Parser;

use crate::config::{
    ClientConfig, Role, ServerConfig, CHAT_SERVER_NAME, DEFAULT_BACKLOG, SERVER_HOST,
};

/// Multi-room chat relay. Runs the relay when the name is `server`, a chat client otherwise.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Display name, `server` starts the relay
    #[arg(long)]
    pub name: String,

    /// Port the relay listens on, or the client connects to
    #[arg(long)]
    pub port: u16,

    /// Room to join
    #[arg(long)]
    pub room: String,

    /// Host the relay binds to, or the client connects to
    #[arg(long, default_value = SERVER_HOST)]
    pub host: String,
}

impl Cli {
    pub fn role(&self) -> Role {
        if self.name == CHAT_SERVER_NAME {
            Role::Server(ServerConfig {
                host: self.host.clone(),
                port: self.port,
                backlog: DEFAULT_BACKLOG,
            })
        } else {
            Role::Client(ClientConfig {
                host: self.host.clone(),
                port: self.port,
                name: self.name.clone(),
                room: self.room.clone(),
            })
        }
    }
}
