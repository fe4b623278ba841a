//! Multi-room text-chat relay.
//!
//! One executable plays both sides of the chat:
//!
//! - [`server`] holds the single-task event loop which accepts connections,
//!   walks each one through the name/room handshake and fans chat lines out
//!   to the other members of the sender's room.
//! - [`client`] is the terminal client, multiplexing stdin and server frames.
//! - [`cli`] and [`config`] select the role and carry its settings.
//! - [`termination`] turns SIGINT and operator input into stop requests.
//!
//! Framing, handshake messages and the text of relayed events live in the
//! `comms` crate so both roles share them.

pub mod cli;
pub mod client;
pub mod config;
pub mod server;
pub mod termination;
