/// Relay events rendered as the text lines clients display
pub mod event;
/// Typed handshake messages exchanged right after a connection is accepted
pub mod handshake;
/// Implementation of frame transportation over TCP Streams.
/// Requires the 'transport' feature to be enabled and will bring in tokio dependency alongside with other dependencies
#[cfg(feature = "transport")]
pub mod transport;
