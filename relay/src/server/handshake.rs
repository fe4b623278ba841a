use std::net::SocketAddr;

use comms::handshake::{HandshakeError, HandshakeKind, HandshakeMessage};

/// Where a freshly accepted connection is in the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    AwaitingName,
    AwaitingRoom { name: String },
}

/// Outcome of feeding one frame to a [PendingConnection]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeProgress {
    AwaitingRoom,
    Joined { name: String, room: String },
}

/// A connection that was accepted but has not told us its name and room yet.
///
/// The handshake advances one frame per readiness event, so a slow joiner
/// never holds up the rest of the loop.
#[derive(Debug)]
pub struct PendingConnection {
    address: SocketAddr,
    state: HandshakeState,
}

impl PendingConnection {
    pub fn new(address: SocketAddr) -> Self {
        PendingConnection {
            address,
            state: HandshakeState::AwaitingName,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    /// Consume the next handshake frame.
    /// A frame with the wrong prefix fails the handshake and leaves the state untouched.
    pub fn advance(&mut self, frame: &str) -> Result<HandshakeProgress, HandshakeError> {
        if let HandshakeState::AwaitingRoom { name } = &self.state {
            let room = HandshakeMessage::expect(frame, HandshakeKind::Room)?;

            return Ok(HandshakeProgress::Joined {
                name: name.clone(),
                room,
            });
        }

        let name = HandshakeMessage::expect(frame, HandshakeKind::Name)?;
        self.state = HandshakeState::AwaitingRoom { name };

        Ok(HandshakeProgress::AwaitingRoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> PendingConnection {
        PendingConnection::new(SocketAddr::from(([127, 0, 0, 1], 4000)))
    }

    #[test]
    fn test_name_then_room_joins() {
        let mut connection = pending();

        assert_eq!(
            connection.advance("NAME: alice"),
            Ok(HandshakeProgress::AwaitingRoom)
        );
        assert_eq!(
            connection.state(),
            &HandshakeState::AwaitingRoom {
                name: "alice".into()
            }
        );
        assert_eq!(
            connection.advance("ROOM: lobby"),
            Ok(HandshakeProgress::Joined {
                name: "alice".into(),
                room: "lobby".into()
            })
        );
    }

    #[test]
    fn test_room_before_name_is_rejected() {
        let mut connection = pending();

        assert!(matches!(
            connection.advance("ROOM: lobby"),
            Err(HandshakeError::UnexpectedMessage { .. })
        ));
        assert_eq!(connection.state(), &HandshakeState::AwaitingName);
    }

    #[test]
    fn test_frame_without_prefix_is_malformed() {
        let mut connection = pending();
        connection.advance("NAME: alice").unwrap();

        assert!(matches!(
            connection.advance("lobby"),
            Err(HandshakeError::MalformedHandshake { .. })
        ));
    }
}
