use std::{fmt, str::FromStr};

const NAME_PREFIX: &str = "NAME: ";
const ROOM_PREFIX: &str = "ROOM: ";
const CLIENT_PREFIX: &str = "CLIENT: ";

/// Which handshake message a side expects next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeKind {
    Name,
    Room,
    Client,
}

impl HandshakeKind {
    fn prefix(self) -> &'static str {
        match self {
            HandshakeKind::Name => NAME_PREFIX,
            HandshakeKind::Room => ROOM_PREFIX,
            HandshakeKind::Client => CLIENT_PREFIX,
        }
    }
}

impl fmt::Display for HandshakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches([':', ' ']))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandshakeError {
    #[error("malformed handshake frame {frame:?}: no known prefix")]
    MalformedHandshake { frame: String },
    #[error("expected a {expected} handshake frame, got {got}")]
    UnexpectedMessage {
        expected: HandshakeKind,
        got: HandshakeKind,
    },
}

/// Messages exchanged right after a connection is accepted.
///
/// The client announces its display name, then the room it wants to join.
/// The server answers with the address it accepted the connection from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeMessage {
    Name(String),
    Room(String),
    Client(String),
}

impl HandshakeMessage {
    pub fn kind(&self) -> HandshakeKind {
        match self {
            HandshakeMessage::Name(_) => HandshakeKind::Name,
            HandshakeMessage::Room(_) => HandshakeKind::Room,
            HandshakeMessage::Client(_) => HandshakeKind::Client,
        }
    }

    /// The value carried by the message, without its prefix
    pub fn into_value(self) -> String {
        match self {
            HandshakeMessage::Name(value)
            | HandshakeMessage::Room(value)
            | HandshakeMessage::Client(value) => value,
        }
    }

    /// Decodes a frame and requires it to be of the given kind, returning its value
    pub fn expect(frame: &str, expected: HandshakeKind) -> Result<String, HandshakeError> {
        let message = frame.parse::<HandshakeMessage>()?;

        if message.kind() != expected {
            return Err(HandshakeError::UnexpectedMessage {
                expected,
                got: message.kind(),
            });
        }

        Ok(message.into_value())
    }
}

impl FromStr for HandshakeMessage {
    type Err = HandshakeError;

    fn from_str(frame: &str) -> Result<Self, Self::Err> {
        if let Some(name) = frame.strip_prefix(NAME_PREFIX) {
            Ok(HandshakeMessage::Name(String::from(name)))
        } else if let Some(room) = frame.strip_prefix(ROOM_PREFIX) {
            Ok(HandshakeMessage::Room(String::from(room)))
        } else if let Some(address) = frame.strip_prefix(CLIENT_PREFIX) {
            Ok(HandshakeMessage::Client(String::from(address)))
        } else {
            Err(HandshakeError::MalformedHandshake {
                frame: String::from(frame),
            })
        }
    }
}

impl fmt::Display for HandshakeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeMessage::Name(value)
            | HandshakeMessage::Room(value)
            | HandshakeMessage::Client(value) => write!(f, "{}{}", self.kind().prefix(), value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_message() {
        let message = HandshakeMessage::Name("alice".into());

        assert_eq!(message.to_string(), "NAME: alice");
        assert_eq!("NAME: alice".parse::<HandshakeMessage>(), Ok(message));
    }

    #[test]
    fn test_room_value_keeps_inner_spaces() {
        assert_eq!(
            "ROOM: the lobby".parse::<HandshakeMessage>(),
            Ok(HandshakeMessage::Room("the lobby".into()))
        );
    }

    #[test]
    fn test_client_message() {
        assert_eq!(
            HandshakeMessage::Client("127.0.0.1".into()).to_string(),
            "CLIENT: 127.0.0.1"
        );
    }

    #[test]
    fn test_missing_prefix_is_malformed() {
        assert_eq!(
            "alice".parse::<HandshakeMessage>(),
            Err(HandshakeError::MalformedHandshake {
                frame: "alice".into()
            })
        );
    }

    #[test]
    fn test_expect_rejects_out_of_order_message() {
        assert_eq!(
            HandshakeMessage::expect("ROOM: lobby", HandshakeKind::Name),
            Err(HandshakeError::UnexpectedMessage {
                expected: HandshakeKind::Name,
                got: HandshakeKind::Room,
            })
        );
        assert_eq!(
            HandshakeMessage::expect("ROOM: lobby", HandshakeKind::Room),
            Ok("lobby".into())
        );
    }
}
