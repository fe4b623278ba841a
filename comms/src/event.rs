use std::fmt;

/// Users new room participation status
#[derive(Debug, Clone, PartialEq)]
pub enum RoomParticipationStatus {
    /// `count` is the number of clients connected to the relay after the join
    Joined { count: usize },
    Left,
}

/// A user has joined or left a room
#[derive(Debug, Clone, PartialEq)]
pub struct RoomParticipationEvent {
    /// The room the user has joined or left
    pub room: String,
    /// The display name of the user that has joined or left
    pub username: String,
    /// The address the user is connected from
    pub host: String,
    /// The new status of the user in the room
    pub status: RoomParticipationStatus,
}

/// A user has sent a message to a room
#[derive(Debug, Clone, PartialEq)]
pub struct UserMessageEvent {
    /// The display name of the user that has sent the message
    pub username: String,
    /// The address the user is connected from
    pub host: String,
    /// The content of the message
    pub content: String,
}

/// Events that can be sent to the client.
/// The relay sends them as plain text frames, the [fmt::Display] impl is the wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    RoomParticipation(RoomParticipationEvent),
    UserMessage(UserMessageEvent),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::UserMessage(event) => write!(
                f,
                "\n#[{}@{}]>>{}",
                event.username, event.host, event.content
            ),
            Event::RoomParticipation(event) => match event.status {
                RoomParticipationStatus::Joined { count } => write!(
                    f,
                    "\n(Connected: New client ({}) in room {} from {}@{})",
                    count, event.room, event.username, event.host
                ),
                RoomParticipationStatus::Left => write!(
                    f,
                    "\n(Now hung up: Client from {}@{})",
                    event.username, event.host
                ),
            },
        }
    }
}
