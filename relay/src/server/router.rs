use comms::event::{
    Event, RoomParticipationEvent, RoomParticipationStatus, UserMessageEvent,
};
use tracing::debug;

use super::{
    registry::{ClientIdentity, ConnectionId, ConnectionRegistry},
    room_directory::RoomDirectory,
};

/// Sending half of the framed transport, one call delivers one frame to one connection
pub trait Transport {
    fn send(&mut self, conn: ConnectionId, message: &str) -> anyhow::Result<()>;
}

/// [MessageRouter] formats events and fans them out to the members of a room.
///
/// Delivery is best-effort: a failed send is logged and the next recipient is tried.
pub struct MessageRouter<'a, T: Transport> {
    registry: &'a ConnectionRegistry,
    rooms: &'a RoomDirectory,
    transport: &'a mut T,
}

impl<'a, T: Transport> MessageRouter<'a, T> {
    pub fn new(
        registry: &'a ConnectionRegistry,
        rooms: &'a RoomDirectory,
        transport: &'a mut T,
    ) -> Self {
        MessageRouter {
            registry,
            rooms,
            transport,
        }
    }

    /// Relay a chat line to every other member of the sender's room.
    /// Senders without a room or identity are dropped silently.
    ///
    /// # Returns
    ///
    /// The number of recipients the line was handed to
    pub fn route(&mut self, sender: ConnectionId, payload: &str) -> usize {
        let (Some(identity), Some(room)) = (
            self.registry.lookup(sender),
            self.rooms.find_room_of(sender),
        ) else {
            debug!(conn = %sender, "dropping message from a connection outside any room");
            return 0;
        };

        let message = Event::UserMessage(UserMessageEvent {
            username: identity.name.clone(),
            host: identity.host(),
            content: String::from(payload),
        })
        .to_string();

        let recipients = room.members().iter().filter(|member| **member != sender);

        deliver(&mut *self.transport, recipients, &message)
    }

    /// Tell every member of the joiner's room, the joiner included, that it has arrived
    pub fn announce_join(&mut self, conn: ConnectionId) -> usize {
        let (Some(identity), Some(room)) =
            (self.registry.lookup(conn), self.rooms.find_room_of(conn))
        else {
            return 0;
        };

        let message = Event::RoomParticipation(RoomParticipationEvent {
            room: String::from(room.name()),
            username: identity.name.clone(),
            host: identity.host(),
            status: RoomParticipationStatus::Joined {
                count: self.registry.len(),
            },
        })
        .to_string();

        deliver(&mut *self.transport, room.members().iter(), &message)
    }

    /// Tell the remaining members of a room that a client has left.
    /// The departed connection has to be out of the room already.
    pub fn announce_departure(&mut self, identity: &ClientIdentity, room_name: &str) -> usize {
        let Some(room) = self.rooms.get(room_name) else {
            return 0;
        };

        let message = Event::RoomParticipation(RoomParticipationEvent {
            room: String::from(room_name),
            username: identity.name.clone(),
            host: identity.host(),
            status: RoomParticipationStatus::Left,
        })
        .to_string();

        deliver(&mut *self.transport, room.members().iter(), &message)
    }
}

fn deliver<'m, T: Transport>(
    transport: &mut T,
    recipients: impl Iterator<Item = &'m ConnectionId>,
    message: &str,
) -> usize {
    let mut delivered = 0;

    for recipient in recipients {
        match transport.send(*recipient, message) {
            Ok(()) => delivered += 1,
            Err(e) => debug!(conn = %recipient, error = ?e, "could not deliver frame"),
        }
    }

    delivered
}
