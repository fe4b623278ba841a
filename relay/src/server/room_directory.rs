use std::collections::HashMap;

use super::registry::ConnectionId;

#[derive(Debug)]
/// [Room] is a named group of connections, members are kept in join order
pub struct Room {
    name: String,
    members: Vec<ConnectionId>,
}

impl Room {
    pub fn new(name: &str) -> Self {
        Room {
            name: String::from(name),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.members.contains(&conn)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a member, returns false if it was already there
    fn insert(&mut self, conn: ConnectionId) -> bool {
        if self.contains(conn) {
            return false;
        }

        self.members.push(conn);
        true
    }

    /// Remove a member, returns false if it was not there
    fn remove(&mut self, conn: ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != conn);

        before != self.members.len()
    }
}

/// [RoomDirectory] owns every room and which room each connection is in.
///
/// Rooms are created on first join and are never removed, even once empty.
/// `membership` is a back-reference by name so [RoomDirectory::find_room_of]
/// does not have to scan every room.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<String, Room>,
    membership: HashMap<ConnectionId, String>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        RoomDirectory {
            rooms: HashMap::new(),
            membership: HashMap::new(),
        }
    }

    pub fn get_or_create(&mut self, room_name: &str) -> &mut Room {
        self.rooms
            .entry(String::from(room_name))
            .or_insert_with(|| Room::new(room_name))
    }

    pub fn get(&self, room_name: &str) -> Option<&Room> {
        self.rooms.get(room_name)
    }

    /// Puts the connection in the room, creating the room when needed.
    /// Joining the same room again changes nothing. Joining another room
    /// leaves the previous one first, a connection is never in two rooms.
    pub fn join(&mut self, room_name: &str, conn: ConnectionId) -> &Room {
        if let Some(previous) = self.membership.get(&conn).cloned() {
            if previous != room_name {
                self.leave(&previous, conn);
            }
        }

        self.membership.insert(conn, String::from(room_name));

        let room = self.get_or_create(room_name);
        room.insert(conn);

        room
    }

    /// Removes the connection from the room, returns false if it was not a member
    pub fn leave(&mut self, room_name: &str, conn: ConnectionId) -> bool {
        let Some(room) = self.rooms.get_mut(room_name) else {
            return false;
        };

        if !room.remove(conn) {
            return false;
        }

        if self.membership.get(&conn).is_some_and(|name| name == room_name) {
            self.membership.remove(&conn);
        }

        true
    }

    pub fn find_room_of(&self, conn: ConnectionId) -> Option<&Room> {
        self.membership
            .get(&conn)
            .and_then(|room_name| self.rooms.get(room_name))
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Number of rooms, empty ones included
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
