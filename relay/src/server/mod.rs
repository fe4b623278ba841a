mod event_loop;
mod handshake;
mod outbound;
mod registry;
mod room_directory;
mod router;

pub use self::event_loop::EventLoop;
pub use self::handshake::{HandshakeProgress, HandshakeState, PendingConnection};
pub use self::outbound::TcpTransport;
pub use self::registry::{ClientIdentity, ConnectionId, ConnectionRegistry};
pub use self::room_directory::{Room, RoomDirectory};
pub use self::router::{MessageRouter, Transport};
