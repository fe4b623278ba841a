use std::{collections::HashMap, net::SocketAddr};

use anyhow::Context;
use comms::{
    handshake::HandshakeMessage,
    transport::{self, BoxedStream, FrameStream},
};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::broadcast,
};
use tokio_stream::{StreamExt, StreamMap};
use tracing::{debug, info, warn};

use crate::termination::Interrupted;

use super::{
    handshake::{HandshakeProgress, PendingConnection},
    outbound::TcpTransport,
    registry::{ConnectionId, ConnectionRegistry},
    room_directory::RoomDirectory,
    router::{MessageRouter, Transport},
};

/// What one readiness event on a client connection produced
#[derive(Debug)]
enum Inbound {
    Frame(String),
    Failed(anyhow::Error),
    /// The peer closed the connection
    Closed,
}

/// Turns a frame stream into a source that ends with an explicit [Inbound::Closed],
/// [StreamMap] would otherwise drop a finished stream without telling us.
fn inbound_source(frames: FrameStream) -> BoxedStream<Inbound> {
    Box::pin(
        frames
            .map(|frame| match frame {
                Ok(frame) => Inbound::Frame(frame),
                Err(e) => Inbound::Failed(e),
            })
            .chain(tokio_stream::once(Inbound::Closed)),
    )
}

/// [EventLoop] multiplexes the listener, the stop requests and every client
/// connection on a single task. It is the only owner of the registry, the
/// room directory and the connections, so none of them need locking.
pub struct EventLoop {
    listener: TcpListener,
    interrupt_rx: broadcast::Receiver<Interrupted>,
    sources: StreamMap<ConnectionId, BoxedStream<Inbound>>,
    pending: HashMap<ConnectionId, PendingConnection>,
    registry: ConnectionRegistry,
    rooms: RoomDirectory,
    transport: TcpTransport,
    next_id: u64,
}

impl EventLoop {
    pub fn new(listener: TcpListener, interrupt_rx: broadcast::Receiver<Interrupted>) -> Self {
        EventLoop {
            listener,
            interrupt_rx,
            sources: StreamMap::new(),
            pending: HashMap::new(),
            registry: ConnectionRegistry::new(),
            rooms: RoomDirectory::new(),
            transport: TcpTransport::new(),
            next_id: 0,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the loop until a stop request arrives, then close every connection and the listener.
    ///
    /// Each iteration handles one ready source: one accepted connection, one
    /// frame from a client, or the stop request. A failure to wait for
    /// incoming connections is returned as is, without the teardown.
    pub async fn start(mut self) -> anyhow::Result<()> {
        info!(addr = ?self.listener.local_addr().ok(), "relay event loop started");

        loop {
            tokio::select! {
                interrupted = self.interrupt_rx.recv() => {
                    info!(?interrupted, "stop requested, shutting down");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (stream, address) =
                        accepted.context("failed to wait for incoming connections")?;
                    self.accept(stream, address);
                }
                Some((conn, inbound)) = self.sources.next() => {
                    self.dispatch(conn, inbound);
                }
            }

            self.transport.reap();
        }

        self.teardown();

        Ok(())
    }

    fn next_connection_id(&mut self) -> ConnectionId {
        self.next_id += 1;

        ConnectionId::new(self.next_id)
    }

    /// Start tracking a new connection, its handshake is driven by later readiness events
    fn accept(&mut self, stream: TcpStream, address: SocketAddr) {
        let conn = self.next_connection_id();
        info!(conn = %conn, peer = %address, "got connection");

        let (frames, writer) = transport::split_tcp_stream(stream);

        self.transport.attach(conn, writer);
        self.pending.insert(conn, PendingConnection::new(address));
        self.sources.insert(conn, inbound_source(frames));
    }

    fn dispatch(&mut self, conn: ConnectionId, inbound: Inbound) {
        match inbound {
            Inbound::Frame(frame) if !frame.is_empty() => {
                if self.pending.contains_key(&conn) {
                    self.advance_handshake(conn, &frame);
                } else {
                    MessageRouter::new(&self.registry, &self.rooms, &mut self.transport)
                        .route(conn, &frame);
                }
            }
            Inbound::Frame(_) | Inbound::Closed => {
                debug!(conn = %conn, "connection hung up");
                self.disconnect(conn);
            }
            Inbound::Failed(e) => {
                warn!(conn = %conn, error = ?e, "transport error, dropping connection");
                self.disconnect(conn);
            }
        }
    }

    fn advance_handshake(&mut self, conn: ConnectionId, frame: &str) {
        let Some(pending) = self.pending.get_mut(&conn) else {
            return;
        };

        match pending.advance(frame) {
            Ok(HandshakeProgress::AwaitingRoom) => {
                debug!(conn = %conn, "handshake name received");
            }
            Ok(HandshakeProgress::Joined { name, room }) => {
                let address = pending.address();
                self.pending.remove(&conn);
                self.admit(conn, address, &name, &room);
            }
            Err(e) => {
                warn!(conn = %conn, error = %e, "dropping connection with malformed handshake");
                self.disconnect(conn);
            }
        }
    }

    /// Acknowledge the handshake, register the connection, put it in its room and announce it
    fn admit(&mut self, conn: ConnectionId, address: SocketAddr, name: &str, room: &str) {
        let reply = HandshakeMessage::Client(address.ip().to_string()).to_string();

        if let Err(e) = self.transport.send(conn, &reply) {
            warn!(conn = %conn, error = ?e, "could not acknowledge handshake");
            self.disconnect(conn);
            return;
        }

        self.registry.register(conn, address, name);
        self.rooms.join(room, conn);

        info!(
            conn = %conn,
            peer = %address,
            name,
            room,
            clients = self.registry.len(),
            "client joined room"
        );

        MessageRouter::new(&self.registry, &self.rooms, &mut self.transport).announce_join(conn);
    }

    /// The one removal path for every kind of disconnect: clean hang up, transport
    /// error or failed handshake. The remaining members of the room are told once.
    fn disconnect(&mut self, conn: ConnectionId) {
        self.sources.remove(&conn);
        self.pending.remove(&conn);
        self.transport.close(conn);

        let Some(identity) = self.registry.unregister(conn) else {
            return;
        };

        let Some(room_name) = self
            .rooms
            .find_room_of(conn)
            .map(|room| String::from(room.name()))
        else {
            return;
        };

        self.rooms.leave(&room_name, conn);

        info!(conn = %conn, client = %identity, room = %room_name, "client hung up");

        MessageRouter::new(&self.registry, &self.rooms, &mut self.transport)
            .announce_departure(&identity, &room_name);
    }

    /// Close every tracked connection and the listener, queued frames are not flushed
    fn teardown(mut self) {
        info!(
            connections = self.sources.len(),
            "closing every connection and the listener"
        );

        self.transport.shutdown();
        self.sources.clear();
        self.pending.clear();

        drop(self.listener);
    }
}
