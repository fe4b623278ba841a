use std::collections::HashMap;

use anyhow::Context;
use comms::transport::FrameWriter;
use tokio::{
    io::AsyncWrite,
    sync::mpsc,
    task::JoinSet,
};
use tracing::debug;

use super::{registry::ConnectionId, router::Transport};

/// [TcpTransport] owns the writing side of every tracked connection.
///
/// Each connection gets a writer task fed through an unbounded channel, so
/// sending from the event loop never waits on a slow peer.
#[derive(Debug, Default)]
pub struct TcpTransport {
    writers: HashMap<ConnectionId, mpsc::UnboundedSender<String>>,
    join_set: JoinSet<()>,
}

impl TcpTransport {
    pub fn new() -> Self {
        TcpTransport {
            writers: HashMap::new(),
            join_set: JoinSet::new(),
        }
    }

    /// Start a writer task for the connection
    pub fn attach<W>(&mut self, conn: ConnectionId, mut writer: FrameWriter<W>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (mpsc_tx, mut mpsc_rx) = mpsc::unbounded_channel::<String>();

        self.join_set.spawn(async move {
            while let Some(frame) = mpsc_rx.recv().await {
                if let Err(e) = writer.write(&frame).await {
                    debug!(conn = %conn, error = ?e, "writer stopped");
                    break;
                }
            }
        });

        self.writers.insert(conn, mpsc_tx);
    }

    /// Close the connection's writing side once the frames already queued are written
    pub fn close(&mut self, conn: ConnectionId) {
        self.writers.remove(&conn);
    }

    /// Drop every writer without flushing what is still queued
    pub fn shutdown(&mut self) {
        self.writers.clear();
        self.join_set.abort_all();
    }

    pub fn is_attached(&self, conn: ConnectionId) -> bool {
        self.writers.contains_key(&conn)
    }

    /// Collect writer tasks that have already finished, so the set does not grow unbounded
    pub fn reap(&mut self) {
        while self.join_set.try_join_next().is_some() {}
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, conn: ConnectionId, message: &str) -> anyhow::Result<()> {
        let mpsc_tx = self
            .writers
            .get(&conn)
            .ok_or_else(|| anyhow::anyhow!("connection {} has no writer", conn))?;

        mpsc_tx
            .send(String::from(message))
            .context("writer task is gone")?;

        Ok(())
    }
}
