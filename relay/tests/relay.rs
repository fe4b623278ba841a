use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use comms::transport::{self, FrameStream, FrameWriter};
use relay::{server::EventLoop, termination::Interrupted};
use tokio::{
    net::{tcp::OwnedWriteHalf, TcpListener, TcpStream},
    sync::broadcast,
    task::JoinHandle,
    time::timeout,
};
use tokio_stream::StreamExt;

const WAIT: Duration = Duration::from_secs(2);

struct RunningRelay {
    addr: SocketAddr,
    stop_tx: broadcast::Sender<Interrupted>,
    handle: JoinHandle<anyhow::Result<()>>,
}

async fn start_relay() -> anyhow::Result<RunningRelay> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (stop_tx, stop_rx) = broadcast::channel(1);
    let handle = tokio::spawn(EventLoop::new(listener, stop_rx).start());

    Ok(RunningRelay {
        addr,
        stop_tx,
        handle,
    })
}

struct Client {
    frames: FrameStream,
    writer: FrameWriter<OwnedWriteHalf>,
}

impl Client {
    async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (frames, writer) = transport::split_tcp_stream(stream);

        Ok(Client { frames, writer })
    }

    /// Connect, go through the handshake and read the acknowledgement
    async fn join(addr: SocketAddr, name: &str, room: &str) -> anyhow::Result<Self> {
        let mut client = Client::connect(addr).await?;

        client.send(&format!("NAME: {}", name)).await?;
        client.send(&format!("ROOM: {}", room)).await?;
        assert_eq!(client.next().await?, "CLIENT: 127.0.0.1");

        Ok(client)
    }

    async fn send(&mut self, frame: &str) -> anyhow::Result<()> {
        self.writer.write(frame).await
    }

    async fn next(&mut self) -> anyhow::Result<String> {
        timeout(WAIT, self.frames.next())
            .await
            .context("timed out waiting for a frame")?
            .context("relay closed the connection")?
    }

    /// True once the relay has closed the connection
    async fn is_closed(&mut self) -> bool {
        matches!(timeout(WAIT, self.frames.next()).await, Ok(None) | Ok(Some(Err(_))))
    }

    async fn assert_silent(&mut self) {
        assert!(
            timeout(Duration::from_millis(200), self.frames.next())
                .await
                .is_err(),
            "expected no frame"
        );
    }
}

#[tokio::test]
async fn chat_line_reaches_other_members_only() -> anyhow::Result<()> {
    let relay = start_relay().await?;

    let mut alice = Client::join(relay.addr, "alice", "lobby").await?;
    assert_eq!(
        alice.next().await?,
        "\n(Connected: New client (1) in room lobby from alice@127.0.0.1)"
    );

    let mut bob = Client::join(relay.addr, "bob", "lobby").await?;
    let bob_joined = "\n(Connected: New client (2) in room lobby from bob@127.0.0.1)";
    assert_eq!(bob.next().await?, bob_joined);
    assert_eq!(alice.next().await?, bob_joined);

    alice.send("hi").await?;

    assert_eq!(bob.next().await?, "\n#[alice@127.0.0.1]>>hi");
    alice.assert_silent().await;

    relay.stop_tx.send(Interrupted::UserInt)?;
    relay.handle.await??;

    Ok(())
}

#[tokio::test]
async fn rooms_do_not_leak_into_each_other() -> anyhow::Result<()> {
    let relay = start_relay().await?;

    let mut alice = Client::join(relay.addr, "alice", "lobby").await?;
    alice.next().await?;
    let mut dave = Client::join(relay.addr, "dave", "games").await?;
    dave.next().await?;

    dave.send("anyone?").await?;
    alice.assert_silent().await;

    relay.stop_tx.send(Interrupted::UserInt)?;
    relay.handle.await??;

    Ok(())
}

#[tokio::test]
async fn stop_request_closes_connections_and_listener() -> anyhow::Result<()> {
    let relay = start_relay().await?;

    let mut client = Client::join(relay.addr, "erin", "x").await?;
    client.next().await?;

    relay.stop_tx.send(Interrupted::OsSigInt)?;
    timeout(WAIT, relay.handle).await???;

    assert!(client.is_closed().await);
    assert!(TcpStream::connect(relay.addr).await.is_err());

    Ok(())
}

#[tokio::test]
async fn hang_up_is_announced_once_to_the_room() -> anyhow::Result<()> {
    let relay = start_relay().await?;

    let mut alice = Client::join(relay.addr, "alice", "lobby").await?;
    alice.next().await?;
    let carol = Client::join(relay.addr, "carol", "lobby").await?;
    alice.next().await?;

    drop(carol);

    assert_eq!(
        alice.next().await?,
        "\n(Now hung up: Client from carol@127.0.0.1)"
    );
    alice.assert_silent().await;

    // the relay keeps serving the room afterwards
    let mut bob = Client::join(relay.addr, "bob", "lobby").await?;
    assert_eq!(
        bob.next().await?,
        "\n(Connected: New client (2) in room lobby from bob@127.0.0.1)"
    );

    relay.stop_tx.send(Interrupted::UserInt)?;
    relay.handle.await??;

    Ok(())
}

#[tokio::test]
async fn slow_or_malformed_joiners_do_not_block_others() -> anyhow::Result<()> {
    let relay = start_relay().await?;

    // never finishes its handshake
    let mut slow = Client::connect(relay.addr).await?;
    slow.send("NAME: slowpoke").await?;

    let mut mallory = Client::connect(relay.addr).await?;
    mallory.send("let me in").await?;
    assert!(mallory.is_closed().await);

    let mut alice = Client::join(relay.addr, "alice", "lobby").await?;
    assert_eq!(
        alice.next().await?,
        "\n(Connected: New client (1) in room lobby from alice@127.0.0.1)"
    );
    slow.assert_silent().await;

    relay.stop_tx.send(Interrupted::UserInt)?;
    relay.handle.await??;

    Ok(())
}
