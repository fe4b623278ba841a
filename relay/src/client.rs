use anyhow::Context;
use comms::{
    handshake::{HandshakeKind, HandshakeMessage},
    transport::{self, FrameStream, FrameWriter},
};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    net::{tcp::OwnedWriteHalf, TcpStream},
    sync::mpsc,
};
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::config::ClientConfig;

/// A client connection that went through the handshake
pub struct ChatClient {
    frames: FrameStream,
    writer: FrameWriter<OwnedWriteHalf>,
    prompt: String,
}

impl ChatClient {
    /// Connect to the relay, announce name and room and wait for the server's reply
    pub async fn connect(config: &ClientConfig) -> anyhow::Result<Self> {
        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to chat server {} @ port {}",
                    config.host, config.port
                )
            })?;
        let (mut frames, mut writer) = transport::split_tcp_stream(stream);

        writer
            .write(&HandshakeMessage::Name(config.name.clone()).to_string())
            .await?;
        writer
            .write(&HandshakeMessage::Room(config.room.clone()).to_string())
            .await?;

        let reply = frames
            .next()
            .await
            .context("server closed the connection during the handshake")??;
        let address = HandshakeMessage::expect(&reply, HandshakeKind::Client)?;
        debug!(address = %address, "handshake completed");

        Ok(ChatClient {
            frames,
            writer,
            prompt: format!("[{}@{}]> ", config.name, address),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Relay lines from `input` to the server and frames from the server to `output`
    /// until the server closes the connection or the input ends.
    pub async fn run<O>(
        &mut self,
        mut input: mpsc::UnboundedReceiver<String>,
        output: &mut O,
    ) -> anyhow::Result<()>
    where
        O: AsyncWrite + Unpin,
    {
        loop {
            output.write_all(self.prompt.as_bytes()).await?;
            output.flush().await?;

            tokio::select! {
                line = input.recv() => match line {
                    Some(line) => {
                        let line = line.trim();
                        if !line.is_empty() {
                            self.writer.write(line).await?;
                        }
                    }
                    None => break,
                },
                frame = self.frames.next() => match frame {
                    Some(frame) => {
                        output.write_all(frame?.as_bytes()).await?;
                        output.write_all(b"\n").await?;
                    }
                    None => {
                        output.write_all(b"Client shutting down.\n").await?;
                        break;
                    }
                },
            }
        }

        output.flush().await?;

        Ok(())
    }
}

/// Read stdin on a plain thread, a blocking read inside the runtime would keep it from shutting down
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                break;
            };

            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}

/// Run the interactive client on the process' stdin and stdout
pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let mut client = ChatClient::connect(&config).await?;
    let mut stdout = tokio::io::stdout();

    stdout
        .write_all(
            format!(
                "Now connected to chat server {} @ port {}\n",
                config.host, config.port
            )
            .as_bytes(),
        )
        .await?;

    tokio::select! {
        result = client.run(stdin_lines(), &mut stdout) => result?,
        ctrl_c = tokio::signal::ctrl_c() => {
            if let Err(e) = ctrl_c {
                warn!(error = ?e, "ctrl-c handler failed");
            }
            stdout.write_all(b"\nClient interrupted.\n").await?;
        }
    }

    stdout.flush().await?;

    Ok(())
}
