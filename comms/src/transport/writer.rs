use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::common::encode_frame;

/// [FrameWriter] is a wrapper around the write half of a connection which writes one frame at a time
pub struct FrameWriter<W: AsyncWrite + Unpin> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Send a single frame to the backing writer
    ///
    /// # Cancel Safety
    ///
    /// This method is not cancellation safe. If it is used as the event
    /// in a [tokio::select!] statement and some other
    /// branch completes first, then the provided frame may have been
    /// partially written, but future calls to `write` will start over
    /// from the beginning of the buffer. Causing undefined behaviour.
    pub async fn write(&mut self, frame: &str) -> anyhow::Result<()> {
        let serialized_bytes = encode_frame(frame)?;

        self.writer.write_all(serialized_bytes.as_slice()).await?;
        self.writer.flush().await?;

        Ok(())
    }
}
