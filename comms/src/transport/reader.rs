use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_stream::{wrappers::LinesStream, StreamExt};

use super::common::{decode_frame, BoxedStream};

/// [FrameStream] is a stream of frames sent by the peer.
/// The stream ends when the peer closes its side of the connection.
///
/// # Cancel Safety
///
/// This stream is cancel-safe, meaning that it can be used in [tokio::select!]
/// without the risk of missing frames.
pub type FrameStream = BoxedStream<anyhow::Result<String>>;

/// Wraps the read half of a connection into a [FrameStream].
pub fn frame_stream<R>(reader: R) -> FrameStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    Box::pin(
        LinesStream::new(BufReader::new(reader).lines()).map(|line| {
            line.context("could not read line from the peer")
                .and_then(|line| decode_frame(&line))
        }),
    )
}
