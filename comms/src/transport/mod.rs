mod common;
mod reader;
mod writer;

pub use self::common::{decode_frame, encode_frame, BoxedStream};
pub use self::reader::{frame_stream, FrameStream};
pub use self::writer::FrameWriter;

use tokio::net::{tcp::OwnedWriteHalf, TcpStream};

/// Splits a TCP stream into a stream of incoming frames and a frame writer.
/// Both sides of the relay use the same framing, so the split is symmetric.
///
/// # Arguments
///
/// - `stream` - A [TcpStream] to split
pub fn split_tcp_stream(stream: TcpStream) -> (FrameStream, FrameWriter<OwnedWriteHalf>) {
    let (reader, writer) = stream.into_split();

    (frame_stream(reader), FrameWriter::new(writer))
}
