use std::pin::Pin;

use anyhow::Context;
use tokio_stream::Stream;

pub const NEW_LINE: &[u8; 2] = b"\r\n";

pub type BoxedStream<Item> = Pin<Box<dyn Stream<Item = Item> + Send>>;

/// Encodes one frame as a JSON string literal terminated by [NEW_LINE].
/// Newlines inside the frame are escaped, so one frame always occupies one line.
pub fn encode_frame(frame: &str) -> anyhow::Result<Vec<u8>> {
    let mut serialized_bytes = serde_json::to_vec(frame)?;
    serialized_bytes.extend_from_slice(NEW_LINE);

    Ok(serialized_bytes)
}

/// Decodes a single line (without its terminator) back into the frame it carries.
pub fn decode_frame(line: &str) -> anyhow::Result<String> {
    serde_json::from_str::<String>(line).context("failed to deserialize frame from the peer")
}
