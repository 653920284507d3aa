//! Frame codec: `[tag u16 LE][len u16 LE][JSON payload]`.

use crate::error::ProtocolError;
use crate::message::{Message, MessageTag};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{instrument, trace};

/// Bytes in the fixed header.
pub const HEADER_LEN: usize = 4;

/// Largest payload the length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

fn parse_header(header: [u8; HEADER_LEN]) -> Result<(MessageTag, usize), ProtocolError> {
    let raw_tag = u16::from_le_bytes([header[0], header[1]]);
    let len = u16::from_le_bytes([header[2], header[3]]) as usize;
    let tag = MessageTag::from_repr(raw_tag).ok_or(ProtocolError::UnknownTag(raw_tag))?;
    Ok((tag, len))
}

/// Encodes one message as a complete frame.
pub fn encode(message: &Message) -> Result<Vec<u8>, ProtocolError> {
    let payload = message.payload_json()?;
    if payload.len() > MAX_PAYLOAD {
        return Err(ProtocolError::PayloadTooLarge(payload.len()));
    }
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&message.tag().code().to_le_bytes());
    frame.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decodes the first frame in `buf`.
///
/// Returns `Ok(None)` when more bytes are needed, otherwise the message and
/// the number of bytes it consumed. An unknown tag fails as soon as the
/// header is complete.
pub fn decode(buf: &[u8]) -> Result<Option<(Message, usize)>, ProtocolError> {
    let Some(header) = buf.first_chunk::<HEADER_LEN>() else {
        return Ok(None);
    };
    let (tag, len) = parse_header(*header)?;
    let Some(payload) = buf.get(HEADER_LEN..HEADER_LEN + len) else {
        return Ok(None);
    };
    let message = Message::from_json(tag, payload)?;
    Ok(Some((message, HEADER_LEN + len)))
}

/// Reads one message from a stream.
///
/// Returns `Ok(None)` on a clean end of stream between frames; an end of
/// stream inside a frame is [`ProtocolError::Truncated`].
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Message>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                Err(ProtocolError::Truncated)
            };
        }
        filled += n;
    }

    let (tag, len) = parse_header(header)?;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => ProtocolError::Truncated,
        _ => ProtocolError::Io(e),
    })?;

    let message = Message::from_json(tag, &payload)?;
    trace!(tag = %tag, len, "Read frame");
    Ok(Some(message))
}

/// Writes one message as a frame and flushes.
#[instrument(skip_all, fields(tag = %message.tag()))]
pub async fn write_message<W>(writer: &mut W, message: &Message) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode(message)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    trace!(len = frame.len(), "Wrote frame");
    Ok(())
}
