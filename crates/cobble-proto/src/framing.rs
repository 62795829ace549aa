//! Length-prefixed message framing over a byte stream.
//!
//! Each message travels as a 4-byte `u32` payload length in network
//! (big-endian) byte order, followed by exactly that many payload bytes.
//! The prefix does not count itself, so an empty payload is the four bytes
//! `00 00 00 00`. Frames are self-delimiting: adjacent messages on one
//! stream never merge or split. Nothing at this layer interprets payload
//! bytes; that belongs to [`crate::messages`].
//!
//! Both directions enforce [`FrameConfig::max_payload_size`], so a corrupt
//! or hostile prefix cannot make the reader allocate an absurd buffer.

use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Width of the length prefix on the wire.
const PREFIX_LEN: usize = 4;

/// Limits applied to both sides of the framing layer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Largest payload accepted or produced, in bytes.
    pub max_payload_size: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        // 1 MiB comfortably holds a full world snapshot.
        Self {
            max_payload_size: 1_048_576,
        }
    }
}

/// Errors surfaced by [`read_frame`] and [`write_frame`].
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A prefix declared (or a caller supplied) more bytes than allowed.
    #[error("payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge {
        /// Declared or attempted payload size.
        size: u32,
        /// The configured ceiling.
        max: u32,
    },

    /// The peer closed the stream partway through a frame.
    #[error("stream ended mid-frame")]
    ShortRead,

    /// Any other failure of the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fill `buf` from the stream, reporting EOF as [`FrameError::ShortRead`].
async fn fill<R: AsyncReadExt + Unpin>(reader: &mut R, buf: &mut [u8]) -> Result<(), FrameError> {
    reader.read_exact(buf).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => FrameError::ShortRead,
        _ => FrameError::Io(e),
    })?;
    Ok(())
}

/// Read one frame, returning its payload.
///
/// Waits until the whole frame has arrived. A peer that hangs up, whether
/// between frames or mid-frame, produces [`FrameError::ShortRead`]. The
/// size limit is checked before the payload buffer is allocated.
pub async fn read_frame<R: AsyncReadExt + Unpin>(
    reader: &mut R,
    config: &FrameConfig,
) -> Result<Vec<u8>, FrameError> {
    let mut prefix = [0u8; PREFIX_LEN];
    fill(reader, &mut prefix).await?;

    let declared = u32::from_be_bytes(prefix);
    if declared > config.max_payload_size {
        return Err(FrameError::PayloadTooLarge {
            size: declared,
            max: config.max_payload_size,
        });
    }

    let mut payload = vec![0u8; declared as usize];
    if !payload.is_empty() {
        fill(reader, &mut payload).await?;
    }
    Ok(payload)
}

/// Write one frame: the payload length in network byte order, then the
/// payload bytes, then a flush.
pub async fn write_frame<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    payload: &[u8],
    config: &FrameConfig,
) -> Result<(), FrameError> {
    // Anything that cannot fit the prefix is oversize by definition.
    let len = u32::try_from(payload.len()).unwrap_or(u32::MAX);
    if len > config.max_payload_size {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: config.max_payload_size,
        });
    }

    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}
