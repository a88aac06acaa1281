//! Framed message link over a byte stream
//!
//! Wraps any tokio stream (TCP in production, an in-memory duplex in
//! tests) and exchanges [`FrameMessage`]s using the frame codec from
//! `flipapps-protocol`.

use log::trace;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use flipapps_protocol::{FrameError, FrameMessage, FrameParser};

/// Buffer size for stream reads
const RX_BUF_SIZE: usize = 1024;

/// Link failure
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("link I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad frame: {0}")]
    Frame(#[from] FrameError),
}

/// A byte stream carrying frames
pub struct FrameLink<S> {
    stream: S,
    parser: FrameParser,
    pending: Vec<u8>,
}

impl<S> FrameLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            parser: FrameParser::new(),
            pending: Vec::new(),
        }
    }

    /// Encode and write one message
    pub async fn send<M: FrameMessage>(&mut self, message: &M) -> Result<(), LinkError> {
        let bytes = message.to_frame()?.encode_to_vec();
        trace!("TX: {} bytes", bytes.len());
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read until one complete message arrives
    ///
    /// Returns `Ok(None)` when the peer closes the stream cleanly. A frame
    /// error consumes only the bad frame; bytes buffered behind it are
    /// kept for the next call.
    pub async fn recv<M: FrameMessage>(&mut self) -> Result<Option<M>, LinkError> {
        let mut buf = [0u8; RX_BUF_SIZE];
        loop {
            if !self.pending.is_empty() {
                let (consumed, outcome) = self.parser.feed_bytes(&self.pending);
                self.pending.drain(..consumed);
                if let Some(frame) = outcome? {
                    return Ok(Some(M::from_frame(&frame)?));
                }
            }

            let n = self.stream.read(&mut buf).await?;
            if n == 0 {
                return Ok(None);
            }
            trace!("RX: {} bytes", n);
            self.pending.extend_from_slice(&buf[..n]);
        }
    }
}
