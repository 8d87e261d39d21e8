use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::message::decode_message;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Pulls whole netstrings off a byte stream such as a child's stdout.
///
/// Bytes arrive in whatever pieces the pipe delivers; they accumulate in an
/// internal buffer until a complete frame can be split off.
pub struct FrameReader<T> {
    inner: T,
    received: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            received: BytesMut::with_capacity(READ_CHUNK_SIZE),
            config,
        }
    }

    /// Block until the next frame is complete.
    ///
    /// End of stream between frames is `Ok(None)`. End of stream inside a
    /// frame is `FrameError::ConnectionClosed` with the stranded byte count.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(frame) = decode_frame(&mut self.received, self.config.max_payload_size)? {
                tracing::trace!(size = frame.payload.len(), "frame received");
                return Ok(Some(frame));
            }

            match self.inner.read(&mut chunk) {
                Ok(0) if self.received.is_empty() => return Ok(None),
                Ok(0) => {
                    return Err(FrameError::ConnectionClosed {
                        pending: self.received.len(),
                    })
                }
                Ok(n) => self.received.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Next frame, split into its message values.
    pub fn next_message(&mut self) -> Result<Option<Vec<String>>> {
        self.next_frame()?
            .map(|frame| decode_message(&frame.payload))
            .transpose()
    }

    /// Bytes read from the stream that do not yet form a frame.
    pub fn pending(&self) -> usize {
        self.received.len()
    }

    pub fn max_payload(&self) -> usize {
        self.config.max_payload_size
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}
