//! `tokio_util::codec` adapter for the netstring primitive.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_netstring, Frame, FrameConfig};
use crate::error::FrameError;
use crate::message::{decode_message, encode_message_into};

/// Splits a byte stream into message value lists and encodes replies.
#[derive(Debug, Clone, Default)]
pub struct NetstringCodec {
    config: FrameConfig,
}

impl NetstringCodec {
    /// Create a codec with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }
}

impl Decoder for NetstringCodec {
    type Item = Vec<String>;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match decode_frame(src, self.config.max_payload_size)? {
            Some(frame) => decode_message(&frame.payload).map(Some),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(values) => Ok(Some(values)),
            None if buf.is_empty() => Ok(None),
            None => Err(FrameError::ConnectionClosed { pending: buf.len() }),
        }
    }
}

impl<S: AsRef<str>> Encoder<&[S]> for NetstringCodec {
    type Error = FrameError;

    fn encode(&mut self, values: &[S], dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_message_into(values, dst);
        Ok(())
    }
}

impl Encoder<Frame> for NetstringCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if frame.payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: frame.payload.len(),
                max: self.config.max_payload_size,
            });
        }
        encode_netstring(&frame.payload, dst);
        Ok(())
    }
}
