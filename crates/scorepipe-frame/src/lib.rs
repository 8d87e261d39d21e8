//! Netstring framing and nested string-list messages for pipe IPC.
//!
//! Every value on the wire is a netstring:
//! - An ASCII decimal payload length
//! - A `:` separator
//! - Exactly that many payload bytes (unescaped)
//! - A `,` terminator
//!
//! A message is one outer netstring whose payload is the back-to-back
//! netstrings of its values. No partial reads, no buffer management in
//! user code.

pub mod codec;
pub mod error;
pub mod message;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod tokio_codec;

pub use codec::{
    decode_frame, decode_next, encode_netstring, Decoded, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD,
    MAX_LENGTH_DIGITS, SEPARATOR, TERMINATOR,
};
pub use error::{FrameError, Result};
pub use message::{decode_message, encode_message, encode_message_into};
pub use reader::FrameReader;
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use tokio_codec::NetstringCodec;
