use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Separates the length prefix from the payload.
pub const SEPARATOR: u8 = b':';

/// Closes every netstring.
pub const TERMINATOR: u8 = b',';

/// Longest accepted length prefix, in decimal digits.
pub const MAX_LENGTH_DIGITS: usize = 10;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// One decoded netstring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The unescaped payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (prefix + separator + payload + terminator).
    pub fn wire_size(&self) -> usize {
        decimal_digits(self.payload.len()) + 1 + self.payload.len() + 1
    }
}

/// Outcome of one incremental decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// The buffer does not hold a complete netstring yet. Not an error.
    Incomplete,
    /// A complete netstring sits at the start of the buffer.
    Frame {
        /// Bytes to drop from the front of the buffer, terminator included.
        consumed: usize,
        /// The payload between the separator and the terminator.
        payload: &'a [u8],
    },
}

/// Encode a payload as a netstring.
///
/// Wire format:
/// ```text
/// ┌───────────────────┬─────┬──────────────────┬─────┐
/// │ Length (decimal)  │ ':' │ Payload          │ ',' │
/// │ ASCII digits      │     │ (Length bytes)   │     │
/// └───────────────────┴─────┴──────────────────┴─────┘
/// ```
///
/// The payload is copied verbatim; `:` and `,` inside it need no escaping.
pub fn encode_netstring(payload: &[u8], dst: &mut BytesMut) {
    let prefix = payload.len().to_string();
    dst.reserve(prefix.len() + payload.len() + 2);
    dst.put_slice(prefix.as_bytes());
    dst.put_u8(SEPARATOR);
    dst.put_slice(payload);
    dst.put_u8(TERMINATOR);
}

/// Try to decode one netstring from the front of `buf`.
///
/// Returns [`Decoded::Incomplete`] while more bytes are needed; callers keep
/// reading and call again. Returns an error only when the bytes can never
/// become a valid netstring.
pub fn decode_next(buf: &[u8], max_payload: usize) -> Result<Decoded<'_>> {
    let window = &buf[..buf.len().min(MAX_LENGTH_DIGITS + 1)];
    let colon = match window.iter().position(|&b| b == SEPARATOR) {
        Some(index) => index,
        None => {
            check_partial_prefix(window)?;
            return Ok(Decoded::Incomplete);
        }
    };

    let length = parse_length(&buf[..colon])?;
    if length > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: length,
            max: max_payload,
        });
    }

    let rest = &buf[colon + 1..];
    if rest.len() < length + 1 {
        return Ok(Decoded::Incomplete);
    }

    let found = rest[length];
    if found != TERMINATOR {
        return Err(FrameError::InvalidTerminator { found });
    }

    Ok(Decoded::Frame {
        consumed: colon + 1 + length + 1,
        payload: &rest[..length],
    })
}

/// Decode a netstring from a growable buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete netstring yet.
/// On success, consumes the netstring bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    let (consumed, length) = match decode_next(&src[..], max_payload)? {
        Decoded::Incomplete => return Ok(None),
        Decoded::Frame { consumed, payload } => (consumed, payload.len()),
    };

    src.advance(consumed - length - 1);
    let payload = src.split_to(length).freeze();
    src.advance(1);

    Ok(Some(Frame { payload }))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

fn parse_length(prefix: &[u8]) -> Result<usize> {
    let invalid = || FrameError::InvalidLength {
        prefix: String::from_utf8_lossy(prefix).into_owned(),
    };

    if prefix.is_empty()
        || prefix.len() > MAX_LENGTH_DIGITS
        || !prefix.iter().all(u8::is_ascii_digit)
    {
        return Err(invalid());
    }

    std::str::from_utf8(prefix)
        .ok()
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(invalid)
}

// A prefix still waiting for its ':' must look like the start of a length.
fn check_partial_prefix(window: &[u8]) -> Result<()> {
    if window.len() > MAX_LENGTH_DIGITS || !window.iter().all(u8::is_ascii_digit) {
        return Err(FrameError::InvalidLength {
            prefix: String::from_utf8_lossy(window).into_owned(),
        });
    }
    Ok(())
}

fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_netstring(payload, &mut buf);
        buf
    }

    #[test]
    fn test_encode_plain_value() {
        assert_eq!(encoded(b"foo").as_ref(), b"3:foo,");
        assert_eq!(encoded(b"").as_ref(), b"0:,");
    }

    #[test]
    fn test_encode_counts_bytes_not_chars() {
        assert_eq!(encoded("é".as_bytes()).as_ref(), "2:é,".as_bytes());
    }

    #[test]
    fn test_decode_scenarios() {
        let Decoded::Frame { consumed, payload } = decode_next(b"3:foo,", DEFAULT_MAX_PAYLOAD)
            .unwrap()
        else {
            panic!("expected a frame");
        };
        assert_eq!((consumed, payload), (6, b"foo".as_ref()));

        let Decoded::Frame { consumed, payload } =
            decode_next(b"0:,", DEFAULT_MAX_PAYLOAD).unwrap()
        else {
            panic!("expected a frame");
        };
        assert_eq!((consumed, payload), (3, b"".as_ref()));
    }

    #[test]
    fn test_roundtrip_with_delimiters_in_payload() {
        for value in ["a:b,c", ",,,", ":::", "12:3,", "line\nbreak", ""] {
            let buf = encoded(value.as_bytes());
            let decoded = decode_next(&buf, DEFAULT_MAX_PAYLOAD).unwrap();
            assert_eq!(
                decoded,
                Decoded::Frame {
                    consumed: buf.len(),
                    payload: value.as_bytes()
                }
            );
        }
    }

    #[test]
    fn test_every_strict_prefix_needs_more_data() {
        let buf = encoded(b"hello, world: 42");
        for end in 0..buf.len() {
            let result = decode_next(&buf[..end], DEFAULT_MAX_PAYLOAD).unwrap();
            assert_eq!(result, Decoded::Incomplete, "prefix of length {end}");
        }
        assert!(matches!(
            decode_next(&buf, DEFAULT_MAX_PAYLOAD).unwrap(),
            Decoded::Frame { payload, .. } if payload == b"hello, world: 42"
        ));
    }

    #[test]
    fn test_decode_invalid_length_prefix() {
        let err = decode_next(b"x:abc,", DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength { ref prefix } if prefix == "x"));

        let err = decode_next(b":abc,", DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength { .. }));

        let err = decode_next(b"-3:abc,", DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength { .. }));
    }

    #[test]
    fn test_decode_rejects_garbage_before_colon_arrives() {
        let err = decode_next(b"1x", DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength { .. }));

        let err = decode_next(b"12345678901", DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength { .. }));
    }

    #[test]
    fn test_decode_invalid_terminator() {
        let err = decode_next(b"3:foo;", DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert!(matches!(err, FrameError::InvalidTerminator { found: b';' }));
    }

    #[test]
    fn test_decode_payload_too_large() {
        let err = decode_next(b"1024:", 16).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge {
                size: 1024,
                max: 16
            }
        ));
    }

    #[test]
    fn test_decode_frame_consumes_buffer() {
        let mut buf = encoded(b"first");
        encode_netstring(b"second", &mut buf);

        let f1 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().unwrap();
        assert_eq!(f1.payload.as_ref(), b"first");

        let f2 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().unwrap();
        assert_eq!(f2.payload.as_ref(), b"second");

        assert!(buf.is_empty());
        assert!(decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().is_none());
    }

    #[test]
    fn test_decode_frame_leaves_partial_bytes() {
        let mut buf = encoded(b"done");
        buf.extend_from_slice(b"7:partial");

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"done");
        assert_eq!(buf.as_ref(), b"7:partial");
        assert!(decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().is_none());
    }

    #[test]
    fn test_concatenated_frames_decode_in_order() {
        let values: [&[u8]; 3] = [b"run", b"a", b"bb"];
        let mut wire = BytesMut::new();
        for value in values {
            encode_netstring(value, &mut wire);
        }

        let mut together = Vec::new();
        while let Some(frame) = decode_frame(&mut wire, DEFAULT_MAX_PAYLOAD).unwrap() {
            together.push(frame.payload);
        }

        let separately: Vec<Bytes> = values
            .iter()
            .map(|value| {
                let mut one = encoded(value);
                decode_frame(&mut one, DEFAULT_MAX_PAYLOAD)
                    .unwrap()
                    .unwrap()
                    .payload
            })
            .collect();

        assert_eq!(together, separately);
    }

    #[test]
    fn test_frame_wire_size() {
        assert_eq!(Frame::new(Bytes::from_static(b"test")).wire_size(), 7);
        assert_eq!(Frame::new(Bytes::from_static(b"")).wire_size(), 3);
        assert_eq!(Frame::new(vec![0u8; 100]).wire_size(), 106);
    }
}
