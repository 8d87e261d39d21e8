//! Nested messages: an ordered list of strings inside one outer netstring.

use bytes::BytesMut;

use crate::codec::{decode_next, encode_netstring, Decoded};
use crate::error::{FrameError, Result};

/// Encode `values` as one message.
///
/// Each value becomes a netstring, the netstrings are concatenated, and the
/// concatenation is wrapped in one more netstring. Zero values encode to
/// `0:,`.
pub fn encode_message<S: AsRef<str>>(values: &[S]) -> BytesMut {
    let mut dst = BytesMut::new();
    encode_message_into(values, &mut dst);
    dst
}

/// Append the encoding of `values` to `dst`.
pub fn encode_message_into<S: AsRef<str>>(values: &[S], dst: &mut BytesMut) {
    let mut inner = BytesMut::new();
    for value in values {
        encode_netstring(value.as_ref().as_bytes(), &mut inner);
    }
    encode_netstring(&inner, dst);
}

/// Split the payload of one outer netstring back into its values.
///
/// The payload must already be complete; partial input is the reader's
/// concern. Bytes left over after the last complete inner netstring are an
/// error rather than silently dropped.
pub fn decode_message(payload: &[u8]) -> Result<Vec<String>> {
    let mut values = Vec::new();
    let mut rest = payload;

    while !rest.is_empty() {
        match decode_next(rest, payload.len())? {
            Decoded::Frame { consumed, payload: value } => {
                values.push(String::from_utf8(value.to_vec())?);
                rest = &rest[consumed..];
            }
            Decoded::Incomplete => return Err(FrameError::TrailingBytes(rest.len())),
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_frame, DEFAULT_MAX_PAYLOAD};

    fn roundtrip(values: &[&str]) -> Vec<String> {
        let mut wire = encode_message(values);
        let outer = decode_frame(&mut wire, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .expect("outer frame should be complete");
        assert!(wire.is_empty());
        decode_message(&outer.payload).unwrap()
    }

    #[test]
    fn encodes_nested_wire_format() {
        assert_eq!(
            encode_message(&["run", "a", "bb"]).as_ref(),
            b"15:3:run,1:a,2:bb,,"
        );
    }

    #[test]
    fn zero_values_wrap_an_empty_payload() {
        let empty: [&str; 0] = [];
        assert_eq!(encode_message(&empty).as_ref(), b"0:,");
        assert_eq!(roundtrip(&[]), Vec::<String>::new());
    }

    #[test]
    fn single_empty_value() {
        assert_eq!(encode_message(&[""]).as_ref(), b"3:0:,,");
        assert_eq!(roundtrip(&[""]), vec![String::new()]);
    }

    #[test]
    fn run_a_bb_roundtrips() {
        assert_eq!(roundtrip(&["run", "a", "bb"]), vec!["run", "a", "bb"]);
    }

    #[test]
    fn values_with_delimiters_roundtrip() {
        let values = ["1:x,", ",", ":", "3:foo,3:bar,", "tab\tand\nnewline", "ünïcødé"];
        assert_eq!(roundtrip(&values), values);
    }

    #[test]
    fn owned_strings_encode_like_borrowed() {
        let owned = vec!["ok".to_string(), "done".to_string()];
        assert_eq!(encode_message(&owned), encode_message(&["ok", "done"]));
    }

    #[test]
    fn decode_rejects_trailing_partial_value() {
        let err = decode_message(b"3:foo,5:ab").unwrap_err();
        assert!(matches!(err, FrameError::TrailingBytes(4)));
    }

    #[test]
    fn decode_rejects_bad_inner_prefix() {
        let err = decode_message(b"3:foo,x:y,").unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength { .. }));
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let err = decode_message(b"2:\xff\xfe,").unwrap_err();
        assert!(matches!(err, FrameError::InvalidUtf8(_)));
    }

    #[test]
    fn decode_empty_payload_is_empty_list() {
        assert!(decode_message(b"").unwrap().is_empty());
    }
}
