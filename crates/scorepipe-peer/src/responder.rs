use std::io::Write;

use scorepipe_frame::{FrameConfig, FrameWriter};

use crate::error::Result;

/// First value of a framed async-start marker message.
pub const ASYNC_START_TAG: &str = "async-start";

/// How async-start markers are written to the GUI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkerMode {
    /// `["async-start", marker]` as an ordinary nested message.
    #[default]
    Framed,
    /// The marker text followed by a newline, outside the netstring format.
    Line,
}

/// Something that can tell the GUI a slow operation has started.
pub trait Announce {
    /// Emit `marker` ahead of the reply for the current request.
    fn announce(&mut self, marker: &str) -> Result<()>;
}

/// Writes encoded responses to the GUI's input stream.
///
/// Responses carry no correlation id. The caller is responsible for writing
/// them in the order the requests arrived.
pub struct Responder<W> {
    frames: FrameWriter<W>,
    marker_mode: MarkerMode,
    sent: u64,
}

impl<W: Write> Responder<W> {
    /// Wrap a raw byte sink with default frame limits and framed markers.
    pub fn new(inner: W) -> Self {
        Self::from_frames(FrameWriter::new(inner), MarkerMode::default())
    }

    /// Wrap a raw byte sink with explicit limits and marker mode.
    pub fn with_config(inner: W, config: FrameConfig, marker_mode: MarkerMode) -> Self {
        Self::from_frames(FrameWriter::with_config(inner, config), marker_mode)
    }

    /// Wrap an existing frame writer.
    pub fn from_frames(frames: FrameWriter<W>, marker_mode: MarkerMode) -> Self {
        Self {
            frames,
            marker_mode,
            sent: 0,
        }
    }

    /// Encode `values` as one message, write it, and flush.
    ///
    /// An empty slice is a valid acknowledgement (`0:,`).
    pub fn respond<S: AsRef<str>>(&mut self, values: &[S]) -> Result<()> {
        self.frames.send_message(values)?;
        self.sent += 1;
        tracing::debug!(values = values.len(), seq = self.sent, "response sent");
        Ok(())
    }

    /// Write a raw newline-terminated line.
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        self.frames.send_line(line)?;
        Ok(())
    }

    /// Marker encoding in use.
    pub fn marker_mode(&self) -> MarkerMode {
        self.marker_mode
    }

    /// Number of responses written so far. Markers and raw lines are not
    /// counted.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        self.frames.get_ref()
    }

    /// Consume the responder and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.frames.into_inner()
    }
}

impl<W: Write> Announce for Responder<W> {
    fn announce(&mut self, marker: &str) -> Result<()> {
        match self.marker_mode {
            MarkerMode::Framed => self.frames.send_message(&[ASYNC_START_TAG, marker])?,
            MarkerMode::Line => self.frames.send_line(marker)?,
        }
        tracing::debug!(marker, mode = ?self.marker_mode, "async start announced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};

    use scorepipe_frame::{decode_message, FrameError, FrameReader};

    use super::*;
    use crate::error::PeerError;

    fn written(responder: Responder<Cursor<Vec<u8>>>) -> Vec<u8> {
        responder.into_inner().into_inner()
    }

    #[test]
    fn respond_writes_one_message() {
        let mut responder = Responder::new(Cursor::new(Vec::new()));
        responder.respond(&["ok", "Successfully fetched 3 players."]).unwrap();

        let wire = written(responder);
        let mut frames = FrameReader::new(Cursor::new(wire));
        let values = frames.next_message().unwrap().unwrap();
        assert_eq!(values, vec!["ok", "Successfully fetched 3 players."]);
        assert!(frames.next_message().unwrap().is_none());
    }

    #[test]
    fn empty_response_is_bare_ack() {
        let mut responder = Responder::new(Cursor::new(Vec::new()));
        responder.respond::<&str>(&[]).unwrap();
        assert_eq!(responder.sent(), 1);
        assert_eq!(written(responder), b"0:,");
    }

    #[test]
    fn framed_marker_is_a_message() {
        let mut responder = Responder::new(Cursor::new(Vec::new()));
        responder.announce("fetchplayers__resp").unwrap();
        responder.respond(&["ok"]).unwrap();

        let wire = written(responder);
        assert_eq!(&wire[..], b"37:11:async-start,18:fetchplayers__resp,,5:2:ok,,");
        let payload = &wire[3..40];
        assert_eq!(
            decode_message(payload).unwrap(),
            vec![ASYNC_START_TAG, "fetchplayers__resp"]
        );
    }

    #[test]
    fn line_marker_is_raw_text() {
        let mut responder =
            Responder::with_config(Cursor::new(Vec::new()), FrameConfig::default(), MarkerMode::Line);
        responder.announce("getbracket__resp").unwrap();
        responder.respond(&["ok"]).unwrap();

        assert_eq!(responder.sent(), 1);
        assert_eq!(written(responder), b"getbracket__resp\n5:2:ok,,");
    }

    #[test]
    fn raw_lines_bypass_framing() {
        let mut responder = Responder::new(Cursor::new(Vec::new()));
        responder.send_line("initialize").unwrap();
        assert_eq!(responder.sent(), 0);
        assert_eq!(written(responder), b"initialize\n");
    }

    #[test]
    fn write_failure_surfaces() {
        struct Closed;

        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::BrokenPipe))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut responder = Responder::new(Closed);
        let err = responder.respond(&["ok"]).unwrap_err();
        assert!(matches!(err, PeerError::Frame(FrameError::Io(_))));
        assert!(err.is_disconnect());
        assert_eq!(responder.sent(), 0);
    }
}
