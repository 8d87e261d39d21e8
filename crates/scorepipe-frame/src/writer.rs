use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_netstring, FrameConfig};
use crate::error::{FrameError, Result};

/// Writes netstrings, or bare lines, to a byte stream such as a child's stdin.
///
/// Every send is encoded into one buffer, written in full, and flushed
/// before returning, so the peer never sees half a reply.
pub struct FrameWriter<T> {
    inner: T,
    out: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            out: BytesMut::new(),
            config,
        }
    }

    /// Send one netstring carrying `payload`.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.ensure_fits(payload.len())?;
        self.out.clear();
        encode_netstring(payload, &mut self.out);
        self.write_out()
    }

    /// Send `values` as one message.
    ///
    /// The size limit applies to the outer payload, matching what the
    /// reading side checks.
    pub fn send_message<S: AsRef<str>>(&mut self, values: &[S]) -> Result<()> {
        let mut inner = BytesMut::new();
        for value in values {
            encode_netstring(value.as_ref().as_bytes(), &mut inner);
        }
        self.ensure_fits(inner.len())?;
        self.out.clear();
        encode_netstring(&inner, &mut self.out);
        self.write_out()
    }

    /// Send `line` plus a newline, with no framing.
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        self.out.clear();
        self.out.extend_from_slice(line.as_bytes());
        self.out.extend_from_slice(b"\n");
        self.write_out()
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn ensure_fits(&self, size: usize) -> Result<()> {
        let max = self.config.max_payload_size;
        if size > max {
            return Err(FrameError::PayloadTooLarge { size, max });
        }
        Ok(())
    }

    fn write_out(&mut self) -> Result<()> {
        let mut rest = &self.out[..];
        while !rest.is_empty() {
            match self.inner.write(rest) {
                Ok(0) => {
                    return Err(FrameError::ConnectionClosed {
                        pending: rest.len(),
                    })
                }
                Ok(n) => rest = &rest[n..],
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        tracing::trace!(size = self.out.len(), "frame bytes sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;

    fn sent(writer: FrameWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    /// Accepts a few bytes per call and records flushes.
    #[derive(Default)]
    struct TrickleSink {
        per_write: usize,
        interrupt_first: bool,
        data: Vec<u8>,
        flushes: usize,
    }

    impl Write for TrickleSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.interrupt_first {
                self.interrupt_first = false;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            let n = buf.len().min(self.per_write.max(1));
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct FailingSink(Option<ErrorKind>);

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            match self.0 {
                Some(kind) => Err(io::Error::from(kind)),
                None => Ok(0),
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn replies_are_written_back_to_back() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));

        writer.send_message(&["ok"]).unwrap();
        writer.send_message::<&str>(&[]).unwrap();
        writer.send_message(&["err", "boom"]).unwrap();

        assert_eq!(sent(writer), b"5:2:ok,,0:,13:3:err,4:boom,,");
    }

    #[test]
    fn raw_payload_is_one_netstring() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        writer.send(b"hello").unwrap();
        assert_eq!(sent(writer), b"5:hello,");
    }

    #[test]
    fn lines_bypass_framing() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        writer.send_line("initialize").unwrap();
        assert_eq!(sent(writer), b"initialize\n");
    }

    #[test]
    fn short_writes_are_completed_and_flushed() {
        let sink = TrickleSink {
            per_write: 3,
            interrupt_first: true,
            ..TrickleSink::default()
        };
        let mut writer = FrameWriter::new(sink);
        writer.send_message(&["getbracket__resp"]).unwrap();

        let sink = writer.into_inner();
        assert_eq!(sink.data, b"20:16:getbracket__resp,,");
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn oversized_messages_are_refused_before_writing() {
        let config = FrameConfig {
            max_payload_size: 4,
        };
        let mut writer = FrameWriter::with_config(Cursor::new(Vec::new()), config);

        let err = writer.send(b"oversized").unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 9, max: 4 }));
        let err = writer.send_message(&["abc"]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 6, max: 4 }));
        assert!(writer.get_ref().get_ref().is_empty());
    }

    #[test]
    fn zero_length_write_means_closed() {
        let mut writer = FrameWriter::new(FailingSink(None));
        let err = writer.send(b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed { pending: 4 }));
    }

    #[test]
    fn broken_pipe_surfaces_as_io() {
        let mut writer = FrameWriter::new(FailingSink(Some(ErrorKind::BrokenPipe)));
        let err = writer.send_message(&["ok"]).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }
}
