use std::io::Read;
use std::iter::FusedIterator;

use scorepipe_frame::{FrameConfig, FrameReader};

use crate::error::{PeerError, Result};

/// A decoded request: method name plus positional string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub args: Vec<String>,
}

impl Request {
    /// Build a request from its parts.
    pub fn new<S: Into<String>>(method: impl Into<String>, args: impl IntoIterator<Item = S>) -> Self {
        Self {
            method: method.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Interpret decoded message values: the first is the method, the rest
    /// are arguments.
    pub fn from_values(values: Vec<String>) -> Result<Self> {
        let mut values = values.into_iter();
        let method = values.next().ok_or(PeerError::EmptyRequest)?;
        Ok(Self {
            method,
            args: values.collect(),
        })
    }

    /// Positional argument `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// The request as message values, method first.
    pub fn to_values(&self) -> Vec<String> {
        std::iter::once(self.method.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Presents the GUI's output stream as an ordered sequence of requests.
///
/// Yields one `Ok(Request)` per complete outer frame, in arrival order.
/// A clean end of stream ends the sequence. Any decode failure yields a
/// single `Err` and then the sequence ends for good: after a framing error
/// the stream can no longer be trusted.
pub struct RequestReader<R> {
    frames: FrameReader<R>,
    received: u64,
    finished: bool,
}

impl<R: Read> RequestReader<R> {
    /// Wrap a raw byte stream with default frame limits.
    pub fn new(inner: R) -> Self {
        Self::from_frames(FrameReader::new(inner))
    }

    /// Wrap a raw byte stream with explicit frame limits.
    pub fn with_config(inner: R, config: FrameConfig) -> Self {
        Self::from_frames(FrameReader::with_config(inner, config))
    }

    /// Wrap an existing frame reader.
    pub fn from_frames(frames: FrameReader<R>) -> Self {
        Self {
            frames,
            received: 0,
            finished: false,
        }
    }

    /// Number of requests yielded so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    /// True once the sequence has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn read_request(&mut self) -> Result<Option<Request>> {
        match self.frames.next_message()? {
            Some(values) => Request::from_values(values).map(Some),
            None => Ok(None),
        }
    }
}

impl<R: Read> Iterator for RequestReader<R> {
    type Item = Result<Request>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_request() {
            Ok(Some(request)) => {
                self.received += 1;
                tracing::debug!(
                    method = %request.method,
                    args = request.args.len(),
                    seq = self.received,
                    "request received"
                );
                Some(Ok(request))
            }
            Ok(None) => {
                self.finished = true;
                tracing::debug!(received = self.received, "request stream closed");
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: Read> FusedIterator for RequestReader<R> {}
