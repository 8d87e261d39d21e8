/// Errors that can occur during netstring encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The length prefix is empty, not decimal, or too long to be a length.
    #[error("invalid netstring length prefix {prefix:?}")]
    InvalidLength { prefix: String },

    /// The byte after the payload is not the `,` terminator.
    #[error("invalid netstring terminator (expected ',', found {found:#04x})")]
    InvalidTerminator { found: u8 },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A message payload ended in the middle of an inner netstring.
    #[error("message payload has {0} trailing bytes that are not a complete value")]
    TrailingBytes(usize),

    /// A decoded value is not valid UTF-8.
    #[error("message value is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a complete frame was received.
    #[error("connection closed ({pending} bytes of an incomplete frame pending)")]
    ConnectionClosed { pending: usize },
}

impl FrameError {
    /// True when the error means the byte stream can no longer be trusted
    /// to be aligned on frame boundaries.
    pub fn is_desync(&self) -> bool {
        match self {
            FrameError::InvalidLength { .. }
            | FrameError::InvalidTerminator { .. }
            | FrameError::PayloadTooLarge { .. }
            | FrameError::TrailingBytes(_)
            | FrameError::InvalidUtf8(_) => true,
            FrameError::ConnectionClosed { pending } => *pending > 0,
            FrameError::Io(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
