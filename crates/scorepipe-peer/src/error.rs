/// Errors that can occur in peer operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] scorepipe_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] scorepipe_frame::FrameError),

    /// A message arrived with no method name.
    #[error("request message has no method name")]
    EmptyRequest,

    /// The bootstrap lines could not be built or sent.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),
}

impl PeerError {
    /// True when the GUI side has gone away rather than misbehaved.
    pub fn is_disconnect(&self) -> bool {
        match self {
            PeerError::Frame(scorepipe_frame::FrameError::Io(err)) => matches!(
                err.kind(),
                std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset
            ),
            PeerError::Frame(scorepipe_frame::FrameError::ConnectionClosed { pending: 0 }) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;
