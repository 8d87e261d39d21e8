use std::io;

/// Errors raised while serving a GUI request.
///
/// Handlers turn these into `["err", "Error: <message>"]` replies; none of
/// them end the session.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The tournament API rejected the request and said why.
    #[error("{0}")]
    Api(String),

    /// The tournament API answered with something we could not read.
    /// `detail` is the raw body or the decoder's complaint.
    #[error("Unexpected {status} response: {detail}")]
    UnexpectedResponse { status: u16, detail: String },

    /// The HTTP request to the tournament API never got an answer.
    #[error("{context}: {source}")]
    Request {
        context: &'static str,
        source: reqwest::Error,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file system error: {0}")]
    Io(#[from] io::Error),

    /// A phase group had fewer sets than the bracket layout needs.
    #[error("Too few matches retrieved from phase. {0} matches")]
    TooFewMatches(usize),

    #[error("No match found in stream queue")]
    EmptyStreamQueue,

    /// Window focus is not available on this platform or failed.
    #[error("focus failed: {0}")]
    Focus(String),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
