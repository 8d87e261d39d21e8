use std::path::PathBuf;

/// Errors that can occur while starting or talking to the GUI subprocess.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The interpreter executable could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    /// A standard stream was not captured as a pipe.
    #[error("subprocess {0} was not captured as a pipe")]
    MissingPipe(&'static str),

    /// An I/O error occurred on the subprocess handle.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The pipes have already been handed out.
    #[error("subprocess pipes already taken")]
    PipesTaken,
}

pub type Result<T> = std::result::Result<T, TransportError>;
