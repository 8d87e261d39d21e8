use std::process::{ChildStdin, ChildStdout};
use std::thread::JoinHandle;

use scorepipe_frame::FrameConfig;
use scorepipe_transport::{drain_stderr, GuiProcess, TransportError};

use crate::error::Result;
use crate::request::RequestReader;
use crate::responder::{MarkerMode, Responder};

/// Protocol settings for a GUI session.
#[derive(Debug, Clone, Default)]
pub struct PeerConfig {
    /// How async-start markers are written.
    pub marker_mode: MarkerMode,
    /// Frame limits for both directions.
    pub frame: FrameConfig,
}

/// Both protocol endpoints of a running GUI, plus its stderr logger.
pub struct GuiSession {
    pub requests: RequestReader<ChildStdout>,
    pub responder: Responder<ChildStdin>,
    /// Joins once the GUI closes stderr; yields the number of lines logged.
    pub stderr: Option<JoinHandle<usize>>,
}

/// Take the pipes of a freshly spawned GUI and wrap them for dispatch.
///
/// Stderr, when available, is drained on its own thread.
pub fn attach(process: &mut GuiProcess, config: &PeerConfig) -> Result<GuiSession> {
    let pipes = process.take_pipes()?;

    let stderr = match process.take_stderr() {
        Some(stream) => Some(drain_stderr(stream).map_err(TransportError::Io)?),
        None => None,
    };

    tracing::debug!(
        pid = process.id(),
        marker_mode = ?config.marker_mode,
        max_payload = config.frame.max_payload_size,
        "attached to GUI process"
    );

    Ok(GuiSession {
        requests: RequestReader::with_config(pipes.stdout, config.frame.clone()),
        responder: Responder::with_config(pipes.stdin, config.frame.clone(), config.marker_mode),
        stderr,
    })
}
