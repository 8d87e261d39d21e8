use std::io::Write;
use std::path::PathBuf;

use crate::error::{PeerError, Result};
use crate::responder::Responder;

/// Line that tells the loaded GUI script to build its window and start
/// sending requests.
pub const INITIALIZE_COMMAND: &str = "initialize";

const DEFAULT_SCRIPT: &str = "tcl/main.tcl";
const DEFAULT_SCRIPT_ENCODING: &str = "utf-8";

/// The two raw lines written to the interpreter before any framed traffic.
///
/// The first makes the interpreter load the GUI script; the second starts
/// it once the controller has its state ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Script the interpreter should `source`.
    pub script: PathBuf,
    /// Encoding passed to `source -encoding`.
    pub script_encoding: String,
    /// Line sent after state is loaded.
    pub initialize_command: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            script: PathBuf::from(DEFAULT_SCRIPT),
            script_encoding: DEFAULT_SCRIPT_ENCODING.to_string(),
            initialize_command: INITIALIZE_COMMAND.to_string(),
        }
    }
}

impl BootstrapConfig {
    /// Bootstrap `script` with the default encoding and initialize line.
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }

    /// The `source` line for the configured script.
    ///
    /// Paths with characters outside a conservative set are brace-quoted.
    /// Newlines and braces cannot be quoted that way and are rejected.
    pub fn source_line(&self) -> Result<String> {
        let script = self.script.to_str().ok_or_else(|| {
            PeerError::HandshakeFailed(format!(
                "script path is not valid UTF-8: {}",
                self.script.display()
            ))
        })?;

        if script.is_empty() {
            return Err(PeerError::HandshakeFailed("script path is empty".to_string()));
        }
        if script.contains(['\n', '\r', '{', '}']) {
            return Err(PeerError::HandshakeFailed(format!(
                "script path cannot be passed to the interpreter: {script:?}"
            )));
        }
        if !is_valid_word(&self.script_encoding) {
            return Err(PeerError::HandshakeFailed(format!(
                "invalid script encoding {:?}",
                self.script_encoding
            )));
        }

        let quoted = if is_valid_word(script) {
            script.to_string()
        } else {
            format!("{{{script}}}")
        };
        Ok(format!(
            "source -encoding \"{}\" {quoted}",
            self.script_encoding
        ))
    }

    /// Ask the interpreter to load the GUI script.
    pub fn load_script<W: Write>(&self, responder: &mut Responder<W>) -> Result<()> {
        let line = self.source_line()?;
        responder.send_line(&line)?;
        tracing::debug!(script = %self.script.display(), "GUI script requested");
        Ok(())
    }

    /// Tell the loaded script to start.
    pub fn initialize<W: Write>(&self, responder: &mut Responder<W>) -> Result<()> {
        if self.initialize_command.is_empty() || self.initialize_command.contains('\n') {
            return Err(PeerError::HandshakeFailed(format!(
                "invalid initialize command {:?}",
                self.initialize_command
            )));
        }
        responder.send_line(&self.initialize_command)?;
        tracing::debug!(command = %self.initialize_command, "GUI initialized");
        Ok(())
    }
}

fn is_valid_word(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | ':' | '-'))
}
