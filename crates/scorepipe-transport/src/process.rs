use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::PathBuf;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use crate::error::{Result, TransportError};

/// Tracing target for lines the GUI writes to its stderr.
pub const GUI_STDERR_TARGET: &str = "scorepipe::gui";

/// How to launch the GUI interpreter.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    /// Interpreter executable (looked up on `PATH` when relative).
    pub program: PathBuf,
    /// Arguments passed before anything is written to stdin.
    pub args: Vec<String>,
}

impl SpawnConfig {
    /// Launch `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// The request/response pipe pair of a running GUI.
///
/// `stdout` is read exclusively by the request reader; `stdin` is written
/// exclusively by the responder.
#[derive(Debug)]
pub struct GuiPipes {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
}

/// A spawned GUI interpreter with its standard streams piped.
#[derive(Debug)]
pub struct GuiProcess {
    child: Child,
    pipes: Option<GuiPipes>,
    stderr: Option<ChildStderr>,
}

impl GuiProcess {
    /// Start the interpreter with stdin, stdout, and stderr piped.
    pub fn spawn(config: &SpawnConfig) -> Result<Self> {
        let mut command = Command::new(&config.program);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| TransportError::Spawn {
            program: config.program.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or(TransportError::MissingPipe("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(TransportError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take();

        tracing::debug!(
            program = %config.program.display(),
            pid = child.id(),
            "spawned GUI process"
        );

        Ok(Self {
            child,
            pipes: Some(GuiPipes { stdin, stdout }),
            stderr,
        })
    }

    /// Hand out the request/response pipes. Succeeds once.
    pub fn take_pipes(&mut self) -> Result<GuiPipes> {
        self.pipes.take().ok_or(TransportError::PipesTaken)
    }

    /// Hand out the stderr stream, if it has not been taken yet.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// OS process id of the child.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Kill the child. Killing an already exited child is not an error.
    pub fn kill(&mut self) -> Result<()> {
        match self.child.kill() {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::InvalidInput => Ok(()),
            Err(err) => Err(TransportError::Io(err)),
        }
    }

    /// Non-blocking exit check.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        Ok(self.child.try_wait()?)
    }

    /// Wait for the child to exit. Drops our end of any untaken pipes first.
    pub fn wait(&mut self) -> Result<ExitStatus> {
        self.pipes = None;
        Ok(self.child.wait()?)
    }
}

/// Log every line of `stderr` on a dedicated thread until it closes.
///
/// Lines that are not UTF-8 are logged lossily; only end of stream or a
/// read error stops the thread. The thread shares nothing with the
/// dispatcher. Its join handle yields the number of lines seen.
pub fn drain_stderr<R>(stderr: R) -> std::io::Result<JoinHandle<usize>>
where
    R: Read + Send + 'static,
{
    std::thread::Builder::new()
        .name("gui-stderr".to_string())
        .spawn(move || {
            let mut reader = BufReader::new(stderr);
            let mut line = Vec::new();
            let mut lines = 0usize;
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        lines += 1;
                        let text = String::from_utf8_lossy(&line);
                        tracing::warn!(target: GUI_STDERR_TARGET, "{}", text.trim_end());
                    }
                    Err(err) if err.kind() == ErrorKind::Interrupted => {}
                    Err(err) => {
                        tracing::debug!(error = %err, "stopped draining GUI stderr");
                        break;
                    }
                }
            }
            lines
        })
}
