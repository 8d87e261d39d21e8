//! Anonymous-pipe transport to a GUI interpreter subprocess.
//!
//! The controller talks to its GUI over the child's standard streams:
//! - stdout carries requests from the GUI
//! - stdin carries responses and bootstrap lines to the GUI
//! - stderr is drained on its own thread and only logged
//!
//! This is the lowest layer of scorepipe. Everything else builds on top of
//! the [`GuiPipes`] returned here.

pub mod error;
pub mod process;

pub use error::{Result, TransportError};
pub use process::{drain_stderr, GuiPipes, GuiProcess, SpawnConfig, GUI_STDERR_TARGET};
