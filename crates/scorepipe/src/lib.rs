//! Scoreboard controller for a Tcl/Tk GUI talking netstrings over pipes.
//!
//! The GUI runs as a child interpreter. It sends named requests on its
//! stdout and reads ordered replies on its stdin; this crate owns the
//! scoreboard state behind those requests, pulls tournament data from
//! start.gg, and serves the overlay files a streaming tool renders.
//!
//! # Crate Structure
//!
//! - [`transport`]: spawning the GUI and draining its stderr
//! - [`frame`]: netstring framing and nested messages
//! - [`peer`]: request reader, responder, and in-order dispatcher
//! - [`commands`]: the command table the GUI calls into
//! - [`web`]: static file server for the overlay

pub mod bracket;
pub mod commands;
pub mod countries;
pub mod error;
pub mod focus;
pub mod players;
pub mod scoreboard;
pub mod startgg;
pub mod state;
pub mod web;

pub use error::{ControllerError, Result};

/// Re-export transport types.
pub mod transport {
    pub use scorepipe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use scorepipe_frame::*;
}

/// Re-export peer types.
pub mod peer {
    pub use scorepipe_peer::*;
}
