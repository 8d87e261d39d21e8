//! Request reader, responder, and in-order command dispatcher for pipe IPC.
//!
//! This is the "just works" layer. Attach to a GUI process, pull requests
//! one at a time, run a handler for each, and write exactly one reply per
//! request in arrival order. The protocol carries no request ids, so the
//! ordering is the correlation.

pub mod connector;
pub mod dispatcher;
pub mod error;
pub mod handshake;
pub mod request;
pub mod responder;

pub use connector::{attach, GuiSession, PeerConfig};
pub use dispatcher::{
    CommandTable, DispatchState, Dispatcher, Reply, SessionEnd, SessionReport, Turn, TurnOutcome,
};
pub use error::{PeerError, Result};
pub use handshake::{BootstrapConfig, INITIALIZE_COMMAND};
pub use request::{Request, RequestReader};
pub use responder::{Announce, MarkerMode, Responder, ASYNC_START_TAG};
