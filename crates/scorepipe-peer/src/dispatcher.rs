//! Single-threaded, strictly in-order request dispatch.
//!
//! Each turn pulls one request, runs its handler to completion, and writes
//! at most one reply before the next request is read. With no request ids
//! on the wire, arrival order is the only correlation the GUI has.

use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};

use crate::error::{PeerError, Result};
use crate::request::{Request, RequestReader};
use crate::responder::{Announce, Responder};

/// What a handler sends back for its request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// One response message with these values, possibly none.
    Values(Vec<String>),
    /// No response at all. Only for commands the GUI never waits on.
    Silent,
}

impl Reply {
    /// `["ok", message]`.
    pub fn ok(message: impl Into<String>) -> Self {
        Reply::Values(vec!["ok".to_string(), message.into()])
    }

    /// `["err", message]`.
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Values(vec!["err".to_string(), message.into()])
    }

    /// The zero-value acknowledgement.
    pub fn empty() -> Self {
        Reply::Values(Vec::new())
    }

    /// A reply made of arbitrary positional values.
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Reply::Values(values.into_iter().map(Into::into).collect())
    }
}

/// Per-turn context handed to a handler.
///
/// Lets a handler announce that a slow operation has started. A failed
/// marker write is remembered and reported once the handler returns.
pub struct Turn<'a> {
    announcer: &'a mut dyn Announce,
    markers: usize,
    failed: Option<PeerError>,
}

impl<'a> Turn<'a> {
    pub fn new(announcer: &'a mut dyn Announce) -> Self {
        Self {
            announcer,
            markers: 0,
            failed: None,
        }
    }

    /// Emit an async-start marker ahead of this turn's reply.
    pub fn begin_async(&mut self, marker: &str) {
        if self.failed.is_some() {
            return;
        }
        match self.announcer.announce(marker) {
            Ok(()) => self.markers += 1,
            Err(err) => self.failed = Some(err),
        }
    }

    /// Markers written during this turn.
    pub fn markers(&self) -> usize {
        self.markers
    }

    fn finish(self) -> Result<usize> {
        match self.failed {
            Some(err) => Err(err),
            None => Ok(self.markers),
        }
    }
}

type Handler<S> = Box<dyn FnMut(&mut S, &Request, &mut Turn<'_>) -> Reply>;

struct Command<S> {
    arity: usize,
    handler: Handler<S>,
}

/// Fixed map from exact method names to handlers.
pub struct CommandTable<S> {
    commands: HashMap<String, Command<S>>,
}

impl<S> CommandTable<S> {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register `method` taking at least `arity` arguments.
    ///
    /// Extra arguments are passed through and left for the handler to ignore.
    /// Registering the same name twice replaces the earlier handler.
    pub fn register<F>(mut self, method: impl Into<String>, arity: usize, handler: F) -> Self
    where
        F: FnMut(&mut S, &Request, &mut Turn<'_>) -> Reply + 'static,
    {
        self.commands.insert(
            method.into(),
            Command {
                arity,
                handler: Box::new(handler),
            },
        );
        self
    }

    /// True if `method` has a handler.
    pub fn contains(&self, method: &str) -> bool {
        self.commands.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<S> Default for CommandTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for CommandTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTable")
            .field("methods", &self.methods())
            .finish()
    }
}

/// Where the dispatcher is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Waiting for the next request.
    Listening,
    /// A handler is running or its reply is being written.
    Handling,
}

/// How one turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The handler ran and its reply was written.
    Responded { method: String },
    /// The handler ran and asked for no reply.
    Silent { method: String },
    /// No handler exists; an error reply was written.
    Unknown { method: String },
    /// Wrong argument count; an error reply was written.
    BadArity { method: String },
    /// The request stream is over.
    Ended(SessionEnd),
}

/// Why a session stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The GUI closed its output between requests.
    Closed,
    /// The inbound stream could not be decoded.
    Desync(String),
}

/// Summary returned by [`Dispatcher::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Requests taken from the stream, including unknown ones.
    pub turns: u64,
    /// Requests naming a method with no handler.
    pub unknown: u64,
    pub end: SessionEnd,
}

/// Drives one GUI session: read, handle, reply, repeat.
pub struct Dispatcher<S, R, W> {
    table: CommandTable<S>,
    state: S,
    requests: RequestReader<R>,
    responder: Responder<W>,
    dispatch_state: DispatchState,
    turns: u64,
    unknown: u64,
}

impl<S, R: Read, W: Write> Dispatcher<S, R, W> {
    pub fn new(
        table: CommandTable<S>,
        state: S,
        requests: RequestReader<R>,
        responder: Responder<W>,
    ) -> Self {
        Self {
            table,
            state,
            requests,
            responder,
            dispatch_state: DispatchState::Listening,
            turns: 0,
            unknown: 0,
        }
    }

    pub fn dispatch_state(&self) -> DispatchState {
        self.dispatch_state
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn responder(&self) -> &Responder<W> {
        &self.responder
    }

    /// Give back the handler state and the outbound sink.
    pub fn into_parts(self) -> (S, Responder<W>) {
        (self.state, self.responder)
    }

    /// Run one turn.
    ///
    /// Decode failures end the session and are reported through
    /// [`TurnOutcome::Ended`]. Failing to write to the GUI is an `Err`.
    pub fn step(&mut self) -> Result<TurnOutcome> {
        self.dispatch_state = DispatchState::Listening;

        let request = match self.requests.next() {
            Some(Ok(request)) => request,
            None => return Ok(TurnOutcome::Ended(SessionEnd::Closed)),
            Some(Err(err)) => {
                tracing::warn!(error = %err, turns = self.turns, "request stream desynchronised");
                return Ok(TurnOutcome::Ended(SessionEnd::Desync(err.to_string())));
            }
        };

        self.dispatch_state = DispatchState::Handling;
        self.turns += 1;
        let outcome = self.handle(request);
        self.dispatch_state = DispatchState::Listening;
        outcome
    }

    /// Dispatch until the request stream ends.
    pub fn run(&mut self) -> Result<SessionReport> {
        tracing::info!(commands = self.table.len(), "dispatcher listening");
        loop {
            if let TurnOutcome::Ended(end) = self.step()? {
                let report = SessionReport {
                    turns: self.turns,
                    unknown: self.unknown,
                    end,
                };
                tracing::info!(
                    turns = report.turns,
                    unknown = report.unknown,
                    end = ?report.end,
                    "dispatcher stopped"
                );
                return Ok(report);
            }
        }
    }

    fn handle(&mut self, request: Request) -> Result<TurnOutcome> {
        let method = request.method.clone();

        let Some(command) = self.table.commands.get_mut(&request.method) else {
            self.unknown += 1;
            tracing::warn!(method = %method, "unknown method");
            self.responder
                .respond(&["err".to_string(), format!("unknown method: {method}")])?;
            return Ok(TurnOutcome::Unknown { method });
        };

        if request.args.len() < command.arity {
            let message = format!(
                "{method}: expected at least {} argument(s), got {}",
                command.arity,
                request.args.len()
            );
            tracing::warn!(method = %method, got = request.args.len(), "wrong argument count");
            self.responder.respond(&["err".to_string(), message])?;
            return Ok(TurnOutcome::BadArity { method });
        }

        let mut turn = Turn::new(&mut self.responder);
        let reply = (command.handler)(&mut self.state, &request, &mut turn);
        let markers = turn.finish()?;

        match reply {
            Reply::Values(values) => {
                if values.first().map(String::as_str) == Some("err") {
                    tracing::warn!(
                        method = %method,
                        reason = values.get(1).map(String::as_str).unwrap_or_default(),
                        "handler failed"
                    );
                }
                self.responder.respond(&values)?;
                tracing::debug!(method = %method, values = values.len(), markers, "turn complete");
                Ok(TurnOutcome::Responded { method })
            }
            Reply::Silent => {
                tracing::debug!(method = %method, markers, "turn complete without reply");
                Ok(TurnOutcome::Silent { method })
            }
        }
    }
}
