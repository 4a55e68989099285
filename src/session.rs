//! Session seam: the collaborators the harness drives but does not own.
//!
//! The surrounding test runner supplies the sandbox slot, the alias table,
//! the structured command log, and the host APIs it wants to observe
//! (request transport and alert). The rendering library arrives through
//! the [`Render`] trait — but at mount time it is always the copy the
//! sandbox's own modules installed, never one held by the session.
//!
//! [`TestSession`] is the reference implementation the crate's own tests
//! run against; real runners implement [`Session`] themselves.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::component::ComponentDescription;
use crate::errors::{HarnessError, Result};
use crate::sandbox::SandboxContext;

/// An opaque mounted instance. The harness never looks inside; it only
/// registers it under an alias and hands it back on lookup.
pub type Instance = Rc<dyn Any>;

// =============================================================================
// HOST API SEAMS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub body: String,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            body: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

/// The window's request transport (the XMLHttpRequest analog). Rebinding it
/// to the session's implementation is what makes component traffic
/// observable and stubbable without touching component code.
pub trait Transport {
    fn send(&self, request: &Request) -> Response;
}

/// The window's alert hook, rebindable the same way.
pub trait AlertSink {
    fn alert(&self, message: &str);
}

/// Placeholder transport a fresh window carries before rebinding.
#[derive(Debug, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&self, _request: &Request) -> Response {
        Response {
            status: 0,
            body: String::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct NullAlert;

impl AlertSink for NullAlert {
    fn alert(&self, _message: &str) {}
}

// =============================================================================
// RENDERING SEAM
// =============================================================================

/// The rendering library: turns a component description into nodes under
/// the sandbox's mount point. Implementations may inject head styles and
/// register document listeners through the sandbox's listener entry point.
pub trait Render {
    fn render(
        &self,
        description: &ComponentDescription,
        sandbox: &mut SandboxContext,
    ) -> Result<Instance>;
}

// =============================================================================
// COMMAND LOG
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub name: String,
    pub message: String,
    pub console_props: Value,
}

impl LogEntry {
    pub fn new(name: impl Into<String>, message: impl Into<String>, console_props: Value) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            console_props,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogState {
    Pending,
    Ended,
}

// =============================================================================
// SESSION TRAIT
// =============================================================================

/// The surrounding test runner, from the harness's point of view.
pub trait Session {
    /// The sandbox slot this test owns. Content is rewritten per mount; the
    /// slot itself outlives the mount.
    fn sandbox(&mut self) -> &mut SandboxContext;

    /// The session's request-interception hook, rebound onto the window.
    fn transport(&self) -> Rc<dyn Transport>;

    /// The session's alert hook, rebound onto the window.
    fn alert(&self) -> Rc<dyn AlertSink>;

    /// Retain a mounted instance under an alias. Re-registering an alias
    /// replaces the previous instance.
    fn register_alias(&mut self, alias: &str, instance: Instance);

    /// The underlying lookup the selector layer delegates to. `"@name"`
    /// selects an alias; errors here are the session's own and propagate
    /// unchanged.
    fn find(&self, selector: &str) -> Result<Instance>;

    fn log(&mut self, entry: LogEntry) -> LogId;

    fn end_log(&mut self, id: LogId);
}

// =============================================================================
// REFERENCE SESSION
// =============================================================================

/// Transport that records every request and answers with a canned response.
#[derive(Debug)]
pub struct RecordingTransport {
    requests: RefCell<Vec<Request>>,
    response: Response,
}

impl RecordingTransport {
    pub fn new(response: Response) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            response,
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new(Response {
            status: 200,
            body: String::new(),
        })
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &Request) -> Response {
        self.requests.borrow_mut().push(request.clone());
        self.response.clone()
    }
}

#[derive(Debug, Default)]
pub struct RecordingAlert {
    messages: RefCell<Vec<String>>,
}

impl RecordingAlert {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl AlertSink for RecordingAlert {
    fn alert(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

const RESET: &str = "\x1b[0m";
const CYAN: &str = "\x1b[36m";

/// In-process session for exercising the harness: alias table, recorded
/// command log, recording transport and alert sink. With `verbose` set,
/// log entries echo to stderr, colored when stderr is a terminal.
pub struct TestSession {
    sandbox: SandboxContext,
    aliases: Vec<(String, Instance)>,
    logs: Vec<(LogEntry, LogState)>,
    transport: Rc<RecordingTransport>,
    alert: Rc<RecordingAlert>,
    verbose: bool,
    use_colors: bool,
}

impl TestSession {
    pub fn new() -> Self {
        Self {
            sandbox: SandboxContext::new(),
            aliases: Vec::new(),
            logs: Vec::new(),
            transport: Rc::new(RecordingTransport::default()),
            alert: Rc::new(RecordingAlert::default()),
            verbose: false,
            use_colors: atty::is(atty::Stream::Stderr),
        }
    }

    pub fn verbose(mut self, on: bool) -> Self {
        self.verbose = on;
        self
    }

    pub fn with_transport(mut self, transport: RecordingTransport) -> Self {
        self.transport = Rc::new(transport);
        self
    }

    pub fn logs(&self) -> &[(LogEntry, LogState)] {
        &self.logs
    }

    pub fn alias_names(&self) -> Vec<&str> {
        self.aliases.iter().map(|(a, _)| a.as_str()).collect()
    }

    /// Requests the mounted component sent through the rebound transport.
    pub fn requests(&self) -> Vec<Request> {
        self.transport.requests()
    }

    /// Messages the mounted component sent through the rebound alert hook.
    pub fn alerts(&self) -> Vec<String> {
        self.alert.messages()
    }

    pub fn sandbox_ref(&self) -> &SandboxContext {
        &self.sandbox
    }

    fn colorize(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", CYAN, text, RESET)
        } else {
            text.to_string()
        }
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Session for TestSession {
    fn sandbox(&mut self) -> &mut SandboxContext {
        &mut self.sandbox
    }

    fn transport(&self) -> Rc<dyn Transport> {
        self.transport.clone()
    }

    fn alert(&self) -> Rc<dyn AlertSink> {
        self.alert.clone()
    }

    fn register_alias(&mut self, alias: &str, instance: Instance) {
        match self.aliases.iter_mut().find(|(a, _)| a == alias) {
            Some(slot) => slot.1 = instance,
            None => self.aliases.push((alias.to_string(), instance)),
        }
    }

    fn find(&self, selector: &str) -> Result<Instance> {
        let alias = selector.strip_prefix('@').unwrap_or(selector);
        self.aliases
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, instance)| instance.clone())
            .ok_or_else(|| HarnessError::AliasNotFound {
                alias: alias.to_string(),
            })
    }

    fn log(&mut self, entry: LogEntry) -> LogId {
        if self.verbose {
            eprintln!("{}: {}", self.colorize(&entry.name), entry.message);
        }
        self.logs.push((entry, LogState::Pending));
        LogId(self.logs.len() - 1)
    }

    fn end_log(&mut self, id: LogId) {
        if let Some((_, state)) = self.logs.get_mut(id.0) {
            *state = LogState::Ended;
        }
    }
}
