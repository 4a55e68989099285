//! Sandbox assembly: a blank document with the cached modules inlined and
//! prior document listeners replayed.
//!
//! The sandbox slot itself is owned by the surrounding test; what this
//! module guarantees is that initializing it for a mount rewrites the
//! document from scratch (`write` + `close` semantics) and rebuilds the
//! window, so nothing from a previous mount leaks in except through the
//! explicit listener replay.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::{Document, Element, Handler, Node};
use crate::errors::Result;
use crate::listeners::{ListenerRegistry, RecordingRegistrar};
use crate::modules::Module;
use crate::session::{AlertSink, NullAlert, NullTransport, Render, Transport};

/// Id of the element components render into.
pub const MOUNT_POINT_ID: &str = "plinth-root";

// =============================================================================
// WINDOW
// =============================================================================

/// A global a module's script installed on the window.
pub enum Global {
    /// A plain script global, present but opaque to the harness.
    Script { module: String },
    /// A rendering library this module provides.
    Renderer(Rc<dyn Render>),
}

impl fmt::Debug for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Global::Script { module } => write!(f, "Script({module})"),
            Global::Renderer(_) => write!(f, "Renderer(..)"),
        }
    }
}

/// The sandbox window: module globals plus the rebindable host APIs.
/// Rebuilt per mount; transport and alert start as inert placeholders and
/// are replaced with the session's hooks before anything renders.
pub struct Window {
    globals: BTreeMap<String, Global>,
    pub transport: Rc<dyn Transport>,
    pub alert: Rc<dyn AlertSink>,
}

impl Window {
    pub fn new() -> Self {
        Self {
            globals: BTreeMap::new(),
            transport: Rc::new(NullTransport),
            alert: Rc::new(NullAlert),
        }
    }

    pub fn install(&mut self, name: impl Into<String>, global: Global) {
        self.globals.insert(name.into(), global);
    }

    pub fn has_global(&self, name: &str) -> bool {
        self.globals.contains_key(name)
    }

    pub fn global_names(&self) -> impl Iterator<Item = &str> {
        self.globals.keys().map(String::as_str)
    }

    /// The rendering library installed by this window's own modules, if any.
    pub fn renderer(&self) -> Option<Rc<dyn Render>> {
        self.globals.values().find_map(|g| match g {
            Global::Renderer(r) => Some(r.clone()),
            Global::Script { .. } => None,
        })
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("globals", &self.globals)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// MODULE RUNTIME
// =============================================================================

/// Script evaluation seam: turns one inlined module into window globals.
/// Called once per module, in module order, before any component code runs.
pub trait ModuleRuntime {
    fn install(&self, module: &Module, window: &mut Window) -> Result<()>;
}

/// Registers one opaque script global per module and nothing else. Enough
/// for tests that only care about globals being present; mounts need a
/// runtime whose rendering module installs an actual [`Render`] global.
#[derive(Debug, Default)]
pub struct MarkerRuntime;

impl ModuleRuntime for MarkerRuntime {
    fn install(&self, module: &Module, window: &mut Window) -> Result<()> {
        window.install(
            module.name.clone(),
            Global::Script {
                module: module.name.clone(),
            },
        );
        Ok(())
    }
}

// =============================================================================
// SANDBOX CONTEXT
// =============================================================================

/// One document/window pair. The surrounding test owns it; `initialize`
/// makes its content fresh for each mount.
pub struct SandboxContext {
    pub document: Document,
    pub window: Window,
    recorder: Option<Rc<RefCell<ListenerRegistry>>>,
}

impl SandboxContext {
    pub fn new() -> Self {
        Self {
            document: Document::blank(),
            window: Window::new(),
            recorder: None,
        }
    }

    /// The listener entry point component code sees. Once a mount has
    /// installed the recorder, every call is observed and forwarded to the
    /// native registration; outside a mount it is the native call alone.
    pub fn add_event_listener(&mut self, event: &str, handler: Handler) {
        if let Some(registry) = self.recorder.clone() {
            let mut registry = registry.borrow_mut();
            RecordingRegistrar::new(&mut registry).register(&mut self.document, event, handler);
        } else {
            self.document.add_event_listener(event, handler);
        }
    }

    pub fn mount_point(&self) -> Option<&Element> {
        self.document.element_by_id(MOUNT_POINT_ID)
    }

    pub fn mount_point_mut(&mut self) -> Option<&mut Element> {
        self.document.element_by_id_mut(MOUNT_POINT_ID)
    }
}

impl Default for SandboxContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SandboxContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SandboxContext")
            .field("document", &self.document)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// INITIALIZATION
// =============================================================================

/// Build the sandbox for one mount.
///
/// Rewrites the document with a minimal page — one mount point element and
/// one inline script per module, in the supplied order — rebuilds the
/// window with each module's globals installed in that same order, wires
/// the recording registrar, and replays previously observed document
/// listeners before returning.
pub fn initialize(
    ctx: &mut SandboxContext,
    modules: &[Module],
    runtime: &dyn ModuleRuntime,
    registry: &Rc<RefCell<ListenerRegistry>>,
) -> Result<()> {
    // Fresh window first: a runtime failure must not leave a half-torn
    // sandbox with the previous mount's globals still visible.
    let mut window = Window::new();
    for module in modules {
        runtime.install(module, &mut window)?;
    }

    let head = Element::new("head").with_child(Element::new("meta").with_attr("charset", "utf-8"));
    let mut body = Element::new("body");
    body.append(Node::Element(
        Element::new("div").with_attr("id", MOUNT_POINT_ID),
    ));
    for module in modules {
        body.append(Node::Element(
            Element::new("script")
                .with_attr("data-module", module.name.clone())
                .with_text(module.source.clone()),
        ));
    }

    ctx.document.write(head, body);
    ctx.document.close();
    ctx.window = window;
    ctx.recorder = Some(registry.clone());

    // Replay through the native registration: restored listeners are
    // already recorded, re-observing them would duplicate the registry.
    registry.borrow().restore(&mut ctx.document);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{ModuleDescriptor, ModuleKind};

    fn module(name: &str, source: &str) -> Module {
        let descriptor = ModuleDescriptor::file(name, format!("vendor/{name}.js"));
        Module {
            name: descriptor.name,
            kind: ModuleKind::File,
            location: descriptor.location,
            source: source.to_string(),
        }
    }

    fn registry() -> Rc<RefCell<ListenerRegistry>> {
        Rc::new(RefCell::new(ListenerRegistry::new()))
    }

    #[test]
    fn initialize_writes_mount_point_and_scripts_in_order() {
        let mut ctx = SandboxContext::new();
        let modules = [module("runtime", "r-src"), module("renderer", "d-src")];

        initialize(&mut ctx, &modules, &MarkerRuntime, &registry()).unwrap();

        assert!(ctx.mount_point().is_some());
        assert!(!ctx.document.is_open());
        let scripts: Vec<_> = ctx
            .document
            .body
            .children_by_tag("script")
            .filter_map(|s| s.attr("data-module"))
            .collect();
        assert_eq!(scripts, vec!["runtime", "renderer"]);
        assert!(ctx.window.has_global("runtime"));
        assert!(ctx.window.has_global("renderer"));
    }

    #[test]
    fn initialize_discards_previous_mount_content() {
        let mut ctx = SandboxContext::new();
        let modules = [module("runtime", "src")];
        let registry = registry();

        initialize(&mut ctx, &modules, &MarkerRuntime, &registry).unwrap();
        ctx.mount_point_mut()
            .unwrap()
            .append(Node::Element(Element::new("widget").with_attr("id", "w1")));
        ctx.window.install(
            "stale",
            Global::Script {
                module: "stale".to_string(),
            },
        );

        initialize(&mut ctx, &modules, &MarkerRuntime, &registry).unwrap();

        assert!(ctx.document.element_by_id("w1").is_none());
        assert!(!ctx.window.has_global("stale"));
    }

    #[test]
    fn listeners_registered_through_sandbox_survive_reinitialization() {
        let mut ctx = SandboxContext::new();
        let modules = [module("runtime", "src")];
        let registry = registry();
        initialize(&mut ctx, &modules, &MarkerRuntime, &registry).unwrap();

        let handler = Handler::new(|_| {});
        ctx.add_event_listener("click", handler.clone());

        initialize(&mut ctx, &modules, &MarkerRuntime, &registry).unwrap();

        let (event, restored) = &ctx.document.listeners()[0];
        assert_eq!(event, "click");
        assert!(restored.ptr_eq(&handler));
        // Replay went through the native registration, not the recorder.
        assert_eq!(registry.borrow().len(), 1);
    }
}
