//! Shared fixtures for the integration tests: an in-memory module source
//! reader that counts reads, and a stub rendering library driven by
//! component props.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;

use plinth::component::ComponentDescription;
use plinth::dom::{Handler, Node, StyleElement};
use plinth::errors::{HarnessError, Result};
use plinth::modules::{Module, ModuleDescriptor, SourceReader};
use plinth::sandbox::{Global, ModuleRuntime, SandboxContext, Window};
use plinth::session::{Instance, Render, Request};
use plinth::{MountConfig, Mounter};

pub const RUNTIME_SOURCE: &str = "window.Runtime = {};";
pub const RENDERER_SOURCE: &str = "window.Renderer = {};";

// =============================================================================
// COUNTING SOURCE READER
// =============================================================================

#[derive(Default)]
struct CountingReaderInner {
    sources: RefCell<HashMap<PathBuf, String>>,
    reads: RefCell<HashMap<PathBuf, usize>>,
}

#[derive(Clone, Default)]
pub struct CountingReader(Rc<CountingReaderInner>);

impl CountingReader {
    pub fn with_default_sources() -> Self {
        let reader = Self::default();
        reader.insert("vendor/runtime.umd.js", RUNTIME_SOURCE);
        reader.insert("vendor/renderer.umd.js", RENDERER_SOURCE);
        reader
    }

    pub fn insert(&self, location: &str, source: &str) {
        self.0
            .sources
            .borrow_mut()
            .insert(PathBuf::from(location), source.to_string());
    }

    pub fn reads(&self, location: &str) -> usize {
        self.0
            .reads
            .borrow()
            .get(Path::new(location))
            .copied()
            .unwrap_or(0)
    }
}

impl SourceReader for CountingReader {
    fn read(&self, location: &Path) -> io::Result<String> {
        *self
            .0
            .reads
            .borrow_mut()
            .entry(location.to_path_buf())
            .or_insert(0) += 1;
        self.0
            .sources
            .borrow()
            .get(location)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such module source"))
    }
}

// =============================================================================
// STUB RENDERING LIBRARY
// =============================================================================

/// What the stub renderer hands back as the mounted instance.
pub struct RenderedInstance {
    pub name: String,
    pub props: Value,
}

/// Prop-driven renderer: writes a `<component>` element under the mount
/// point, injects `props.styles`, sends `props.fetch` through the window
/// transport, raises `props.alert`, and fails when `props.fail` is set.
/// Document listeners queued via [`StubRenderer::listen_on_first_render`]
/// are registered once per process, mimicking a runtime's register-once
/// guard.
#[derive(Default)]
pub struct StubRenderer {
    pending_listeners: RefCell<HashMap<String, Vec<(String, Handler)>>>,
}

impl StubRenderer {
    pub fn listen_on_first_render(&self, component: &str, event: &str, handler: Handler) {
        self.pending_listeners
            .borrow_mut()
            .entry(component.to_string())
            .or_default()
            .push((event.to_string(), handler));
    }
}

impl Render for StubRenderer {
    fn render(
        &self,
        description: &ComponentDescription,
        sandbox: &mut SandboxContext,
    ) -> Result<Instance> {
        let name = description.display_name().to_string();
        let props = &description.props;

        if props.get("fail").is_some() {
            return Err(HarnessError::RenderFailed {
                component: name,
                message: "stub renderer was told to fail".to_string(),
            });
        }

        let mut rendered = plinth::dom::Element::new("component").with_attr("name", name.clone());
        if let Some(text) = props.get("text").and_then(Value::as_str) {
            rendered = rendered.with_text(text);
        }
        sandbox
            .mount_point_mut()
            .ok_or(HarnessError::MountPointMissing)?
            .append(Node::Element(rendered));

        if let Some(styles) = props.get("styles").and_then(Value::as_array) {
            for css in styles.iter().filter_map(Value::as_str) {
                sandbox.document.append_style(&StyleElement::new(css));
            }
        }

        // Register-once: queued listeners are consumed on first render.
        let queued = self.pending_listeners.borrow_mut().remove(&name);
        for (event, handler) in queued.into_iter().flatten() {
            sandbox.add_event_listener(&event, handler);
        }

        if let Some(url) = props.get("fetch").and_then(Value::as_str) {
            sandbox.window.transport.send(&Request::get(url));
        }
        if let Some(message) = props.get("alert").and_then(Value::as_str) {
            sandbox.window.alert.alert(message);
        }

        Ok(Rc::new(RenderedInstance {
            name: description.display_name().to_string(),
            props: props.clone(),
        }))
    }
}

/// Runtime whose "renderer" module installs the stub rendering library;
/// every other module becomes a plain script global.
pub struct StubRuntime {
    renderer: Rc<StubRenderer>,
}

impl StubRuntime {
    pub fn new(renderer: Rc<StubRenderer>) -> Self {
        Self { renderer }
    }
}

impl ModuleRuntime for StubRuntime {
    fn install(&self, module: &Module, window: &mut Window) -> Result<()> {
        if module.name == "renderer" {
            window.install(module.name.clone(), Global::Renderer(self.renderer.clone()));
        } else {
            window.install(
                module.name.clone(),
                Global::Script {
                    module: module.name.clone(),
                },
            );
        }
        Ok(())
    }
}

// =============================================================================
// ASSEMBLY HELPERS
// =============================================================================

pub fn descriptors() -> Vec<ModuleDescriptor> {
    vec![
        ModuleDescriptor::file("runtime", "vendor/runtime.umd.js"),
        ModuleDescriptor::file("renderer", "vendor/renderer.umd.js"),
    ]
}

/// A mounter wired to the stub renderer and the counting reader, plus
/// handles to both for assertions.
pub fn stub_mounter() -> (Mounter, Rc<StubRenderer>, CountingReader) {
    let renderer = Rc::new(StubRenderer::default());
    let reader = CountingReader::with_default_sources();
    let mounter = Mounter::new(
        MountConfig::with_modules(descriptors()),
        Rc::new(StubRuntime::new(renderer.clone())),
    )
    .with_reader(Box::new(reader.clone()));
    (mounter, renderer, reader)
}
