//! Mount orchestration: the single public entry point.
//!
//! One mount runs through fixed stages, strictly in order and on the
//! caller's thread: resolve the display name, ensure the module cache,
//! rebuild the sandbox (which replays recorded listeners), rebind the host
//! APIs, render with the sandbox's own rendering library, register the
//! alias, reconcile styles, and emit the command log entry. Any failure up
//! to and including the render aborts the mount with no alias registered;
//! style reconciliation after a successful render can only downgrade to a
//! log note, never to a failure.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};

use crate::component::{resolve_display_name, ComponentDescription};
use crate::config::MountConfig;
use crate::errors::{HarnessError, Result};
use crate::listeners::ListenerRegistry;
use crate::modules::{FsReader, ModuleCache, SourceReader};
use crate::sandbox::{self, ModuleRuntime};
use crate::session::{LogEntry, Session};
use crate::styles::{StyleCache, StyleOutcome};

/// Owns the run-scoped state — module cache, listener registry, style
/// cache — and sequences mounts against a session. One `Mounter` per
/// test-suite run; its caches live exactly as long as it does.
pub struct Mounter {
    config: MountConfig,
    runtime: Rc<dyn ModuleRuntime>,
    reader: Box<dyn SourceReader>,
    modules: ModuleCache,
    listeners: Rc<RefCell<ListenerRegistry>>,
    styles: StyleCache,
}

impl Mounter {
    pub fn new(config: MountConfig, runtime: Rc<dyn ModuleRuntime>) -> Self {
        Self {
            config,
            runtime,
            reader: Box::new(FsReader),
            modules: ModuleCache::new(),
            listeners: Rc::new(RefCell::new(ListenerRegistry::new())),
            styles: StyleCache::new(),
        }
    }

    pub fn with_reader(mut self, reader: Box<dyn SourceReader>) -> Self {
        self.reader = reader;
        self
    }

    /// Run-level setup hook: load the configured modules now instead of on
    /// the first mount. Idempotent; a read failure is fatal to the run.
    pub fn ensure_modules(&mut self) -> Result<()> {
        self.modules
            .ensure_loaded(self.config.modules(), self.reader.as_ref())
    }

    pub fn module_cache(&self) -> &ModuleCache {
        &self.modules
    }

    pub fn style_cache(&self) -> &StyleCache {
        &self.styles
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Mount one component into a fresh sandbox and register the result
    /// under its resolved alias.
    pub fn mount(
        &mut self,
        session: &mut dyn Session,
        description: &ComponentDescription,
        alias: Option<&str>,
    ) -> Result<()> {
        // 1. The resolved name is both the log label and the default alias.
        let name = resolve_display_name(alias, &description.component);

        // 2. Modules load once per run; the sandbox is rebuilt every mount
        //    and replays recorded listeners before anything else touches it.
        let first_load = !self.modules.is_loaded();
        self.ensure_modules()?;
        if first_load {
            let id = session.log(LogEntry::new(
                "modules",
                "initializing module cache",
                Value::Null,
            ));
            session.end_log(id);
        }

        let transport = session.transport();
        let alert = session.alert();

        let instance = {
            let ctx = session.sandbox();
            sandbox::initialize(
                ctx,
                self.modules.get_all(),
                self.runtime.as_ref(),
                &self.listeners,
            )?;

            // 3. Host API rebinding: component traffic goes through the
            //    session's hooks, not the placeholders.
            ctx.window.transport = transport;
            ctx.window.alert = alert;

            // 4. Render with the renderer the sandbox's own modules
            //    installed; the session never supplies its own copy.
            let renderer =
                ctx.window
                    .renderer()
                    .ok_or_else(|| HarnessError::RendererUnavailable {
                        modules: self
                            .modules
                            .get_all()
                            .iter()
                            .map(|m| m.name.clone())
                            .collect(),
                    })?;
            renderer.render(description, ctx)?
        };
        session.register_alias(&name, instance);

        // 5. Styles are keyed by the resolved name and can only produce a
        //    log note, never a mount failure.
        let outcome = self
            .styles
            .reconcile(&name, &mut session.sandbox().document);
        let note = match outcome {
            StyleOutcome::Captured(n) => format!("injected {n} style(s)"),
            StyleOutcome::Replayed(n) => {
                format!("no styles injected, replayed {n} cached style(s)")
            }
            StyleOutcome::Empty => "no styles injected for this component".to_string(),
        };
        let style_log = session.log(LogEntry::new("styles", note, Value::Null));
        session.end_log(style_log);

        // 6. Snapshot the command log entry for the render call.
        let cmd = session.log(LogEntry::new(
            "mount",
            format!("render(<{name} ... />)"),
            json!({ "props": description.props }),
        ));
        session.end_log(cmd);
        Ok(())
    }
}
