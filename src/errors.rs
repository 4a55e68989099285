//! Harness error handling.
//!
//! One public error enum covers the whole taxonomy: fatal run-setup errors
//! (unreadable module or configuration files), per-mount failures (sandbox
//! assembly and render), and lookup misses surfaced by the session's own
//! alias mechanism. Cache misses — no styles captured yet, no listeners
//! recorded yet — are valid empty states and never appear here.
//!
//! Propagation policy: every error bubbles to the caller unmodified. The
//! harness performs no suppression, translation, or retry; this is test
//! infrastructure, and silent recovery would hide real defects.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Error, Diagnostic, Debug)]
pub enum HarnessError {
    /// A configured module file could not be read at run setup.
    ///
    /// Fatal to the whole run: modules are runtime dependencies that must
    /// all be present, so there is no partial-module fallback.
    #[error("failed to read module '{name}' from {}", location.display())]
    #[diagnostic(code(plinth::setup::module_read))]
    ModuleRead {
        name: String,
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read harness configuration from {}", path.display())]
    #[diagnostic(code(plinth::setup::config_read))]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed harness configuration in {}", path.display())]
    #[diagnostic(code(plinth::setup::config_parse))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The module runtime could not turn an inlined module into window
    /// globals. Aborts the current mount before anything renders.
    #[error("module runtime failed to install '{module}': {message}")]
    #[diagnostic(code(plinth::sandbox::runtime_install))]
    RuntimeInstall { module: String, message: String },

    #[error("sandbox document has no mount point element")]
    #[diagnostic(
        code(plinth::mount::mount_point_missing),
        help("the sandbox initializer writes a '#plinth-root' element into the body; a renderer or stub may have rewritten the document out from under the mount")
    )]
    MountPointMissing,

    #[error("no rendering library found among the injected modules {modules:?}")]
    #[diagnostic(
        code(plinth::mount::renderer_unavailable),
        help("exactly the modules inlined into the sandbox are searched — the test session's own rendering library is never consulted; check that one configured module installs a renderer global")
    )]
    RendererUnavailable { modules: Vec<String> },

    #[error("failed to render <{component} ... />: {message}")]
    #[diagnostic(code(plinth::mount::render_failed))]
    RenderFailed { component: String, message: String },

    /// Produced by the underlying lookup mechanism when an alias has no
    /// registered instance. The selector layer delegates and never
    /// translates this.
    #[error("no mounted instance registered under alias '@{alias}'")]
    #[diagnostic(code(plinth::lookup::alias_not_found))]
    AliasNotFound { alias: String },
}
