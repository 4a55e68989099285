//! Run-level configuration: which module files are inlined into every
//! sandbox, and where to read them from.
//!
//! Known module names carry default install locations; a YAML file or
//! builder-style overrides replace them per run. Configuration problems
//! are fatal setup errors — a run with missing modules cannot produce a
//! meaningful sandbox.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{HarnessError, Result};
use crate::modules::ModuleDescriptor;

/// Default descriptors, in dependency order: the base runtime executes
/// before the rendering layer built on it.
static DEFAULT_MODULES: Lazy<Vec<ModuleDescriptor>> = Lazy::new(|| {
    vec![
        ModuleDescriptor::file("runtime", "vendor/runtime.umd.js"),
        ModuleDescriptor::file("renderer", "vendor/renderer.umd.js"),
    ]
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    pub modules: Vec<ModuleDescriptor>,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            modules: DEFAULT_MODULES.clone(),
        }
    }
}

impl MountConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the module list wholesale, keeping the caller's order.
    pub fn with_modules(modules: Vec<ModuleDescriptor>) -> Self {
        Self { modules }
    }

    /// Override the location of a known module by name; unknown names are
    /// appended at the end of the load order.
    pub fn override_location(&mut self, name: &str, location: impl Into<PathBuf>) -> &mut Self {
        let location = location.into();
        match self.modules.iter_mut().find(|m| m.name == name) {
            Some(module) => module.location = location,
            None => self.modules.push(ModuleDescriptor::file(name, location)),
        }
        self
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| HarnessError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }
}
