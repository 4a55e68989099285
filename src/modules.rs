//! Module cache: run-scoped, load-once storage for runtime module sources.
//!
//! Modules are the scripts inlined into every sandbox (a base runtime, the
//! rendering layer built on it). They are read from disk exactly once per
//! test-suite run, in the caller-supplied order — the order is a dependency
//! order and must survive into the inlined script tags.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{HarnessError, Result};

// =============================================================================
// DESCRIPTORS AND MODULES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub kind: ModuleKind,
    pub location: PathBuf,
}

impl ModuleDescriptor {
    pub fn file(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: ModuleKind::File,
            location: location.into(),
        }
    }
}

/// A loaded module. Immutable once loaded; lives for the whole run.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub kind: ModuleKind,
    pub location: PathBuf,
    pub source: String,
}

// =============================================================================
// SOURCE READING
// =============================================================================

/// Seam over the filesystem so tests can observe (and count) reads.
pub trait SourceReader {
    fn read(&self, location: &Path) -> io::Result<String>;
}

#[derive(Debug, Default)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read(&self, location: &Path) -> io::Result<String> {
        fs::read_to_string(location)
    }
}

// =============================================================================
// CACHE
// =============================================================================

#[derive(Debug, Default)]
pub struct ModuleCache {
    modules: Vec<Module>,
    loaded: bool,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every described module, once per run.
    ///
    /// Idempotent: after the first successful call this is a no-op, even
    /// with different descriptors. A read failure aborts the whole load and
    /// leaves the cache unloaded — there is no partial-module fallback.
    pub fn ensure_loaded(
        &mut self,
        descriptors: &[ModuleDescriptor],
        reader: &dyn SourceReader,
    ) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        let mut modules = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let source =
                reader
                    .read(&descriptor.location)
                    .map_err(|source| HarnessError::ModuleRead {
                        name: descriptor.name.clone(),
                        location: descriptor.location.clone(),
                        source,
                    })?;
            modules.push(Module {
                name: descriptor.name.clone(),
                kind: descriptor.kind,
                location: descriptor.location.clone(),
                source,
            });
        }
        self.modules = modules;
        self.loaded = true;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The cached sequence, in descriptor order. Same slice for the whole
    /// run; never re-fetched.
    pub fn get_all(&self) -> &[Module] {
        &self.modules
    }
}
