//! Plinth: an isolated mount harness for component tests.
//!
//! Every mount gets a disposable document sandbox, assembled from scratch
//! with the run's cached runtime modules inlined. State that must survive
//! between sandboxes — module sources, document-level event listeners,
//! component styles lost to recompilation — lives in explicit run-scoped
//! caches owned by the [`Mounter`], never in ambient globals.

pub use crate::component::{ComponentDescription, ComponentRef};
pub use crate::config::MountConfig;
pub use crate::errors::{HarnessError, Result};
pub use crate::mount::Mounter;
pub use crate::selector::{find, Selector};
pub use crate::session::{Instance, Session, TestSession};

pub mod component;
pub mod config;
pub mod dom;
pub mod errors;
pub mod listeners;
pub mod modules;
pub mod mount;
pub mod sandbox;
pub mod selector;
pub mod session;
pub mod styles;
