//! Selector resolution: retrieve a mounted instance by alias string, by
//! the component description used to mount it, or by the component
//! reference itself.
//!
//! The input kind is an explicit tagged variant decided at the boundary;
//! resolution turns component values into `"@" + display name` using the
//! same derivation the mount orchestrator used, then delegates to the
//! session's own lookup unchanged.

use std::borrow::Cow;

use crate::component::{ComponentDescription, ComponentRef};
use crate::errors::Result;
use crate::session::{Instance, Session};

#[derive(Debug, Clone)]
pub enum Selector {
    /// A plain selector string, passed through untouched (including any
    /// leading `@` the caller already wrote).
    Raw(String),
    /// The component-description value used at mount time.
    Description(ComponentDescription),
    /// The component reference/function value itself.
    Reference(ComponentRef),
}

impl Selector {
    pub fn resolve(&self) -> Cow<'_, str> {
        match self {
            Selector::Raw(s) => Cow::Borrowed(s.as_str()),
            Selector::Description(d) => Cow::Owned(format!("@{}", d.display_name())),
            Selector::Reference(r) => Cow::Owned(format!("@{}", r.display_name())),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Selector::Raw(s.to_string())
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::Raw(s)
    }
}

impl From<ComponentDescription> for Selector {
    fn from(d: ComponentDescription) -> Self {
        Selector::Description(d)
    }
}

impl From<ComponentRef> for Selector {
    fn from(r: ComponentRef) -> Self {
        Selector::Reference(r)
    }
}

/// Resolve and delegate. Lookup errors are the session's own and propagate
/// unchanged.
pub fn find(session: &dyn Session, selector: impl Into<Selector>) -> Result<Instance> {
    let selector = selector.into();
    session.find(&selector.resolve())
}
