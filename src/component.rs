//! Component identity and description values.
//!
//! A `ComponentRef` stands in for the component function or class itself;
//! a `ComponentDescription` is the "element" built from it — the component
//! plus the props to render it with. The display name derived here is the
//! stable identity used for log labels, default aliases, and the style
//! cache key: description objects are recreated on every recompilation
//! cycle, but their name is not.

use serde_json::Value;

/// Default alias for components that declare no name at all.
pub const FALLBACK_DISPLAY_NAME: &str = "Component";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentRef {
    /// The declared (constructor) name, if any.
    pub name: Option<String>,
    /// An explicit display name, preferred over the declared name.
    pub display_name: Option<String>,
}

impl ComponentRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            display_name: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Display name > declared name > generic fallback.
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(FALLBACK_DISPLAY_NAME)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDescription {
    pub component: ComponentRef,
    pub props: Value,
}

impl ComponentDescription {
    pub fn new(component: ComponentRef) -> Self {
        Self {
            component,
            props: Value::Null,
        }
    }

    pub fn with_props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    pub fn display_name(&self) -> &str {
        self.component.display_name()
    }
}

/// Resolve the name a mount registers under: explicit alias first, then the
/// component's own identity chain.
pub fn resolve_display_name(alias: Option<&str>, component: &ComponentRef) -> String {
    match alias {
        Some(alias) => alias.to_string(),
        None => component.display_name().to_string(),
    }
}
