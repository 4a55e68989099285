//! Minimal document model backing each sandbox.
//!
//! This is deliberately not a DOM implementation: it carries exactly the
//! structure the harness needs — an element tree for the mount point and
//! inlined scripts, head styles, and document-level event listeners with
//! `write`/`close` replacement semantics so every mount starts from a
//! genuinely blank page.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

// =============================================================================
// ELEMENT TREE
// =============================================================================

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn append(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Concatenated text content of this element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => out.push_str(&e.text()),
            }
        }
        out
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn children_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements().filter(move |e| e.tag == tag)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|e| e.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Node::Element(e) = child {
                if let Some(found) = e.find_by_id_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }
}

// =============================================================================
// EVENTS AND HANDLERS
// =============================================================================

#[derive(Debug, Clone)]
pub struct EventPayload {
    pub name: String,
    pub detail: Value,
}

/// A document-level event handler.
///
/// Cloning shares the underlying closure, so handler identity survives a
/// round trip through the listener registry; `ptr_eq` is the identity test.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&EventPayload)>);

impl Handler {
    pub fn new(f: impl Fn(&EventPayload) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, payload: &EventPayload) {
        (self.0)(payload);
    }

    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0))
    }
}

// =============================================================================
// STYLE SNAPSHOTS
// =============================================================================

/// Snapshot of one `<style>` element, the unit the style cache stores and
/// replays into later sandboxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleElement {
    pub css: String,
    pub scope_attr: Option<String>,
}

impl StyleElement {
    pub fn new(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            scope_attr: None,
        }
    }

    pub fn scoped(css: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            scope_attr: Some(scope.into()),
        }
    }

    pub fn to_element(&self) -> Element {
        let mut el = Element::new("style").with_text(self.css.clone());
        if let Some(scope) = &self.scope_attr {
            el.set_attr("data-scope", scope.clone());
        }
        el
    }

    pub fn from_element(el: &Element) -> Option<Self> {
        if el.tag != "style" {
            return None;
        }
        Some(Self {
            css: el.text(),
            scope_attr: el.attr("data-scope").map(str::to_string),
        })
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// One sandbox document: a head, a body, and document-level listeners.
///
/// `write` rewrites the document from scratch (content and listeners both),
/// matching browser `document.write` after `close`: nothing from a previous
/// mount survives except what the harness explicitly replays.
#[derive(Debug)]
pub struct Document {
    pub head: Element,
    pub body: Element,
    open: bool,
    listeners: Vec<(String, Handler)>,
}

impl Document {
    pub fn blank() -> Self {
        Self {
            head: Element::new("head"),
            body: Element::new("body"),
            open: true,
            listeners: Vec::new(),
        }
    }

    /// Full replacement: prior nodes and prior listeners are discarded and
    /// the document reopens for this content.
    pub fn write(&mut self, head: Element, body: Element) {
        self.head = head;
        self.body = body;
        self.listeners.clear();
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The native listener registration entry point. Appends in call order;
    /// nothing here records — observation happens in the wrapper the sandbox
    /// exposes.
    pub fn add_event_listener(&mut self, event: &str, handler: Handler) {
        self.listeners.push((event.to_string(), handler));
    }

    pub fn listeners(&self) -> &[(String, Handler)] {
        &self.listeners
    }

    pub fn has_listener(&self, event: &str) -> bool {
        self.listeners.iter().any(|(e, _)| e == event)
    }

    /// Invoke every listener registered for `event`, in registration order.
    /// Returns how many handlers ran.
    pub fn dispatch(&self, event: &str, detail: Value) -> usize {
        let payload = EventPayload {
            name: event.to_string(),
            detail,
        };
        let mut invoked = 0;
        for (registered, handler) in &self.listeners {
            if registered == event {
                handler.call(&payload);
                invoked += 1;
            }
        }
        invoked
    }

    /// Head `<style>` elements in document order.
    pub fn head_styles(&self) -> Vec<StyleElement> {
        self.head
            .children_by_tag("style")
            .filter_map(StyleElement::from_element)
            .collect()
    }

    pub fn append_style(&mut self, style: &StyleElement) {
        self.head.append(Node::Element(style.to_element()));
    }

    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        self.body.find_by_id(id)
    }

    pub fn element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.body.find_by_id_mut(id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::blank()
    }
}
