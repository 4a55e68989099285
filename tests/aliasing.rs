//! Alias registration and selector resolution against the reference
//! session.

mod common;

use std::rc::Rc;

use serde_json::json;

use common::{stub_mounter, RenderedInstance};
use plinth::component::{ComponentDescription, ComponentRef};
use plinth::session::Session;
use plinth::{find, HarnessError, Selector, TestSession};

fn describe(name: &str) -> ComponentDescription {
    ComponentDescription::new(ComponentRef::named(name))
}

#[test]
fn mount_registers_under_the_display_name_by_default() {
    let (mut mounter, _renderer, _reader) = stub_mounter();
    let mut session = TestSession::new();

    mounter.mount(&mut session, &describe("Hello"), None).unwrap();

    let instance = session.find("@Hello").unwrap();
    let instance = instance.downcast::<RenderedInstance>().unwrap();
    assert_eq!(instance.name, "Hello");
}

#[test]
fn explicit_alias_registers_under_that_alias_only() {
    let (mut mounter, _renderer, _reader) = stub_mounter();
    let mut session = TestSession::new();

    mounter
        .mount(&mut session, &describe("Hello"), Some("X"))
        .unwrap();

    assert!(session.find("@X").is_ok());
    assert!(matches!(
        session.find("@Hello"),
        Err(HarnessError::AliasNotFound { .. })
    ));
}

#[test]
fn anonymous_components_get_the_generic_alias() {
    let (mut mounter, _renderer, _reader) = stub_mounter();
    let mut session = TestSession::new();

    let description = ComponentDescription::new(ComponentRef::anonymous());
    mounter.mount(&mut session, &description, None).unwrap();

    assert!(session.find("@Component").is_ok());
}

#[test]
fn reference_description_and_alias_lookups_agree() {
    let (mut mounter, _renderer, _reader) = stub_mounter();
    let mut session = TestSession::new();

    let component = ComponentRef::named("Hello");
    let description =
        ComponentDescription::new(component.clone()).with_props(json!({ "n": 1 }));
    mounter.mount(&mut session, &description, None).unwrap();

    let by_alias = find(&session, "@Hello").unwrap();
    let by_reference = find(&session, component).unwrap();
    let by_description = find(&session, description).unwrap();

    assert!(Rc::ptr_eq(&by_alias, &by_reference));
    assert!(Rc::ptr_eq(&by_alias, &by_description));
}

#[test]
fn display_name_drives_selector_resolution_for_renamed_components() {
    let (mut mounter, _renderer, _reader) = stub_mounter();
    let mut session = TestSession::new();

    let component = ComponentRef::named("HelloImpl").with_display_name("Hello");
    let description = ComponentDescription::new(component.clone());
    mounter.mount(&mut session, &description, None).unwrap();

    assert_eq!(Selector::from(component.clone()).resolve(), "@Hello");
    assert!(find(&session, component).is_ok());
    assert!(matches!(
        session.find("@HelloImpl"),
        Err(HarnessError::AliasNotFound { .. })
    ));
}

#[test]
fn lookup_errors_propagate_from_the_session_unchanged() {
    let (_mounter, _renderer, _reader) = stub_mounter();
    let session = TestSession::new();

    let err = find(&session, "@Nothing").unwrap_err();
    assert!(matches!(err, HarnessError::AliasNotFound { ref alias } if alias == "Nothing"));
}

#[test]
fn remounting_replaces_the_aliased_instance() {
    let (mut mounter, _renderer, _reader) = stub_mounter();
    let mut session = TestSession::new();

    mounter
        .mount(&mut session, &describe("Hello").with_props(json!({ "v": 1 })), None)
        .unwrap();
    let first = session.find("@Hello").unwrap();

    mounter
        .mount(&mut session, &describe("Hello").with_props(json!({ "v": 2 })), None)
        .unwrap();
    let second = session.find("@Hello").unwrap();

    assert!(!Rc::ptr_eq(&first, &second));
    let second = second.downcast::<RenderedInstance>().unwrap();
    assert_eq!(second.props["v"], 2);
}
