//! Write-protection and deep-freeze behavior.
//!
//! Only the root may write directly when `freeze` is enabled; every
//! inherited composite read on a non-root node comes back as a frozen view
//! that rejects writes arbitrarily deep, carrying the dotted access path.

use lamina::{Context, ContextOptions, Value};
use serde_json::json;

fn root_with(value: serde_json::Value) -> Context {
    Context::from_json(value, ContextOptions::default()).unwrap()
}

// =============================================================================
// ROOT WRITES
// =============================================================================

#[test]
fn test_root_writes_directly() {
    let root = root_with(json!({}));
    root.set("human", json!({ "name": "bob" })).unwrap();
    assert_eq!(root.get_json("human"), Some(json!({ "name": "bob" })));

    // Overwriting an existing property is fine on the root
    root.set("human", json!({ "name": "carol" })).unwrap();
    assert_eq!(root.get_json("human"), Some(json!({ "name": "carol" })));
}

#[test]
fn test_root_reads_stay_live() {
    let root = root_with(json!({ "human": { "name": "bob" } }));

    let human = match root.get("human") {
        Some(Value::Live(view)) => view,
        other => panic!("expected live view, got {:?}", other),
    };
    human.set("name", json!("alice")).unwrap();

    assert_eq!(root.get_json("human"), Some(json!({ "name": "alice" })));

    // The view reflects the backing, not a snapshot
    root.set("human", json!({ "name": "dan" })).unwrap();
    assert_eq!(human.get_json("name"), Some(json!("dan")));
}

#[test]
fn test_live_view_nested_writes() {
    let root = root_with(json!({ "cfg": { "net": { "port": 80 } } }));

    let cfg = match root.get("cfg") {
        Some(Value::Live(view)) => view,
        other => panic!("expected live view, got {:?}", other),
    };
    let net = match cfg.get("net") {
        Some(Value::Live(view)) => view,
        other => panic!("expected live view, got {:?}", other),
    };
    net.set("port", json!(8080)).unwrap();
    net.remove("missing").unwrap();

    assert_eq!(
        root.get_json("cfg"),
        Some(json!({ "net": { "port": 8080 } }))
    );

    // A dangling view errors instead of writing elsewhere
    root.set("cfg", json!(1)).unwrap();
    let err = net.set("port", json!(1)).unwrap_err();
    assert_eq!(err.setter_path(), Some("ctx.cfg.net.port"));
}

// =============================================================================
// NON-ROOT WRITE PROTECTION
// =============================================================================

#[test]
fn test_child_cannot_write_any_property() {
    let root = root_with(json!({ "human": { "name": "bob" } }));
    let child = root.snapshot(None).unwrap();

    let err = child.set("human", json!("modified")).unwrap_err();
    assert_eq!(err.setter_path(), Some("ctx.human"));

    // Fresh names are just as illegal under freeze
    let err = child.set("new_key", json!(1)).unwrap_err();
    assert_eq!(err.setter_path(), Some("ctx.new_key"));

    assert_eq!(root.get_json("human"), Some(json!({ "name": "bob" })));
}

#[test]
fn test_child_reads_are_frozen() {
    let root = root_with(json!({ "human": { "name": "bob" } }));
    let child = root.snapshot(None).unwrap();

    let human = match child.get("human") {
        Some(Value::Frozen(view)) => view,
        other => panic!("expected frozen view, got {:?}", other),
    };
    let err = human.set("name", json!("modified")).unwrap_err();
    assert_eq!(err.setter_path(), Some("ctx.human.name"));

    // Scalars pass through unwrapped
    let root = root_with(json!({ "name": "alice" }));
    let child = root.snapshot(None).unwrap();
    assert_eq!(child.get("name"), Some(Value::Data(json!("alice"))));
}

#[test]
fn test_freeze_recurses_arbitrarily_deep() {
    let root = root_with(json!({ "cfg": { "net": { "hosts": [{ "port": 80 }] } } }));
    let child = root.snapshot(None).unwrap();

    let cfg = match child.get("cfg") {
        Some(Value::Frozen(view)) => view,
        other => panic!("expected frozen view, got {:?}", other),
    };
    let net = match cfg.get("net") {
        Some(Value::Frozen(view)) => view,
        other => panic!("expected frozen view, got {:?}", other),
    };
    let hosts = match net.get("hosts") {
        Some(Value::Frozen(view)) => view,
        other => panic!("expected frozen view, got {:?}", other),
    };
    let host = match hosts.index(0) {
        Some(Value::Frozen(view)) => view,
        other => panic!("expected frozen view, got {:?}", other),
    };

    let err = host.set("port", json!(8080)).unwrap_err();
    assert_eq!(err.setter_path(), Some("ctx.cfg.net.hosts.0.port"));
    let err = host.remove("port").unwrap_err();
    assert_eq!(err.setter_path(), Some("ctx.cfg.net.hosts.0.port"));
}

#[test]
fn test_grandchild_reads_are_frozen() {
    let root = root_with(json!({ "human": { "name": "bob" } }));
    let child = root.snapshot(None).unwrap();
    let grandchild = child.snapshot(None).unwrap();

    assert!(matches!(
        grandchild.get("human"),
        Some(Value::Frozen(_))
    ));
    assert_eq!(
        grandchild.get_json("human"),
        Some(json!({ "name": "bob" }))
    );
}

#[test]
fn test_repeated_reads_are_equal() {
    let root = root_with(json!({ "human": { "name": "bob" } }));
    let child = root.snapshot(None).unwrap();

    let first = child.get("human");
    let second = child.get("human");
    assert_eq!(first, second);
}

// =============================================================================
// FREEZE DISABLED
// =============================================================================

#[test]
fn test_unfrozen_child_writes_its_own_backing() {
    let root = root_with(json!({ "name": "alice" }));
    let child = root
        .snapshot(Some(ContextOptions {
            freeze: false,
            ..Default::default()
        }))
        .unwrap();

    child.set("own", json!({ "k": 1 })).unwrap();
    assert_eq!(child.get_json("own"), Some(json!({ "k": 1 })));
    assert_eq!(root.get_json("own"), None);

    // Inherited reads come back live, bound to the owning root
    let human = root_with(json!({ "human": { "name": "bob" } }));
    let child = human
        .snapshot(Some(ContextOptions {
            freeze: false,
            ..Default::default()
        }))
        .unwrap();
    let view = match child.get("human") {
        Some(Value::Live(view)) => view,
        other => panic!("expected live view, got {:?}", other),
    };
    view.set("name", json!("eve")).unwrap();
    assert_eq!(human.get_json("human"), Some(json!({ "name": "eve" })));
}

// =============================================================================
// RESERVED NAMES
// =============================================================================

#[test]
fn test_built_in_names_not_writable() {
    let root = root_with(json!({}));
    for name in ["root", "parent", "state", "decorate", "snapshot", "clone", "set_state"] {
        let err = root.set(name, json!(1)).unwrap_err();
        assert_eq!(err.setter_path(), Some(format!("ctx.{}", name).as_str()));
    }
}

#[test]
fn test_decorator_names_not_writable() {
    let root = root_with(json!({}));
    root.decorate("hi", Value::function(|_, _| Ok(json!("hi"))))
        .unwrap();

    let err = root.set("hi", json!(1)).unwrap_err();
    assert_eq!(err.setter_path(), Some("ctx.hi"));
}

#[test]
fn test_function_properties_pass_through_freeze() {
    let mut source = lamina::ContextMap::new();
    source.insert("age".to_string(), Value::function(|_, _| Ok(json!(25))));
    let root = Context::new(source, ContextOptions::default()).unwrap();
    let child = root.snapshot(None).unwrap();

    // Functions are not composites; they are never wrapped
    assert!(child.get("age").map_or(false, |v| v.is_function()));
    assert_eq!(child.call("age", &[]).unwrap(), json!(25));
}

#[test]
fn test_object_decorator_frozen_for_every_reader() {
    let root = root_with(json!({}));
    root.decorate("bro", Value::data(json!({ "name": "bob" })))
        .unwrap();

    // Frozen at registration: even the root reads it frozen
    let view = match root.get("bro") {
        Some(Value::Frozen(view)) => view,
        other => panic!("expected frozen view, got {:?}", other),
    };
    let err = view.set("name", json!("x")).unwrap_err();
    assert_eq!(err.setter_path(), Some("ctx.bro.name"));

    // And a frozen child does not re-wrap it
    let child = root.snapshot(None).unwrap();
    let through_child = match child.get("bro") {
        Some(Value::Frozen(view)) => view,
        other => panic!("expected frozen view, got {:?}", other),
    };
    assert_eq!(through_child.path(), "ctx.bro");
}
