//! Integration Tests for Latches
//!
//! These tests drive bits, plain, loop and form latches together over
//! realistic markup.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use latch_core::dom::Node;
use latch_core::{
    init, values, Bit, Capability, Environment, FormLatch, Hook, Latch, LatchError, LatchKind,
    ListStrategy, LoopLatch, MarkupConfig, PlainLatch, Values,
};

fn bit(tag: &str, key: &str) -> Node {
    Node::element(tag).with_class("bit").with_attr("data-key", key)
}

/// A todo row: title, status and a text input bound to the same record.
fn todo_row() -> Node {
    Node::element("li")
        .with_child(bit("span", "title"))
        .with_child(bit("em", "status"))
        .with_child(bit("input", "note"))
}

/// Test that the memoized value only changes on real writes.
#[test]
fn bit_write_is_memoized() {
    let element = Node::element("span");
    let mut bit = Bit::new(element.clone());

    bit.render("v");
    bit.render("v");
    assert_eq!(element.write_count(), 1);
    assert_eq!(bit.current_value(), Some("v"));

    bit.render("v2");
    assert_eq!(element.write_count(), 2);
    assert_eq!(bit.current_value(), Some("v2"));
}

/// Test that a plain latch only touches the keys it is given.
#[test]
fn plain_latch_partial_update() {
    let root = Node::element("div")
        .with_child(bit("span", "a"))
        .with_child(bit("span", "b"));
    let b = root.children()[1].clone();

    let mut latch = PlainLatch::new(root, &values([("a", "0"), ("b", "kept")])).unwrap();
    latch.render(&values([("a", "1")]));

    assert_eq!(b.text_content(), "kept");
    assert_eq!(b.write_count(), 1);
}

/// Test the empty-string-as-absent policy end to end.
#[test]
fn plain_latch_skips_empty_strings() {
    let root = Node::element("div").with_child(bit("span", "a"));
    let mut latch = PlainLatch::from_json(root.clone(), &json!({ "a": "before" })).unwrap();

    latch.render_json(&json!({ "a": "" })).unwrap();
    assert_eq!(root.text_content(), "before");
}

/// Test that clones share no state with their origin.
#[test]
fn clone_independence() {
    let root = Node::element("article")
        .with_child(bit("h1", "title"))
        .with_child(bit("textarea", "body"));
    let mut original =
        PlainLatch::new(root.clone(), &values([("title", "T"), ("body", "B")])).unwrap();

    let mut copy = original.clone_with(&values([("title", "copy")])).unwrap();
    copy.render(&values([("body", "copy body")]));

    assert_eq!(original.bits()[0].element().text_content(), "T");
    assert_eq!(
        original.bits()[1].element().value().as_deref(),
        Some("B")
    );
    assert_eq!(original.bits()[0].current_value(), Some("T"));
    assert_eq!(original.bits()[1].current_value(), Some("B"));

    // the original can still be rendered to a value the copy already shows
    assert_eq!(original.render(&values([("title", "copy")])), 1);
    assert_eq!(copy.bits()[0].element().write_count(), 1);
}

/// Test a loop latch rebuilding its list from JSON state.
#[test]
fn loop_latch_rebuilds_list() {
    let list = Node::element("ul");
    let mut latch = LoopLatch::new(list.clone(), todo_row(), &[]).unwrap();
    assert_eq!(latch.kind(), LatchKind::Loop);

    latch
        .render_json(&json!([
            { "title": "write docs", "status": "done", "note": "n1" },
            { "title": "ship", "status": "todo" }
        ]))
        .unwrap();

    let rows = list.children();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].text_content(), "write docsdone");
    assert_eq!(rows[1].text_content(), "shiptodo");

    let note = rows[0].children()[2].clone();
    assert_eq!(note.value().as_deref(), Some("n1"));

    latch.render(&[]).unwrap();
    assert_eq!(list.child_count(), 0);
}

/// Test the exact list scenario: two items, then none.
#[test]
fn loop_latch_two_items_then_empty() {
    let list = Node::element("div");
    let template = Node::element("p").with_child(bit("span", "x"));
    let mut latch = LoopLatch::new(
        list.clone(),
        template,
        &[values([("x", "1")]), values([("x", "2")])],
    )
    .unwrap();

    let children = list.children();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].text_content(), "1");
    assert_eq!(children[1].text_content(), "2");

    latch.render(&[]).unwrap();
    assert!(list.children().is_empty());
}

/// Test keyed reconciliation keeps element identity across renders.
#[test]
fn keyed_loop_latch_moves_rows() {
    let list = Node::element("ul");
    let rows = [
        values([("title", "a"), ("status", "todo")]),
        values([("title", "b"), ("status", "todo")]),
    ];
    let mut latch = LoopLatch::with_strategy(
        list.clone(),
        todo_row(),
        &rows,
        ListStrategy::keyed("title"),
    )
    .unwrap();
    let a = list.children()[0].clone();
    let b = list.children()[1].clone();

    latch
        .render(&[
            values([("title", "b"), ("status", "done")]),
            values([("title", "a"), ("status", "todo")]),
        ])
        .unwrap();

    let children = list.children();
    assert!(children[0].ptr_eq(&b));
    assert!(children[1].ptr_eq(&a));
    assert_eq!(children[0].text_content(), "bdone");
}

/// Test that sparse items look the same under both list strategies.
#[test]
fn keyed_and_rebuild_agree_on_sparse_items() {
    let template = || Node::element("p").with_child(bit("b", "id")).with_child(bit("i", "x"));
    let rebuilt = Node::element("div");
    let keyed = Node::element("div");
    let initial = [values([("id", "a"), ("x", "1")])];

    let mut rebuild = LoopLatch::new(rebuilt.clone(), template(), &initial).unwrap();
    let mut reconcile =
        LoopLatch::with_strategy(keyed.clone(), template(), &initial, ListStrategy::keyed("id"))
            .unwrap();
    let row = keyed.children()[0].clone();

    for step in [values([("id", "a")]), values([("id", "a"), ("x", "")])] {
        let step = [step];
        rebuild.render(&step).unwrap();
        reconcile.render(&step).unwrap();
        assert_eq!(rebuilt.text_content(), "a");
        assert_eq!(keyed.text_content(), "a");
    }
    assert!(keyed.children()[0].ptr_eq(&row));
}

/// Test that form data and hooks agree on the current field values.
#[test]
fn form_round_trip() {
    let root = Node::element("form")
        .with_child(
            Node::element("input")
                .with_class("bit")
                .with_attr("data-field", "field1")
                .with_attr("value", "foo"),
        )
        .with_child(
            Node::element("input")
                .with_class("bit")
                .with_attr("data-field", "field2")
                .with_attr("value", "bar"),
        )
        .with_child(
            Node::element("button")
                .with_class("bit")
                .with_attr("data-action", "send"),
        );
    let send = root.children()[2].clone();

    let calls = Arc::new(AtomicI32::new(0));
    let received: Arc<Mutex<Option<Values>>> = Arc::new(Mutex::new(None));

    let calls_clone = calls.clone();
    let received_clone = received.clone();
    let form = FormLatch::new(
        root,
        [Hook::new("send", "click", move |fields, event| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            assert_eq!(event.kind(), "click");
            let snapshot: Values = fields
                .iter()
                .map(|(name, node)| (name.clone(), node.value().unwrap_or_default()))
                .collect();
            *received_clone.lock() = Some(snapshot);
        })],
    )
    .unwrap();

    assert_eq!(form.data(), values([("field1", "foo"), ("field2", "bar")]));

    send.dispatch_event("click");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        received.lock().clone(),
        Some(values([("field1", "foo"), ("field2", "bar")]))
    );
}

/// Test that a hook naming a missing action stops construction.
#[test]
fn form_hook_misconfiguration() {
    let root = Node::element("form").with_child(
        Node::element("button")
            .with_class("bit")
            .with_attr("data-action", "save"),
    );

    let err = FormLatch::new(root, [Hook::new("delete", "click", |_, _| {})]).unwrap_err();
    assert!(matches!(err, LatchError::UnknownAction { ref action } if action == "delete"));
}

/// Test a form whose submit hook pushes data into a plain latch preview.
#[test]
fn form_hook_drives_plain_latch() {
    let preview_root = Node::element("aside").with_child(bit("strong", "name"));
    let preview = Arc::new(Mutex::new(
        PlainLatch::new(preview_root.clone(), &Values::new()).unwrap(),
    ));

    let form_root = Node::element("form")
        .with_child(
            Node::element("input")
                .with_class("bit")
                .with_attr("data-field", "name"),
        )
        .with_child(
            Node::element("button")
                .with_class("bit")
                .with_attr("data-action", "apply"),
        );

    let preview_clone = preview.clone();
    let form = FormLatch::new(
        form_root,
        [Hook::new("apply", "click", move |fields, _| {
            let name = fields["name"].value().unwrap_or_default();
            preview_clone.lock().render(&values([("name", name.as_str())]));
        })],
    )
    .unwrap();

    form.field("name").unwrap().set_value("Grace");
    form.trigger("apply", "click").unwrap();
    assert_eq!(preview_root.text_content(), "Grace");

    // same value again: the preview is not rewritten
    form.trigger("apply", "click").unwrap();
    assert_eq!(preview.lock().bits()[0].element().write_count(), 1);
}

/// Test custom markup names flowing through every latch kind.
#[test]
fn custom_markup_config() {
    let config = MarkupConfig::from_json(
        r#"{ "bit_class": "slot", "key_attribute": "data-slot", "field_attribute": "name" }"#,
    )
    .unwrap();
    let config = Arc::new(config);

    let card = Node::element("div").with_child(
        Node::element("span")
            .with_class("slot")
            .with_attr("data-slot", "label"),
    );
    let latch =
        PlainLatch::with_config(card.clone(), &values([("label", "ok")]), config.clone()).unwrap();
    assert_eq!(card.text_content(), "ok");

    let list = Node::element("ul");
    LoopLatch::with_config(
        list.clone(),
        latch,
        &[values([("label", "one")]), values([("label", "two")])],
        ListStrategy::Rebuild,
        config.clone(),
    )
    .unwrap();
    assert_eq!(list.text_content(), "onetwo");

    let form_root = Node::element("form").with_child(
        Node::element("input")
            .with_class("slot")
            .with_attr("name", "email")
            .with_attr("value", "a@b.c"),
    );
    let form = FormLatch::with_config(form_root, [], &config).unwrap();
    assert_eq!(form.data()["email"], "a@b.c");
}

/// Test the explicit initialization guard.
#[test]
fn init_checks_host_capabilities() {
    assert!(init(&Environment::in_memory()).is_ok());

    let headless = Environment::new("no-events", [Capability::QueryByClass]);
    assert!(matches!(
        init(&headless),
        Err(LatchError::Environment(Capability::DeepClone))
    ));
}
