//! Traversal behavior over manifest-backed hosts.

use solink_host::{DocumentRef, HostBridge, MemoryHost};
use solink_tracer::{
    LayerContent, SmartObjectTracer, TracerOptions, smart_object_count, tree_depth,
};

fn host(manifest: &str) -> MemoryHost {
    env_logger::try_init().ok();
    MemoryHost::from_json(manifest).unwrap()
}

#[test]
fn plain_documents_yield_only_groups_and_leaves() {
    let mut host = host(
        r#"{
        "documents": [
            {
                "path": "/work/flat.psd",
                "layers": [
                    { "name": "Header", "children": [
                        { "name": "Title", "kind": "text" },
                        { "name": "Rule" }
                    ]},
                    { "name": "Backdrop" }
                ]
            }
        ]
    }"#,
    );

    let tracer = SmartObjectTracer::new();
    let layers = tracer
        .trace_entry(&mut host, &DocumentRef::new("/work/flat.psd"))
        .unwrap();

    assert_eq!(layers.len(), 2);
    assert_eq!(smart_object_count(&layers), 0);
    assert_eq!(layers[0].kind_label(), "group");
    assert_eq!(layers[0].children().len(), 2);
    assert_eq!(layers[1].kind_label(), "leaf");
    // Groups are structural: only the entry document is ever opened.
    assert_eq!(host.opens_performed(), 1);
}

#[test]
fn linked_smart_object_is_recorded_without_opening() {
    let mut host = host(
        r#"{
        "documents": [
            {
                "path": "/work/poster.psd",
                "layers": [
                    { "name": "Logo.psd", "link": "/work/assets/logo.psd" }
                ]
            }
        ]
    }"#,
    );

    let tracer = SmartObjectTracer::new();
    let layers = tracer
        .trace_entry(&mut host, &DocumentRef::new("/work/poster.psd"))
        .unwrap();

    assert_eq!(layers.len(), 1);
    let logo = &layers[0];
    assert_eq!(logo.name, "Logo.psd");
    match &logo.content {
        LayerContent::Smart {
            link,
            embedded,
            children,
        } => {
            assert_eq!(link.as_deref(), Some(std::path::Path::new("/work/assets/logo.psd")));
            assert!(!embedded);
            assert!(children.is_empty());
        }
        other => panic!("expected a smart node, got {other:?}"),
    }
    // The linked target lives outside this document tree; only the entry
    // was opened.
    assert_eq!(host.opens_performed(), 1);
}

#[test]
fn embedded_chain_of_depth_two_restores_active_document() {
    let mut host = host(
        r#"{
        "documents": [
            { "path": "/work/other.psd", "layers": [ { "name": "Canvas" } ] },
            {
                "path": "/work/nested.psd",
                "layers": [
                    { "name": "Outer", "embedded": [
                        { "name": "Inner", "embedded": [] }
                    ]}
                ]
            }
        ]
    }"#,
    );
    let other = host.open(&DocumentRef::new("/work/other.psd")).unwrap();

    let tracer = SmartObjectTracer::new();
    let layers = tracer
        .trace_entry(&mut host, &DocumentRef::new("/work/nested.psd"))
        .unwrap();

    assert_eq!(tree_depth(&layers), 2);
    let outer = &layers[0];
    match &outer.content {
        LayerContent::Smart {
            link,
            embedded,
            children,
        } => {
            assert!(link.is_none());
            assert!(*embedded);
            assert_eq!(children.len(), 1);
            assert!(children[0].children().is_empty());
        }
        other => panic!("expected an embedded smart node, got {other:?}"),
    }

    // Everything opened during the analysis is closed again and the user's
    // document is active once more.
    assert_eq!(host.active(), Some(other));
    assert_eq!(host.documents_open(), 1);
}

#[test]
fn traversal_truncates_past_the_depth_bound() {
    let mut host = host(
        r#"{
        "documents": [
            {
                "path": "/work/chain.psd",
                "layers": [
                    { "name": "L1", "embedded": [
                        { "name": "L2", "embedded": [
                            { "name": "L3", "embedded": [
                                { "name": "L4", "embedded": [
                                    { "name": "L5", "embedded": [
                                        { "name": "L6", "embedded": [] }
                                    ]}
                                ]}
                            ]}
                        ]}
                    ]}
                ]
            }
        ]
    }"#,
    );

    let entry = DocumentRef::new("/work/chain.psd");
    let tracer = SmartObjectTracer::new().with_options(TracerOptions { max_depth: 4 });
    let layers = tracer.trace_entry(&mut host, &entry).unwrap();

    // Levels 0..=max_depth are collected; everything deeper is cut off.
    assert_eq!(tree_depth(&layers), 5);
    assert_eq!(host.documents_open(), 0);

    // A chain shorter than the bound comes back whole.
    let shallow = SmartObjectTracer::new().with_options(TracerOptions { max_depth: 2 });
    let layers = shallow.trace_entry(&mut host, &entry).unwrap();
    assert_eq!(tree_depth(&layers), 3);
}

#[test]
fn one_broken_layer_does_not_abort_the_analysis() {
    let mut host = host(
        r#"{
        "documents": [
            {
                "path": "/work/damaged.psd",
                "layers": [
                    { "name": "BadGroup", "kind": "group", "broken": true,
                      "children": [ { "name": "Hidden" } ] },
                    { "name": "BadSmart", "broken": true, "embedded": [] },
                    { "name": "Fine.psd", "link": "/work/fine.psd" }
                ]
            }
        ]
    }"#,
    );

    let tracer = SmartObjectTracer::new();
    let layers = tracer
        .trace_entry(&mut host, &DocumentRef::new("/work/damaged.psd"))
        .unwrap();

    assert_eq!(layers.len(), 3);
    assert_eq!(layers[0].kind_label(), "error");
    assert_eq!(layers[0].name, "BadGroup");
    assert_eq!(layers[1].kind_label(), "error");
    match &layers[2].content {
        LayerContent::Smart { link, .. } => assert!(link.is_some()),
        other => panic!("expected the healthy sibling to survive, got {other:?}"),
    }
    assert_eq!(host.documents_open(), 0);
}

#[test]
fn reanalysis_of_an_unchanged_document_is_identical() {
    let mut host = host(
        r#"{
        "documents": [
            {
                "path": "/work/poster.psd",
                "layers": [
                    { "name": "Badge", "embedded": [ { "name": "Star" } ] },
                    { "name": "Group", "children": [ { "name": "Fill" } ] }
                ]
            }
        ]
    }"#,
    );

    let entry = DocumentRef::new("/work/poster.psd");
    let tracer = SmartObjectTracer::new();
    let first = tracer.trace_entry(&mut host, &entry).unwrap();
    let second = tracer.trace_entry(&mut host, &entry).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_entry_fails_without_disturbing_the_host() {
    let mut host = host(
        r#"{
        "documents": [
            { "path": "/work/open.psd", "layers": [ { "name": "Canvas" } ] }
        ]
    }"#,
    );
    let open = host.open(&DocumentRef::new("/work/open.psd")).unwrap();

    let tracer = SmartObjectTracer::new();
    let err = tracer
        .trace_entry(&mut host, &DocumentRef::new("/work/missing.psd"))
        .unwrap_err();
    assert!(err.to_string().contains("missing.psd"));
    assert_eq!(host.active(), Some(open));
    assert_eq!(host.documents_open(), 1);
}
