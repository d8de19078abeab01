//! Strategy selection: delegate first, traversal as fallback, one uniform
//! result shape.

use std::cell::RefCell;
use std::path::Path;
use std::thread;
use std::time::Duration;

use solink_analyzer::{
    AnalysisOptions, Analyzer, BridgeSettings, Severity, StatusOptions, StatusSink,
    open_descriptor, open_smart_object_by_id,
};
use solink_bridge::{BridgeServer, PollOptions, WireLayer};
use solink_host::{DocumentRef, HostBridge, MemoryHost};
use solink_tracer::smart_object_count;
use tempfile::TempDir;

const MANIFEST: &str = r#"{
    "documents": [
        {
            "path": "/work/poster.psd",
            "layers": [
                { "name": "Logo.psd", "link": "/work/assets/logo.psd" },
                { "name": "Badge", "embedded": [ { "name": "Star" } ] }
            ]
        },
        {
            "path": "/work/assets/logo.psd",
            "layers": [ { "name": "Mark" } ]
        }
    ]
}"#;

/// Collects notifications so tests can assert on the fallback chatter.
#[derive(Default)]
struct RecordingSink {
    messages: RefCell<Vec<(String, Severity)>>,
}

impl StatusSink for RecordingSink {
    fn notify(&self, message: &str, severity: Severity, _options: StatusOptions) {
        self.messages
            .borrow_mut()
            .push((message.to_string(), severity));
    }
}

impl RecordingSink {
    fn warnings(&self) -> usize {
        self.messages
            .borrow()
            .iter()
            .filter(|(_, severity)| *severity == Severity::Warning)
            .count()
    }
}

fn fast_bridge(dir: &Path) -> BridgeSettings {
    BridgeSettings {
        dir: dir.to_path_buf(),
        poll: PollOptions {
            attempts: 3,
            delay: Duration::from_millis(10),
        },
    }
}

#[test]
fn falls_back_to_traversal_when_the_delegate_times_out() {
    env_logger::try_init().ok();
    let bridge_dir = TempDir::new().unwrap();
    let mut host = MemoryHost::from_json(MANIFEST).unwrap();
    let sink = RecordingSink::default();

    let analyzer = Analyzer::new().with_options(AnalysisOptions {
        prefer_delegate: true,
        bridge: Some(fast_bridge(bridge_dir.path())),
        ..AnalysisOptions::default()
    });
    let layers = analyzer
        .analyze(&mut host, &DocumentRef::new("/work/poster.psd"), &sink)
        .unwrap();

    // The fallback produced a real tree and said so on the status sink.
    assert_eq!(smart_object_count(&layers), 2);
    assert!(sink.warnings() >= 1);
    // And the workspace is untouched.
    assert_eq!(host.documents_open(), 0);
    assert_eq!(host.active(), None);
}

#[test]
fn delegate_answers_win_over_local_traversal() {
    let bridge_dir = TempDir::new().unwrap();
    let shared = bridge_dir.path().to_path_buf();

    let worker = thread::spawn(move || {
        let mut server = BridgeServer::new(shared, |_: &Path| {
            Ok(vec![WireLayer {
                id: None,
                name: "FromDelegate".into(),
                is_group: false,
                is_smart_object: true,
                is_embedded: false,
                linked_path: Some("/work/assets/from-delegate.psd".into()),
                visible: true,
                children: Vec::new(),
                error: None,
            }])
        });
        server.serve_one(Duration::from_millis(5)).unwrap();
    });

    let mut host = MemoryHost::from_json(MANIFEST).unwrap();
    let analyzer = Analyzer::new().with_options(AnalysisOptions {
        prefer_delegate: true,
        bridge: Some(BridgeSettings {
            dir: bridge_dir.path().to_path_buf(),
            poll: PollOptions {
                attempts: 100,
                delay: Duration::from_millis(20),
            },
        }),
        ..AnalysisOptions::default()
    });
    let layers = analyzer
        .analyze(
            &mut host,
            &DocumentRef::new("/work/poster.psd"),
            &solink_analyzer::NullStatusSink,
        )
        .unwrap();
    worker.join().unwrap();

    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].name, "FromDelegate");
    // The delegate path never touches the host.
    assert_eq!(host.opens_performed(), 0);
}

#[test]
fn local_only_mode_skips_the_bridge_entirely() {
    let mut host = MemoryHost::from_json(MANIFEST).unwrap();
    let sink = RecordingSink::default();

    let analyzer = Analyzer::new().with_options(AnalysisOptions {
        prefer_delegate: false,
        ..AnalysisOptions::default()
    });
    let layers = analyzer
        .analyze(&mut host, &DocumentRef::new("/work/poster.psd"), &sink)
        .unwrap();

    assert_eq!(layers.len(), 2);
    assert_eq!(sink.warnings(), 0);
}

#[test]
fn failure_of_both_paths_surfaces_as_one_error() {
    let bridge_dir = TempDir::new().unwrap();
    let mut host = MemoryHost::from_json(MANIFEST).unwrap();

    let analyzer = Analyzer::new().with_options(AnalysisOptions {
        prefer_delegate: true,
        bridge: Some(fast_bridge(bridge_dir.path())),
        ..AnalysisOptions::default()
    });
    let err = analyzer
        .analyze(
            &mut host,
            &DocumentRef::new("/work/unknown.psd"),
            &solink_analyzer::NullStatusSink,
        )
        .unwrap_err();

    assert!(err.to_string().contains("unknown.psd"));
}

#[test]
fn analyzed_smart_objects_can_be_opened_later() {
    let mut host = MemoryHost::from_json(MANIFEST).unwrap();
    let analyzer = Analyzer::new().with_options(AnalysisOptions {
        prefer_delegate: false,
        ..AnalysisOptions::default()
    });
    let entry = DocumentRef::new("/work/poster.psd");
    let layers = analyzer
        .analyze(&mut host, &entry, &solink_analyzer::NullStatusSink)
        .unwrap();

    // The user double-clicks results: re-open the entry, then open each
    // smart object from its descriptor.
    let doc = host.open(&entry).unwrap();

    let linked = open_descriptor(&mut host, doc, &layers[0]).unwrap();
    assert_eq!(
        host.document_path(linked).as_deref(),
        Some(Path::new("/work/assets/logo.psd"))
    );

    host.set_active(doc).unwrap();
    let embedded = open_descriptor(&mut host, doc, &layers[1]).unwrap();
    assert_eq!(host.active(), Some(embedded));
    assert!(host.document_path(embedded).is_none());

    // Same thing through the id-based entry point.
    host.set_active(doc).unwrap();
    let again = open_smart_object_by_id(&mut host, layers[1].id).unwrap();
    assert_eq!(host.layers(again).unwrap(), host.layers(embedded).unwrap());
}
