//! End-to-end store scenarios against the filesystem backend.
//!
//! Each test opens a store on a temp data directory, drives it through the
//! gateway, then reopens a fresh store on the same directory to simulate a
//! restart.

use std::fs;
use std::sync::Arc;

use hpg_store::test_support::{ScriptedDocument, data_dir};
use hpg_store::{
    Edit, FsBackend, Gateway, GraphDocument, LayoutAlgorithm, MoveRequest, ProjectionKind, Store,
};
use serde_json::json;

type FsStore = Store<ScriptedDocument, FsBackend>;

fn open(dir: &std::path::Path) -> FsStore {
    Store::open(FsBackend::open(dir).expect("backend")).expect("store")
}

/// create → list → get → delete → get fails.
#[test]
fn create_get_delete_scenario() {
    let dir = data_dir();
    let store = open(dir.path());

    store.create("hex", 6).expect("create");
    assert!(store.list().contains(&"hex".to_string()));
    assert_eq!(store.get("hex").expect("get").boundary, 6);
    assert!(dir.path().join("hex.hpg").is_file());

    store.remove("hex").expect("delete");
    assert_eq!(store.get("hex").err().map(|e| e.kind()), Some("not_found"));
    assert!(!dir.path().join("hex.hpg").exists());
}

/// Every successful mutation is visible after a restart.
#[test]
fn mutations_survive_restart() {
    let dir = data_dir();
    let store = Arc::new(open(dir.path()));
    let gateway = Gateway::new(Arc::clone(&store));

    store.create("g", 4).expect("create");
    store
        .update("g", |doc| {
            doc.valid_faces = vec![1];
            Ok(Edit::Changed(()))
        })
        .expect("script");
    gateway.apply_layout("g", LayoutAlgorithm::Lloyd).expect("layout");
    gateway.propose_move("g", MoveRequest::square(1)).expect("move");
    gateway.apply_labeling("g", Some(2)).expect("label");
    let expected = store.project("g", ProjectionKind::Raw).expect("raw");

    let reopened = open(dir.path());
    assert_eq!(reopened.list(), vec!["g"]);
    assert_eq!(reopened.project("g", ProjectionKind::Raw).expect("raw"), expected);
    assert_eq!(
        reopened.project("g", ProjectionKind::Analysis).expect("analysis"),
        store.project("g", ProjectionKind::Analysis).expect("analysis")
    );
}

#[test]
fn rejected_move_leaves_file_untouched() {
    let dir = data_dir();
    let store = Arc::new(open(dir.path()));
    let gateway = Gateway::new(Arc::clone(&store));
    store.create("g", 1).expect("create");
    let before = fs::read_to_string(dir.path().join("g.hpg")).expect("read");

    let outcome = gateway.propose_move("g", MoveRequest::square(0)).expect("move");
    assert!(!outcome.applied);
    assert_eq!(fs::read_to_string(dir.path().join("g.hpg")).expect("read"), before);
}

#[test]
fn restart_skips_corrupt_records() {
    let dir = data_dir();
    {
        let store = open(dir.path());
        store.create("keep", 3).expect("create");
    }
    fs::write(dir.path().join("broken.hpg"), "{\"boundary\": ").expect("write");
    fs::write(dir.path().join("wrong-shape.hpg"), "{\"faces\": 2}").expect("write");
    fs::write(dir.path().join("notes.md"), "not a record").expect("write");

    let store = open(dir.path());
    assert_eq!(store.list(), vec!["keep"]);
    let mut skipped = store.load_report().skipped.clone();
    skipped.sort();
    assert_eq!(skipped, vec!["broken", "wrong-shape"]);
}

#[test]
fn names_with_path_characters_stay_inside_data_dir() {
    let dir = data_dir();
    let store = open(dir.path());
    store.create("../escape", 2).expect("create");
    store.create("a/b", 2).expect("create");

    assert!(dir.path().join("%2e%2e%2fescape.hpg").is_file());
    assert!(!dir.path().parent().expect("parent").join("escape.hpg").exists());

    let reopened = open(dir.path());
    assert_eq!(reopened.list(), vec!["../escape", "a/b"]);
}

#[test]
fn editor_save_and_duplicate_persist() {
    let dir = data_dir();
    let store = Arc::new(open(dir.path()));
    let gateway = Gateway::new(Arc::clone(&store));

    let mut edited = ScriptedDocument::with_boundary(3).expect("doc");
    edited.layout_passes = 12;
    gateway.save_full("drawn", &edited.to_record()).expect("save");
    store.duplicate("drawn", "copy").expect("duplicate");

    let reopened = open(dir.path());
    assert_eq!(reopened.list(), vec!["copy", "drawn"]);
    let copy = reopened.project("copy", ProjectionKind::Raw).expect("raw");
    assert_eq!(copy["layoutPasses"], json!(12));
}
