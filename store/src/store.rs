//! Authoritative name → document table mirrored to a [`Backend`].
//!
//! # Locking
//!
//! The table sits behind one `RwLock`; each document sits behind its own
//! `Arc<RwLock<Slot>>`. The table lock is never held while waiting for a
//! document lock: callers clone the slot under a brief table read, release
//! it, then lock the document. `remove` takes the table write lock only after
//! it holds the document, and only long enough to drop the entry. Documents
//! with different names are therefore mutated in parallel, and a slow
//! mutation of one name never stalls lookups of another.
//!
//! # Persistence ordering
//!
//! `create`, `replace`, `duplicate` and `remove` touch the backend first and
//! only then change the table, so a failed write leaves the table as it was.
//! In-place mutations ([`Store::update`]) are different: the document is
//! changed first and then saved. If that save fails the error is returned but
//! the mutated state stays in memory; the next successful save of the name
//! writes it out.
//!
//! Every record is parsed back before it is written. A document whose record
//! would not load again is never persisted.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::lock_api::ArcRwLockReadGuard;
use parking_lot::{RawRwLock, RwLock};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::document::GraphDocument;
use crate::core::projection::{ProjectionKind, project};
use crate::error::{StoreError, StoreResult};
use crate::io::backend::{Backend, FsBackend};

struct Slot<D> {
    doc: D,
    /// Cleared by `remove`; a mutation that raced with removal sees a dead
    /// slot and must not write the record back.
    live: bool,
}

type SlotRef<D> = Arc<RwLock<Slot<D>>>;

fn new_slot<D>(doc: D) -> SlotRef<D> {
    Arc::new(RwLock::new(Slot { doc, live: true }))
}

/// Shared (read) access to a live document.
///
/// Holding the guard blocks mutations of that name, never of others.
pub struct DocumentGuard<D> {
    guard: ArcRwLockReadGuard<RawRwLock, Slot<D>>,
}

impl<D> Deref for DocumentGuard<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.guard.doc
    }
}

/// What an [`update`](Store::update) closure did to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit<T> {
    /// The document changed and must be saved before returning.
    Changed(T),
    /// The document is untouched; nothing is written.
    Unchanged(T),
}

/// Outcome of the startup scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Names whose records could not be read or parsed.
    pub skipped: Vec<String>,
}

/// The document store.
pub struct Store<D, B = FsBackend> {
    backend: B,
    table: RwLock<BTreeMap<String, SlotRef<D>>>,
    report: LoadReport,
}

impl<D: GraphDocument, B: Backend> Store<D, B> {
    /// Load every record the backend holds. Records that fail to read or
    /// parse are skipped, not fatal.
    pub fn open(backend: B) -> StoreResult<Self> {
        let mut names = backend.scan()?;
        names.sort();

        let mut table = BTreeMap::new();
        let mut report = LoadReport::default();
        for name in names {
            let parsed = backend.read(&name).and_then(|record| {
                D::from_record(&record).map_err(|err| StoreError::operation(&name, err))
            });
            match parsed {
                Ok(doc) => {
                    table.insert(name, new_slot(doc));
                    report.loaded += 1;
                }
                Err(err) => {
                    warn!(name = %name, error = %err, "skipping unreadable record");
                    report.skipped.push(name);
                }
            }
        }
        info!(loaded = report.loaded, skipped = report.skipped.len(), "store loaded");

        Ok(Self {
            backend,
            table: RwLock::new(table),
            report,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// All names, lexicographically sorted.
    pub fn list(&self) -> Vec<String> {
        self.table.read().keys().cloned().collect()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.table.read().contains_key(name)
    }

    /// Build a new document with `boundary_vertices` boundary vertices,
    /// persist it, then make it visible. Returns its full projection.
    pub fn create(&self, name: &str, boundary_vertices: usize) -> StoreResult<Value> {
        validate_name(name)?;
        let mut table = self.table.write();
        if table.contains_key(name) {
            return Err(StoreError::already_exists(name));
        }
        let doc = D::with_boundary(boundary_vertices)
            .map_err(|err| StoreError::invalid(format!("cannot create '{name}': {err}")))?;
        let record = encode(name, &doc)?;
        self.backend.write(name, &record)?;
        table.insert(name.to_string(), new_slot(doc));
        info!(name, boundary_vertices, "created dataset");
        Ok(record)
    }

    /// Shared access to the live document.
    pub fn get(&self, name: &str) -> StoreResult<DocumentGuard<D>> {
        let slot = self.slot(name)?;
        let guard = slot.read_arc();
        if !guard.live {
            return Err(StoreError::not_found(name));
        }
        Ok(DocumentGuard { guard })
    }

    /// Run `f` against the document under its shared lock.
    pub fn read<T>(&self, name: &str, f: impl FnOnce(&D) -> T) -> StoreResult<T> {
        let doc = self.get(name)?;
        Ok(f(&doc))
    }

    pub fn project(&self, name: &str, kind: ProjectionKind) -> StoreResult<Value> {
        self.read(name, |doc| project(doc, kind))
    }

    /// Insert or overwrite `name` with `doc`. The record is written before the
    /// table changes. Returns whether `name` already existed.
    pub fn replace(&self, name: &str, doc: D) -> StoreResult<bool> {
        validate_name(name)?;
        let record = encode(name, &doc)?;
        loop {
            let existing = self.table.read().get(name).map(Arc::clone);
            if let Some(slot) = existing {
                let mut guard = slot.write();
                if !guard.live {
                    // Removed while we waited; its entry is already gone.
                    continue;
                }
                self.backend.write(name, &record)?;
                guard.doc = doc;
                info!(name, "replaced dataset");
                return Ok(true);
            }

            let mut table = self.table.write();
            if table.contains_key(name) {
                // Created since the lookup; overwrite it instead.
                continue;
            }
            self.backend.write(name, &record)?;
            table.insert(name.to_string(), new_slot(doc));
            info!(name, "created dataset from full record");
            return Ok(false);
        }
    }

    /// Copy `source` under the new name `target`. Returns the copy's full
    /// projection.
    pub fn duplicate(&self, source: &str, target: &str) -> StoreResult<Value> {
        validate_name(target)?;
        let doc = D::clone(&*self.get(source)?);
        let record = encode(target, &doc)?;

        let mut table = self.table.write();
        if table.contains_key(target) {
            return Err(StoreError::already_exists(target));
        }
        self.backend.write(target, &record)?;
        table.insert(target.to_string(), new_slot(doc));
        info!(source, target, "duplicated dataset");
        Ok(record)
    }

    /// Delete the record, then drop the in-memory entry. A record that is
    /// already gone from the backend counts as deleted.
    ///
    /// Waits for in-flight mutations of `name` only.
    pub fn remove(&self, name: &str) -> StoreResult<()> {
        let slot = self.slot(name)?;
        let mut guard = slot.write();
        if !guard.live {
            return Err(StoreError::not_found(name));
        }
        self.backend.delete(name)?;
        guard.live = false;

        let mut table = self.table.write();
        if table.get(name).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
            table.remove(name);
        }
        drop(table);
        info!(name, "deleted dataset");
        Ok(())
    }

    /// Run `f` under the exclusive lock of `name`, saving afterwards when it
    /// reports [`Edit::Changed`].
    ///
    /// An error from `f` is returned as is and nothing is saved; whatever `f`
    /// already did to the document stays in memory. A failed save is
    /// returned (`Persistence`, or `OperationFailed` when the record would
    /// not load back) and the change stays in memory as well.
    pub fn update<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut D) -> StoreResult<Edit<T>>,
    ) -> StoreResult<T> {
        let slot = self.slot(name)?;
        let mut guard = slot.write();
        if !guard.live {
            return Err(StoreError::not_found(name));
        }
        match f(&mut guard.doc)? {
            Edit::Unchanged(value) => {
                debug!(name, "update left dataset unchanged");
                Ok(value)
            }
            Edit::Changed(value) => {
                let saved =
                    encode(name, &guard.doc).and_then(|record| self.backend.write(name, &record));
                if let Err(err) = saved {
                    warn!(name, error = %err, "mutation kept in memory but not saved");
                    return Err(err);
                }
                debug!(name, "saved dataset after update");
                Ok(value)
            }
        }
    }

    /// Write the current in-memory state of `name` to the backend.
    ///
    /// Takes the exclusive lock so saves of one name never share a temp file.
    pub fn save(&self, name: &str) -> StoreResult<()> {
        let slot = self.slot(name)?;
        let guard = slot.write();
        if !guard.live {
            return Err(StoreError::not_found(name));
        }
        let record = encode(name, &guard.doc)?;
        self.backend.write(name, &record)
    }

    fn slot(&self, name: &str) -> StoreResult<SlotRef<D>> {
        self.table
            .read()
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| StoreError::not_found(name))
    }
}

/// The record of `doc`, checked to load back.
fn encode<D: GraphDocument>(name: &str, doc: &D) -> StoreResult<Value> {
    let record = doc.to_record();
    D::from_record(&record).map_err(|err| StoreError::operation(name, err))?;
    Ok(record)
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.trim().is_empty() {
        return Err(StoreError::invalid("dataset name must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FaultyBackend, MemoryBackend, ScriptedDocument};
    use serde_json::json;

    type TestStore = Store<ScriptedDocument, MemoryBackend>;

    fn empty_store() -> TestStore {
        Store::open(MemoryBackend::default()).expect("open")
    }

    #[test]
    fn list_is_sorted() {
        let store = empty_store();
        for name in ["zeta", "alpha", "Mid", "beta"] {
            store.create(name, 3).expect("create");
        }
        assert_eq!(store.list(), vec!["Mid", "alpha", "beta", "zeta"]);
    }

    #[test]
    fn create_persists_and_returns_full_projection() {
        let store = empty_store();
        let record = store.create("hex", 6).expect("create");

        assert!(store.exists("hex"));
        assert_eq!(record["boundary"], json!(6));
        assert_eq!(store.backend().record("hex"), Some(record));
    }

    #[test]
    fn duplicate_create_is_rejected_until_removed() {
        let store = empty_store();
        store.create("g", 1).expect("create");
        let err = store.create("g", 4).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
        assert_eq!(store.get("g").expect("get").boundary, 1);

        store.remove("g").expect("remove");
        store.create("g", 4).expect("create again");
        assert_eq!(store.get("g").expect("get").boundary, 4);
    }

    #[test]
    fn empty_name_and_bad_boundary_are_invalid() {
        let store = empty_store();
        assert_eq!(store.create("", 3).unwrap_err().kind(), "invalid_request");
        assert_eq!(store.create("zero", 0).unwrap_err().kind(), "invalid_request");
        assert!(!store.exists("zero"));
    }

    #[test]
    fn failed_create_is_not_visible() {
        let backend = FaultyBackend::default();
        backend.fail_writes(true);
        let store: Store<ScriptedDocument, FaultyBackend> = Store::open(backend).expect("open");

        let err = store.create("g", 2).unwrap_err();
        assert_eq!(err.kind(), "persistence_error");
        assert!(!store.exists("g"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn unknown_names_are_not_found() {
        let store = empty_store();
        assert!(matches!(store.get("nope"), Err(StoreError::NotFound { .. })));
        assert!(matches!(store.remove("nope"), Err(StoreError::NotFound { .. })));
        assert!(matches!(store.save("nope"), Err(StoreError::NotFound { .. })));
        let err = store.update("nope", |_| Ok(Edit::Changed(()))).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn remove_deletes_record_and_entry() {
        let store = empty_store();
        store.create("g", 2).expect("create");
        store.remove("g").expect("remove");

        assert!(!store.exists("g"));
        assert_eq!(store.backend().record("g"), None);
        assert_eq!(store.get("g").err().map(|e| e.kind()), Some("not_found"));
    }

    #[test]
    fn remove_tolerates_missing_record() {
        let store = empty_store();
        store.create("g", 2).expect("create");
        store.backend().forget("g");

        store.remove("g").expect("remove");
        assert!(!store.exists("g"));
    }

    #[test]
    fn failed_delete_keeps_entry() {
        let backend = FaultyBackend::default();
        let store: Store<ScriptedDocument, FaultyBackend> = Store::open(backend).expect("open");
        store.create("g", 2).expect("create");
        store.backend().fail_deletes(true);

        assert_eq!(store.remove("g").unwrap_err().kind(), "persistence_error");
        assert!(store.exists("g"));
    }

    #[test]
    fn replace_overwrites_or_creates() {
        let store = empty_store();
        store.create("g", 2).expect("create");

        let edited = ScriptedDocument::with_boundary(9).expect("doc");
        assert!(store.replace("g", edited.clone()).expect("replace existing"));
        assert_eq!(store.get("g").expect("get").boundary, 9);
        assert_eq!(store.backend().record("g"), Some(edited.to_record()));

        assert!(!store.replace("fresh", edited).expect("replace absent"));
        assert_eq!(store.list(), vec!["fresh", "g"]);
    }

    #[test]
    fn failed_replace_keeps_previous_document() {
        let store: Store<ScriptedDocument, FaultyBackend> =
            Store::open(FaultyBackend::default()).expect("open");
        store.create("g", 2).expect("create");
        store.backend().fail_writes(true);

        let err = store
            .replace("g", ScriptedDocument::with_boundary(7).expect("doc"))
            .unwrap_err();
        assert_eq!(err.kind(), "persistence_error");
        assert_eq!(store.get("g").expect("get").boundary, 2);

        let err = store
            .replace("new", ScriptedDocument::with_boundary(7).expect("doc"))
            .unwrap_err();
        assert_eq!(err.kind(), "persistence_error");
        assert!(!store.exists("new"));
    }

    #[test]
    fn duplicate_copies_state() {
        let store = empty_store();
        store.create("src", 5).expect("create");
        store
            .update("src", |doc| {
                doc.layout_passes = 3;
                Ok(Edit::Changed(()))
            })
            .expect("update");

        let record = store.duplicate("src", "copy").expect("duplicate");
        assert_eq!(record, store.project("src", ProjectionKind::Raw).expect("raw"));
        assert_eq!(store.backend().record("copy"), Some(record));

        assert_eq!(store.duplicate("src", "copy").unwrap_err().kind(), "already_exists");
        assert_eq!(store.duplicate("ghost", "other").unwrap_err().kind(), "not_found");
    }

    #[test]
    fn unchanged_update_does_not_write() {
        let store: Store<ScriptedDocument, FaultyBackend> =
            Store::open(FaultyBackend::default()).expect("open");
        store.create("g", 2).expect("create");
        let writes = store.backend().writes();

        let value = store.update("g", |_| Ok(Edit::Unchanged(42))).expect("update");
        assert_eq!(value, 42);
        assert_eq!(store.backend().writes(), writes);
    }

    #[test]
    fn failed_save_keeps_mutation_in_memory() {
        let store: Store<ScriptedDocument, FaultyBackend> =
            Store::open(FaultyBackend::default()).expect("open");
        store.create("g", 2).expect("create");
        store.backend().fail_writes(true);

        let err = store
            .update("g", |doc| {
                doc.layout_passes += 1;
                Ok(Edit::Changed(()))
            })
            .unwrap_err();
        assert_eq!(err.kind(), "persistence_error");
        assert_eq!(store.get("g").expect("get").layout_passes, 1);

        // A later save catches the record up.
        store.backend().fail_writes(false);
        store.save("g").expect("save");
        let saved = store.backend().inner().record("g").expect("record");
        assert_eq!(saved["layoutPasses"], json!(1));
    }

    #[test]
    fn records_that_would_not_load_are_never_written() {
        let store = empty_store();
        store.create("g", 2).expect("create");
        let before = store.backend().record("g");

        let err = store
            .update("g", |doc| {
                doc.unloadable = true;
                Ok(Edit::Changed(()))
            })
            .unwrap_err();
        assert_eq!(err.kind(), "operation_failed");
        assert_eq!(store.backend().record("g"), before);
        assert_eq!(store.save("g").unwrap_err().kind(), "operation_failed");
        assert_eq!(store.backend().record("g"), before);

        let mut doc = ScriptedDocument::with_boundary(3).expect("doc");
        doc.unloadable = true;
        assert_eq!(store.replace("new", doc).unwrap_err().kind(), "operation_failed");
        assert!(!store.exists("new"));
    }

    #[test]
    fn save_after_remove_is_not_found() {
        let store = empty_store();
        store.create("g", 2).expect("create");
        store.remove("g").expect("remove");
        assert_eq!(store.save("g").unwrap_err().kind(), "not_found");
        assert_eq!(store.backend().record("g"), None);
    }

    #[test]
    fn failing_closure_saves_nothing() {
        let store: Store<ScriptedDocument, FaultyBackend> =
            Store::open(FaultyBackend::default()).expect("open");
        store.create("g", 2).expect("create");
        let writes = store.backend().writes();

        let err = store
            .update::<()>("g", |doc| {
                doc.layout_passes = 10;
                Err(StoreError::invalid("halfway"))
            })
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
        assert_eq!(store.backend().writes(), writes);
        assert_eq!(store.get("g").expect("get").layout_passes, 10);
    }

    #[test]
    fn open_skips_unparsable_records() {
        let backend = MemoryBackend::default();
        backend
            .write("good", &ScriptedDocument::with_boundary(3).expect("doc").to_record())
            .expect("write");
        backend.write("bad", &json!({"boundary": "three"})).expect("write");

        let store: TestStore = Store::open(backend).expect("open");
        assert_eq!(store.list(), vec!["good"]);
        assert_eq!(
            store.load_report(),
            &LoadReport {
                loaded: 1,
                skipped: vec!["bad".to_string()],
            }
        );
    }

    #[test]
    fn guard_blocks_mutation_of_same_name_only() {
        let store = Arc::new(empty_store());
        store.create("a", 2).expect("create");
        store.create("b", 2).expect("create");

        let guard = store.get("a").expect("get");
        // Another name is free to mutate while "a" is read-locked.
        store
            .update("b", |doc| {
                doc.layout_passes = 1;
                Ok(Edit::Changed(()))
            })
            .expect("update b");

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store
                    .update("a", |doc| {
                        doc.layout_passes = 1;
                        Ok(Edit::Changed(()))
                    })
                    .expect("update a");
            })
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(guard.layout_passes, 0);
        drop(guard);
        writer.join().expect("join");
        assert_eq!(store.get("a").expect("get").layout_passes, 1);
    }
}
