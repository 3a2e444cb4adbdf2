#![forbid(unsafe_code)]

//! End-to-end session flows against the in-memory asset store.
//!
//! Run:
//!   cargo test -p albumkit-runtime --test session_flow

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use albumkit_core::{CollectionId, ItemId, SelectionEvent, SelectionMode, ids};
use albumkit_runtime::{
    AccessLevel, AlbumSession, AssetStore, MemoryAssetStore, Pasteboard, SessionConfig,
    SessionError, SyncError, UndoKind,
};
use albumkit_store::{JsonFileStore, KeyValueStore, MemoryStore, SortPreference};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Helpers
// ============================================================================

fn album() -> CollectionId {
    CollectionId::new("album")
}

fn other() -> CollectionId {
    CollectionId::new("other")
}

fn library() -> MemoryAssetStore {
    MemoryAssetStore::new()
        .with_collection("album", &["a", "b", "c", "d", "e"])
        .with_collection("other", &["x", "y"])
}

fn open_session(config: SessionConfig) -> AlbumSession<MemoryAssetStore> {
    let mut session = AlbumSession::with_backend(config, library(), Arc::new(MemoryStore::new()));
    session.open(album()).unwrap();
    session
}

fn store_items(session: &AlbumSession<MemoryAssetStore>, collection: &CollectionId) -> Vec<ItemId> {
    session
        .coordinator()
        .assets()
        .items(collection)
        .unwrap()
        .to_vec()
}

// ============================================================================
// Event capture
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

#[derive(Default)]
struct Captured {
    events: Vec<CapturedEvent>,
    spans: Vec<String>,
}

struct CaptureLayer {
    captured: Arc<Mutex<Captured>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for CaptureLayer
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.captured
            .lock()
            .unwrap()
            .spans
            .push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.captured.lock().unwrap().events.push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_capture<F: FnOnce()>(f: F) -> Captured {
    let captured = Arc::new(Mutex::new(Captured::default()));
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(CaptureLayer {
            captured: captured.clone(),
        });
    tracing::subscriber::with_default(subscriber, f);
    let mut guard = captured.lock().unwrap();
    std::mem::take(&mut *guard)
}

// ============================================================================
// Reorder, undo, redo
// ============================================================================

#[test]
fn commit_moves_selection_after_base_and_undoes() {
    let mut session = open_session(SessionConfig::default());
    session.tap(3);
    session.tap(0);

    let diff = session.commit_selection().unwrap();
    let reordered = ids(["b", "c", "d", "a", "e"]);
    assert_eq!(session.full_order(), &reordered[..]);
    assert_eq!(store_items(&session, &album()), reordered);
    assert!(!diff.is_empty());
    assert!(diff.removed.is_empty() && diff.inserted.is_empty());
    assert!(session.selection().is_empty());

    let undone = session.undo().unwrap().unwrap();
    assert!(matches!(undone.kind(), UndoKind::Sort { .. }));
    assert_eq!(session.full_order(), &ids(["a", "b", "c", "d", "e"])[..]);
    assert_eq!(store_items(&session, &album()), ids(["a", "b", "c", "d", "e"]));
    assert!(session.can_redo());

    session.redo().unwrap().unwrap();
    assert_eq!(session.full_order(), &reordered[..]);
    assert!(session.redo().unwrap().is_none());
}

#[test]
fn committed_order_survives_reopen() {
    let mut session = open_session(SessionConfig::default());
    session.tap(4);
    session.tap(1);
    session.commit_selection().unwrap();

    session.open(other()).unwrap();
    session.open(album()).unwrap();
    assert_eq!(session.full_order(), &ids(["a", "c", "d", "e", "b"])[..]);
}

#[test]
fn range_mode_reverse_range_ranks_from_start() {
    let config = SessionConfig::default().with_selection_mode(SelectionMode::Range);
    let mut session = open_session(config);
    session.tap(3);
    session.tap(0);
    assert_eq!(
        session.selection().selected_items_in_order(),
        &ids(["d", "c", "b", "a"])[..]
    );

    session.commit_selection().unwrap();
    assert_eq!(session.full_order(), &ids(["d", "c", "b", "a", "e"])[..]);
}

#[test]
fn range_start_does_not_survive_a_paste() {
    let config = SessionConfig::default().with_selection_mode(SelectionMode::Range);
    let mut session = open_session(config);
    session.tap(3);
    session.set_pasteboard(Pasteboard::from_text("x"));
    session.paste(0).unwrap();
    assert_eq!(
        session.visible_items(),
        &ids(["x", "a", "b", "c", "d", "e"])[..]
    );

    session.tap(5);
    assert_eq!(
        session.selection().selected_items_in_order(),
        &ids(["d", "e"])[..]
    );
}

#[test]
fn range_start_does_not_survive_an_undo() {
    let config = SessionConfig::default().with_selection_mode(SelectionMode::Range);
    let mut session = open_session(config);
    session.set_pasteboard(Pasteboard::from_text("x"));
    session.paste(0).unwrap();
    session.tap(4);
    session.undo().unwrap();
    assert_eq!(session.visible_items(), &ids(["a", "b", "c", "d", "e"])[..]);

    session.tap(0);
    assert_eq!(
        session.selection().selected_items_in_order(),
        &ids(["d", "a"])[..]
    );
}

#[test]
fn undo_elsewhere_leaves_open_collection_untouched() {
    let mut session = open_session(SessionConfig::default());
    session
        .coordinator_mut()
        .copy_items(&ids(["a"]), &other())
        .unwrap();
    session
        .coordinator_mut()
        .assets_mut()
        .add_externally(&album(), "f");

    let undone = session.undo().unwrap().unwrap();
    assert!(matches!(undone.kind(), UndoKind::Copy { .. }));
    assert_eq!(store_items(&session, &other()), ids(["x", "y"]));
    assert_eq!(session.full_order(), &ids(["a", "b", "c", "d", "e"])[..]);

    session.reload().unwrap();
    assert_eq!(session.full_order().last(), Some(&ItemId::new("f")));
}

#[test]
fn anchor_overrides_first_selected_as_base() {
    let mut session = open_session(SessionConfig::default());
    session.tap(0);
    session.tap(2);
    session.set_anchor(Some(4)).unwrap();

    session.commit_selection().unwrap();
    assert_eq!(session.full_order(), &ids(["b", "d", "e", "a", "c"])[..]);
}

#[test]
fn keeping_selection_after_commit() {
    let config = SessionConfig::default().with_clear_selection_after_commit(false);
    let mut session = open_session(config);
    session.tap(2);
    session.tap(0);
    session.commit_selection().unwrap();
    assert_eq!(session.selection().len(), 2);

    // Same selection, same base: nothing moves.
    session.commit_selection().unwrap();
    assert_eq!(session.full_order(), &ids(["b", "c", "a", "d", "e"])[..]);
}

#[test]
fn events_follow_taps() {
    let mut session = open_session(SessionConfig::default());
    session.tap(1);
    session.tap(1);
    let events = session.drain_events();
    assert!(events.contains(&SelectionEvent::SelectedAt {
        index: 1,
        item: ItemId::new("b"),
        rank: 1,
    }));
    assert!(events.contains(&SelectionEvent::DeselectedAt {
        index: 1,
        item: ItemId::new("b"),
    }));
    assert!(session.drain_events().is_empty());
}

// ============================================================================
// Paragraphs
// ============================================================================

#[test]
fn collapsed_paragraph_hides_items_but_reorders_full_order() {
    let mut session = open_session(SessionConfig::default());
    assert!(session.set_header(&ItemId::new("b")).unwrap());
    assert!(session.toggle_collapse(&ItemId::new("b")).unwrap());
    assert_eq!(session.visible_items(), &ids(["a", "b"])[..]);

    session.tap(1);
    session.tap(0);
    let diff = session.commit_selection().unwrap();
    assert_eq!(session.full_order(), &ids(["b", "a", "c", "d", "e"])[..]);
    assert_eq!(session.visible_items(), &ids(["b"])[..]);
    assert_eq!(diff.removed, vec![0]);

    let paragraphs = session.paragraphs();
    assert_eq!(paragraphs.len(), 1);
    assert!(paragraphs[0].collapsed);
}

#[test]
fn headers_of_deleted_items_are_cleaned_on_reload() {
    let mut session = open_session(SessionConfig::default());
    session.set_header(&ItemId::new("c")).unwrap();
    session
        .coordinator_mut()
        .assets_mut()
        .delete_externally(&ItemId::new("c"));
    session.reload().unwrap();
    assert!(session.headers().is_empty());
    assert_eq!(session.full_order(), &ids(["a", "b", "d", "e"])[..]);
}

#[test]
fn externally_deleted_items_leave_the_selection() {
    let mut session = open_session(SessionConfig::default());
    session.tap(0);
    session.tap(1);
    session
        .coordinator_mut()
        .assets_mut()
        .delete_externally(&ItemId::new("a"));
    session.reload().unwrap();
    assert_eq!(
        session.selection().selected_items_in_order(),
        &ids(["b"])[..]
    );
}

// ============================================================================
// Sort preference
// ============================================================================

#[test]
fn native_sort_then_commit_switches_to_custom() {
    let mut session = open_session(SessionConfig::default());
    session
        .set_sort_preference(SortPreference::CreationDate)
        .unwrap();
    assert_eq!(session.full_order(), &ids(["e", "d", "c", "b", "a"])[..]);

    session.tap(0);
    session.tap(4);
    session.commit_selection().unwrap();
    assert_eq!(session.preference(), SortPreference::Custom);

    session.open(album()).unwrap();
    assert_eq!(session.preference(), SortPreference::Custom);
    assert_eq!(session.full_order(), &ids(["e", "a", "d", "c", "b"])[..]);
}

#[test]
fn default_sort_applies_to_new_collections() {
    let config = SessionConfig::default().with_default_sort(SortPreference::ModificationDate);
    let session = open_session(config);
    assert_eq!(session.preference(), SortPreference::ModificationDate);
    assert_eq!(session.full_order(), &ids(["e", "d", "c", "b", "a"])[..]);
}

// ============================================================================
// Clipboard and mutations
// ============================================================================

#[test]
fn copy_then_paste_into_another_collection() {
    let mut session = open_session(SessionConfig::default());
    session.open(other()).unwrap();
    session.tap(1);
    session.tap(0);
    assert_eq!(session.copy_selection().unwrap(), 2);
    assert_eq!(session.pasteboard().text(), Some("y,x"));

    session.open(album()).unwrap();
    let inserted = session.paste(1).unwrap();
    assert_eq!(inserted, ids(["y", "x"]));
    assert_eq!(
        session.full_order(),
        &ids(["a", "y", "x", "b", "c", "d", "e"])[..]
    );

    session.undo().unwrap();
    assert_eq!(session.full_order(), &ids(["a", "b", "c", "d", "e"])[..]);
}

#[test]
fn paste_past_the_end_appends() {
    let mut session = open_session(SessionConfig::default());
    session.set_pasteboard(Pasteboard::from_text("x,gone"));
    let inserted = session.paste(99).unwrap();
    assert_eq!(inserted, ids(["x"]));
    assert_eq!(session.full_order().last(), Some(&ItemId::new("x")));
}

#[test]
fn paste_with_nothing_copied_fails() {
    let mut session = open_session(SessionConfig::default());
    assert!(matches!(session.paste(0), Err(SessionError::Pasteboard(_))));
    assert!(!session.can_undo());
}

#[test]
fn delete_selection_and_undo_restores_position() {
    let mut session = open_session(SessionConfig::default());
    session.tap(1);
    let removed = session.delete_selection().unwrap();
    assert_eq!(removed, ids(["b"]));
    assert_eq!(session.full_order(), &ids(["a", "c", "d", "e"])[..]);
    assert!(session.selection().is_empty());

    session.undo().unwrap();
    assert_eq!(session.full_order(), &ids(["a", "b", "c", "d", "e"])[..]);
}

#[test]
fn move_selection_to_other_collection() {
    let mut session = open_session(SessionConfig::default());
    session.tap(0);
    session.tap(4);
    let moved = session.move_selection(&other()).unwrap();
    assert_eq!(moved, ids(["a", "e"]));
    assert_eq!(session.full_order(), &ids(["b", "c", "d"])[..]);
    assert_eq!(store_items(&session, &other()), ids(["x", "y", "a", "e"]));

    session.undo().unwrap();
    assert_eq!(store_items(&session, &other()), ids(["x", "y"]));
    assert_eq!(session.full_order(), &ids(["a", "b", "c", "d", "e"])[..]);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn denied_access_rejects_commit_without_recording() {
    let mut session = open_session(SessionConfig::default());
    session
        .coordinator_mut()
        .assets_mut()
        .set_access(AccessLevel::Denied);
    session.tap(2);
    session.tap(0);
    assert!(matches!(
        session.commit_selection(),
        Err(SessionError::Sync(SyncError::PermissionDenied))
    ));
    assert!(!session.can_undo());
    assert_eq!(session.full_order(), &ids(["a", "b", "c", "d", "e"])[..]);
    assert_eq!(session.selection().len(), 2);
}

#[test]
fn rejected_write_leaves_order_unchanged() {
    let mut session = open_session(SessionConfig::default());
    session.coordinator_mut().assets_mut().fail_next("offline");
    session.tap(2);
    session.tap(0);
    match session.commit_selection() {
        Err(SessionError::Sync(SyncError::SyncFailed(reason))) => {
            assert!(reason.contains("offline"));
        }
        other => panic!("expected SyncFailed, got {other:?}"),
    }
    assert!(!session.can_undo());
    session.reload().unwrap();
    assert_eq!(session.full_order(), &ids(["a", "b", "c", "d", "e"])[..]);
}

#[test]
fn opening_an_unknown_collection_fails() {
    let mut session = open_session(SessionConfig::default());
    assert!(matches!(
        session.open(CollectionId::new("missing")),
        Err(SessionError::Fetch(_))
    ));
    assert!(session.collection().is_none());
    assert!(session.visible_items().is_empty());
}

// ============================================================================
// Logging
// ============================================================================

#[test]
fn commit_runs_in_span_and_logs_success() {
    let mut session = open_session(SessionConfig::default());
    session.tap(1);
    session.tap(0);
    let captured = with_capture(|| {
        session.commit_selection().unwrap();
    });
    assert!(captured.spans.iter().any(|s| s == "album.commit"));
    let ok = captured
        .events
        .iter()
        .find(|e| e.message() == "album.commit.ok")
        .expect("commit success is logged");
    assert_eq!(ok.level, tracing::Level::INFO);
    assert_eq!(ok.fields.get("len").map(String::as_str), Some("5"));
}

#[test]
fn permission_failure_logs_warning() {
    let mut session = open_session(SessionConfig::default());
    session
        .coordinator_mut()
        .assets_mut()
        .set_access(AccessLevel::NotDetermined);
    session.tap(1);
    session.tap(0);
    let captured = with_capture(|| {
        let _ = session.commit_selection();
    });
    assert!(
        captured
            .events
            .iter()
            .any(|e| e.level == tracing::Level::WARN && e.message() == "album.permission_denied")
    );
}

#[test]
fn undo_runs_in_span() {
    let mut session = open_session(SessionConfig::default());
    session.tap(1);
    session.tap(0);
    session.commit_selection().unwrap();
    let captured = with_capture(|| {
        session.undo().unwrap();
    });
    assert!(captured.spans.iter().any(|s| s == "album.undo"));
}

// ============================================================================
// File-backed session
// ============================================================================

#[test]
fn json_file_session_restores_order_and_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("albums.json");

    let assets = {
        let backend: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&path).unwrap());
        let mut session = AlbumSession::with_backend(SessionConfig::default(), library(), backend);
        session.open(album()).unwrap();
        session.tap(4);
        session.tap(0);
        session.commit_selection().unwrap();
        session.set_header(&ItemId::new("e")).unwrap();
        session.toggle_collapse(&ItemId::new("e")).unwrap();
        session.coordinator().assets().clone()
    };

    let backend: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&path).unwrap());
    let mut session = AlbumSession::with_backend(SessionConfig::default(), assets, backend);
    session.open(album()).unwrap();
    assert_eq!(session.full_order(), &ids(["b", "c", "d", "e", "a"])[..]);
    assert_eq!(session.visible_items(), &ids(["b", "c", "d", "e"])[..]);
    assert!(session.headers().is_collapsed(&ItemId::new("e")));
    assert!(!session.can_undo());
}

#[test]
fn new_items_from_outside_append_to_saved_order() {
    let mut session = open_session(SessionConfig::default());
    session.tap(4);
    session.tap(0);
    session.commit_selection().unwrap();
    session
        .coordinator_mut()
        .assets_mut()
        .add_externally(&album(), "f");
    session.reload().unwrap();
    assert_eq!(
        session.full_order(),
        &ids(["b", "c", "d", "e", "a", "f"])[..]
    );
    assert!(session.coordinator().assets().contains(&ItemId::new("f")));
}
