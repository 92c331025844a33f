use std::sync::atomic::{AtomicI64, Ordering};
use tempfile::tempdir;

use super::*;
use crate::{
    db::{self, Db},
    export::EXPORT_FILE_NAME,
};

static CLOCK: AtomicI64 = AtomicI64::new(1_000);

fn tick_clock() -> i64 {
    CLOCK.fetch_add(1, Ordering::Relaxed)
}

fn seed(db: &Db, name: &str, content: &str, last_modified: i64) -> Note {
    let note = Note {
        id: NoteId::new(),
        name: name.to_string(),
        content: content.to_string(),
        last_modified,
    };
    db::insert_note(db, &note).unwrap();
    note
}

fn load<'a>(notes: &'a Db, kv: &'a Db) -> Controller<&'a Db, &'a Db> {
    Controller::load_with_clock(Some(notes), kv, tick_clock)
}

fn scratch_of(kv: &Db) -> String {
    ScratchBuffer::new(kv).read().unwrap()
}

fn titles(notices: &[Notice]) -> Vec<&str> {
    notices.iter().map(|n| n.title.as_str()).collect()
}

struct FailingStore;

impl NoteStore for FailingStore {
    fn create(&self, _note: &Note) -> StoreResult<()> {
        Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
    }

    fn read_all(&self) -> StoreResult<Vec<Note>> {
        Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
    }

    fn read_one(&self, _id: &NoteId) -> StoreResult<Option<Note>> {
        Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
    }

    fn update(&self, _note: &Note) -> StoreResult<()> {
        Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
    }

    fn delete(&self, _id: &NoteId) -> StoreResult<()> {
        Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
    }
}

/// Reads succeed, updates fail.
struct ReadOnlyStore<'a>(&'a Db);

impl NoteStore for ReadOnlyStore<'_> {
    fn create(&self, note: &Note) -> StoreResult<()> {
        self.0.create(note)
    }

    fn read_all(&self) -> StoreResult<Vec<Note>> {
        self.0.read_all()
    }

    fn read_one(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        self.0.read_one(id)
    }

    fn update(&self, _note: &Note) -> StoreResult<()> {
        Err(StoreError::Unavailable(rusqlite::Error::InvalidQuery))
    }

    fn delete(&self, id: &NoteId) -> StoreResult<()> {
        self.0.delete(id)
    }
}

/// Listing misses notes that single reads still find.
struct StaleListStore<'a>(&'a Db);

impl NoteStore for StaleListStore<'_> {
    fn create(&self, note: &Note) -> StoreResult<()> {
        self.0.create(note)
    }

    fn read_all(&self) -> StoreResult<Vec<Note>> {
        Ok(Vec::new())
    }

    fn read_one(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        self.0.read_one(id)
    }

    fn update(&self, note: &Note) -> StoreResult<()> {
        self.0.update(note)
    }

    fn delete(&self, id: &NoteId) -> StoreResult<()> {
        self.0.delete(id)
    }
}

#[test]
fn startup_resumes_active_note_and_drops_scratch() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let older = seed(&notes, "older", "old body", 1);
    let newer = seed(&notes, "newer", "new body", 2);
    SessionState::new(&kv).set_active(Some(&older.id)).unwrap();
    ScratchBuffer::new(&kv).write("leftover").unwrap();

    let controller = load(&notes, &kv);

    assert_eq!(controller.active_id(), Some(&older.id));
    assert_eq!(controller.editor(), "old body");
    let order: Vec<_> = controller.notes().iter().map(|n| &n.id).collect();
    assert_eq!(order, [&newer.id, &older.id]);
    assert_eq!(scratch_of(&kv), "");
}

#[test]
fn startup_self_heals_orphaned_pointer() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    seed(&notes, "kept", "body", 1);
    SessionState::new(&kv)
        .set_active(Some(&NoteId::new()))
        .unwrap();
    ScratchBuffer::new(&kv).write("draft").unwrap();

    let controller = load(&notes, &kv);

    assert_eq!(controller.active_id(), None);
    assert_eq!(controller.editor(), "draft");
    assert_eq!(db::get_kv(&kv, "active_note_id").unwrap(), None);
}

#[test]
fn startup_with_orphaned_pointer_and_no_scratch_is_empty() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    SessionState::new(&kv)
        .set_active(Some(&NoteId::new()))
        .unwrap();

    let controller = load(&notes, &kv);

    assert_eq!(controller.active_id(), None);
    assert_eq!(controller.editor(), "");
    assert_eq!(SessionState::new(&kv).get_active().unwrap(), None);
}

#[test]
fn startup_without_store_recovers_scratch_and_warns() {
    let kv = Db::open_in_memory().unwrap();
    ScratchBuffer::new(&kv).write("unsaved").unwrap();

    let mut controller = Controller::<&Db, &Db>::load_with_clock(None, &kv, tick_clock);

    assert!(!controller.is_storage_available());
    assert!(controller.notes().is_empty());
    assert_eq!(controller.editor(), "unsaved");
    let notices = controller.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
}

#[test]
fn startup_degrades_when_notes_cannot_be_read() {
    let kv = Db::open_in_memory().unwrap();
    ScratchBuffer::new(&kv).write("unsaved").unwrap();
    SessionState::new(&kv)
        .set_active(Some(&NoteId::new()))
        .unwrap();

    let mut controller = Controller::load_with_clock(Some(FailingStore), &kv, tick_clock);

    assert!(controller.notes().is_empty());
    assert_eq!(controller.active_id(), None);
    assert_eq!(controller.editor(), "unsaved");
    let notices = controller.take_notices();
    assert_eq!(titles(&notices), ["Error"]);
    assert!(notices[0].message.contains("Could not load notes"));
}

#[test]
fn whitespace_only_save_is_rejected_without_prompt() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let mut controller = load(&notes, &kv);
    controller.edit("  \n\t ".into(), Instant::now());

    assert_eq!(controller.save(), SaveOutcome::Rejected);

    assert!(notes.read_all().unwrap().is_empty());
    assert_eq!(titles(&controller.take_notices()), ["Empty Note"]);
}

#[test]
fn save_of_new_content_asks_for_name_then_creates_note() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let mut controller = load(&notes, &kv);
    controller.edit("# Plan\n".into(), Instant::now());
    ScratchBuffer::new(&kv).write("# Plan\n").unwrap();

    assert_eq!(controller.save(), SaveOutcome::NeedsName);
    assert!(controller.save_as("  Plan  "));

    let stored = notes.read_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Plan");
    assert_eq!(stored[0].content, "# Plan\n");
    assert_eq!(controller.active_id(), Some(&stored[0].id));
    assert_eq!(
        SessionState::new(&kv).get_active().unwrap(),
        Some(stored[0].id.clone())
    );
    assert_eq!(scratch_of(&kv), "");
    assert_eq!(titles(&controller.take_notices()), ["Note Saved"]);
}

#[test]
fn blank_name_leaves_state_unchanged() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let mut controller = load(&notes, &kv);
    controller.edit("text".into(), Instant::now());

    assert!(!controller.save_as("   "));

    assert!(notes.read_all().unwrap().is_empty());
    assert_eq!(controller.active_id(), None);
    assert_eq!(controller.editor(), "text");
}

#[test]
fn two_saves_create_distinct_notes() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let mut controller = load(&notes, &kv);

    controller.edit("first".into(), Instant::now());
    assert!(controller.save_as("one"));
    controller.new_note();
    controller.edit("second".into(), Instant::now());
    assert!(controller.save_as("two"));

    let stored = notes.read_all().unwrap();
    assert_eq!(stored.len(), 2);
    assert_ne!(stored[0].id, stored[1].id);
    let names: Vec<_> = controller.notes().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["two", "one"]);
}

#[test]
fn saving_active_note_updates_and_reorders() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let older = seed(&notes, "older", "v1", 1);
    seed(&notes, "newer", "x", 2);
    let mut controller = load(&notes, &kv);

    controller.open_note(&older.id);
    controller.edit("v2".into(), Instant::now());
    assert_eq!(controller.save(), SaveOutcome::Updated);

    assert_eq!(controller.notes()[0].id, older.id);
    let stored = notes.read_one(&older.id).unwrap().unwrap();
    assert_eq!(stored.content, "v2");
    assert!(stored.last_modified > 2);
}

#[test]
fn failed_update_keeps_the_edit() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let note = seed(&notes, "n", "v1", 1);
    let mut controller =
        Controller::load_with_clock(Some(ReadOnlyStore(&notes)), &kv, tick_clock);
    controller.open_note(&note.id);
    controller.take_notices();

    controller.edit("v2".into(), Instant::now());
    assert_eq!(controller.save(), SaveOutcome::Failed);

    assert_eq!(controller.editor(), "v2");
    assert_eq!(controller.notes()[0].content, "v1");
    assert_eq!(titles(&controller.take_notices()), ["Update Error"]);
}

#[test]
fn opening_a_note_preserves_pending_scratch_first() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let target = seed(&notes, "B", "b body", 1);
    let mut controller = load(&notes, &kv);
    let start = Instant::now();

    controller.edit("draft text".into(), start);
    controller.open_note(&target.id);

    assert_eq!(scratch_of(&kv), "draft text");
    assert_eq!(controller.editor(), "b body");
    assert_eq!(controller.active_id(), Some(&target.id));
    assert_eq!(
        titles(&controller.take_notices()),
        ["Scratchpad Saved", "Note Opened"]
    );

    // The cancelled debounce must not land later.
    controller.tick(start + SCRATCH_DEBOUNCE * 2);
    assert_eq!(scratch_of(&kv), "draft text");
}

#[test]
fn opening_unknown_note_changes_nothing() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let mut controller = load(&notes, &kv);
    controller.edit("draft".into(), Instant::now());

    controller.open_note(&NoteId::new());

    assert_eq!(controller.active_id(), None);
    assert_eq!(controller.editor(), "draft");
    assert_eq!(titles(&controller.take_notices()), ["Note Not Found"]);
}

#[test]
fn deleting_active_note_resets_to_empty_scratch() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let doomed = seed(&notes, "doomed", "secret text", 1);
    let mut controller = load(&notes, &kv);
    controller.open_note(&doomed.id);

    controller.delete_note(&doomed.id);

    assert_eq!(controller.active_id(), None);
    assert_eq!(controller.editor(), "");
    assert!(controller.notes().is_empty());
    assert_eq!(scratch_of(&kv), "");
    assert_eq!(SessionState::new(&kv).get_active().unwrap(), None);
    assert!(notes.read_all().unwrap().is_empty());
}

#[test]
fn deleting_other_note_keeps_editor() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let open = seed(&notes, "open", "keep me", 2);
    let other = seed(&notes, "other", "bye", 1);
    let mut controller = load(&notes, &kv);
    controller.open_note(&open.id);

    controller.delete_note(&other.id);

    assert_eq!(controller.active_id(), Some(&open.id));
    assert_eq!(controller.editor(), "keep me");
    assert_eq!(controller.notes().len(), 1);
}

#[test]
fn deleting_unknown_note_is_soft() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    seed(&notes, "kept", "x", 1);
    let mut controller = load(&notes, &kv);

    controller.delete_note(&NoteId::new());

    assert_eq!(notes.read_all().unwrap().len(), 1);
    let notices = controller.take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Info);
}

#[test]
fn new_note_discards_scratch() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    ScratchBuffer::new(&kv).write("old draft").unwrap();
    let mut controller = load(&notes, &kv);
    assert_eq!(controller.editor(), "old draft");

    controller.new_note();

    assert_eq!(controller.editor(), "");
    assert_eq!(scratch_of(&kv), "");
}

#[test]
fn scratch_is_written_after_quiet_period() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let mut controller = load(&notes, &kv);
    let start = Instant::now();

    controller.edit("a".into(), start);
    controller.edit("ab".into(), start + Duration::from_millis(300));
    controller.tick(start + Duration::from_millis(600));
    assert_eq!(scratch_of(&kv), "");
    assert!(controller.has_pending_scratch());

    controller.tick(start + Duration::from_millis(800));
    assert_eq!(scratch_of(&kv), "ab");
    assert!(!controller.has_pending_scratch());
}

#[test]
fn edits_to_an_open_note_do_not_touch_scratch() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let note = seed(&notes, "n", "body", 1);
    let mut controller = load(&notes, &kv);
    controller.open_note(&note.id);
    let start = Instant::now();

    controller.edit("body changed".into(), start);
    controller.tick(start + SCRATCH_DEBOUNCE);

    assert_eq!(scratch_of(&kv), "");
}

#[test]
fn shutdown_flushes_pending_scratch() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let mut controller = load(&notes, &kv);
    controller.edit("typed just now".into(), Instant::now());

    let (store, _) = controller.shutdown();

    assert!(store.is_some());
    assert_eq!(scratch_of(&kv), "typed just now");
}

#[test]
fn export_with_no_notes_reports_nothing_to_export() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let mut controller = load(&notes, &kv);

    assert_eq!(controller.export(dir.path()), None);

    assert!(!dir.path().join(EXPORT_FILE_NAME).exists());
    assert_eq!(titles(&controller.take_notices()), ["No Notes"]);
}

#[test]
fn export_combines_notes_newest_first() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    seed(&notes, "B", "y", 1);
    seed(&notes, "A", "x", 2);
    let dir = tempdir().unwrap();
    let mut controller = load(&notes, &kv);

    let path = controller.export(dir.path()).unwrap();

    let contents = std::fs::read_to_string(path).unwrap();
    assert_eq!(contents, "# A\n\nx\n\n---\n\n# B\n\ny\n");
}

#[test]
fn transcription_is_appended_on_a_new_line() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let mut controller = load(&notes, &kv);
    let start = Instant::now();
    controller.edit("spoken:".into(), start);

    controller.append_transcription(" hello world ", start);

    assert_eq!(controller.editor(), "spoken:\nhello world");
    controller.tick(start + SCRATCH_DEBOUNCE);
    assert_eq!(scratch_of(&kv), "spoken:\nhello world");
}

#[test]
fn blank_transcription_leaves_editor_unchanged() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let mut controller = load(&notes, &kv);
    controller.edit("keep".into(), Instant::now());

    controller.append_transcription("   ", Instant::now());

    assert_eq!(controller.editor(), "keep");
    assert_eq!(titles(&controller.take_notices()), ["Transcription Failed"]);
}

#[test]
fn quick_create_leaves_editor_and_scratch_alone() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    ScratchBuffer::new(&kv).write("draft").unwrap();
    let mut controller = load(&notes, &kv);

    let id = controller.create_note("Groceries", "- [ ] milk").unwrap();

    assert_eq!(controller.active_id(), None);
    assert_eq!(controller.editor(), "draft");
    assert_eq!(scratch_of(&kv), "draft");
    assert_eq!(notes.read_one(&id).unwrap().unwrap().content, "- [ ] milk");
}

#[test]
fn save_without_store_reports_failure() {
    let kv = Db::open_in_memory().unwrap();
    let mut controller = Controller::<&Db, &Db>::load_with_clock(None, &kv, tick_clock);
    controller.take_notices();
    controller.edit("text".into(), Instant::now());

    assert!(!controller.save_as("name"));

    assert_eq!(controller.active_id(), None);
    let notices = controller.take_notices();
    assert_eq!(titles(&notices), ["Save Error"]);
    assert!(notices[0].message.contains("not open"));
}

#[test]
fn outside_failures_become_error_notices() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let mut controller = load(&notes, &kv);
    controller.take_notices();

    controller.report_failure("Transcription Failed", "no audio data captured");

    let notices = controller.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "no audio data captured");
}

#[test]
fn startup_fetches_active_note_missing_from_listing() {
    let notes = Db::open_in_memory().unwrap();
    let kv = Db::open_in_memory().unwrap();
    let note = seed(&notes, "pinned", "pinned body", 5);
    SessionState::new(&kv).set_active(Some(&note.id)).unwrap();
    ScratchBuffer::new(&kv).write("leftover").unwrap();

    let controller =
        Controller::load_with_clock(Some(StaleListStore(&notes)), &kv, tick_clock);

    assert_eq!(controller.active_id(), Some(&note.id));
    assert_eq!(controller.editor(), "pinned body");
    let listed: Vec<_> = controller.notes().iter().map(|n| &n.id).collect();
    assert_eq!(listed, [&note.id]);
    assert_eq!(scratch_of(&kv), "");
    assert_eq!(
        SessionState::new(&kv).get_active().unwrap().as_ref(),
        Some(&note.id)
    );
}
