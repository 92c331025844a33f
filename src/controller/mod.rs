//! Reconciles the note store, the scratch buffer and the session pointer.
//!
//! The controller is the only code that writes to any of the three. Every
//! action reports its outcome as a [`Notice`]; storage errors never escape.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, info};

use crate::{
    db::{StoreError, StoreResult},
    domain::note::{Note, NoteId, now_millis, sort_for_display},
    export::{self, ExportDocument},
    store::{KvStore, NoteStore, ScratchBuffer, SessionState},
};

mod debounce;
mod notice;

use debounce::Debounce;
pub(crate) use notice::{Notice, NoticeLevel};

pub(crate) const SCRATCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SaveOutcome {
    /// No note is active; the caller must ask for a name and call `save_as`.
    NeedsName,
    Updated,
    Rejected,
    Failed,
}

pub(crate) struct Controller<S, K> {
    store: Option<S>,
    kv: K,
    notes: Vec<Note>,
    active: Option<NoteId>,
    editor: String,
    scratch_write: Debounce<String>,
    notices: Vec<Notice>,
    clock: fn() -> i64,
}

impl<S: NoteStore, K: KvStore> Controller<S, K> {
    /// Builds the startup state. `store` is `None` when the note database
    /// could not be opened, which leaves the controller in scratch-only mode.
    pub(crate) fn load(store: Option<S>, kv: K) -> Self {
        Self::load_with_clock(store, kv, now_millis)
    }

    pub(crate) fn load_with_clock(store: Option<S>, kv: K, clock: fn() -> i64) -> Self {
        let mut controller = Self {
            store,
            kv,
            notes: Vec::new(),
            active: None,
            editor: String::new(),
            scratch_write: Debounce::new(SCRATCH_DEBOUNCE),
            notices: Vec::new(),
            clock,
        };
        controller.reconcile();
        controller
    }

    pub(crate) fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub(crate) fn active_id(&self) -> Option<&NoteId> {
        self.active.as_ref()
    }

    pub(crate) fn active_note(&self) -> Option<&Note> {
        let id = self.active.as_ref()?;
        self.notes.iter().find(|note| &note.id == id)
    }

    pub(crate) fn editor(&self) -> &str {
        &self.editor
    }

    pub(crate) fn is_storage_available(&self) -> bool {
        self.store.is_some()
    }

    /// True while unowned edits are waiting for their scratch write.
    pub(crate) fn has_pending_scratch(&self) -> bool {
        self.scratch_write.is_pending()
    }

    pub(crate) fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        notice.log();
        self.notices.push(notice);
    }

    /// Surfaces a failure from outside the controller, such as dictation.
    pub(crate) fn report_failure(&mut self, title: &str, message: impl fmt::Display) {
        self.notify(Notice::error(title, message.to_string()));
    }

    /// Replaces the editor content. Unowned content is written to the scratch
    /// buffer once edits stop for [`SCRATCH_DEBOUNCE`].
    pub(crate) fn edit(&mut self, text: String, now: Instant) {
        self.editor = text;
        if self.active.is_none() {
            self.scratch_write.schedule(self.editor.clone(), now);
        }
    }

    pub(crate) fn tick(&mut self, now: Instant) {
        if let Some(text) = self.scratch_write.take_due(now) {
            debug!(len = text.len(), "writing scratch buffer");
            let result = self.scratch().write(&text);
            self.warn_on_failure(result, "Could not save scratch content");
        }
    }

    pub(crate) fn new_note(&mut self) {
        self.reset_to_empty_scratch();
        self.notify(Notice::info("New Note", "Editor cleared for a new note."));
    }

    pub(crate) fn open_note(&mut self, id: &NoteId) {
        let Some(note) = self.notes.iter().find(|note| &note.id == id).cloned() else {
            self.notify(Notice::error(
                "Note Not Found",
                format!("No note with id {id}."),
            ));
            return;
        };

        self.scratch_write.cancel();
        if self.active.is_none() && !self.editor.trim().is_empty() {
            let preserved = self.scratch().write(&self.editor);
            match preserved {
                Ok(()) => self.notify(Notice::info(
                    "Scratchpad Saved",
                    "Current unsaved content was saved to scratchpad.",
                )),
                Err(err) => self.notify(Notice::warning(
                    "Scratchpad Error",
                    format!("Could not preserve unsaved content: {err}."),
                )),
            }
        }

        self.active = Some(note.id.clone());
        self.editor = note.content.clone();
        self.persist_session();
        self.notify(Notice::info(
            "Note Opened",
            format!("\"{}\" loaded into editor.", note.display_name()),
        ));
    }

    pub(crate) fn save(&mut self) -> SaveOutcome {
        match self.active.clone() {
            Some(id) => self.update_active(&id),
            None if self.editor.trim().is_empty() => {
                self.notify(Notice::error(
                    "Empty Note",
                    "Cannot save an empty note. Type something first!",
                ));
                SaveOutcome::Rejected
            }
            None => SaveOutcome::NeedsName,
        }
    }

    /// Completes a save of unowned content under `name`. Returns `true` once
    /// the note exists; on `false` the name prompt should stay open.
    pub(crate) fn save_as(&mut self, name: &str) -> bool {
        if self.active.is_some() {
            self.notify(Notice::error(
                "Save Error",
                "A note is already open; save updates it instead.",
            ));
            return false;
        }
        let content = self.editor.clone();
        let Some(id) = self.insert_new(name, content) else {
            return false;
        };

        self.scratch_write.cancel();
        self.active = Some(id);
        self.persist_session();
        let cleared = self.scratch().clear();
        self.warn_on_failure(cleared, "Could not clear scratch content");
        true
    }

    /// Stores a note without touching the editor, the open note or the
    /// scratch buffer.
    pub(crate) fn create_note(&mut self, name: &str, content: &str) -> Option<NoteId> {
        self.insert_new(name, content.to_string())
    }

    pub(crate) fn delete_note(&mut self, id: &NoteId) {
        let position = self.notes.iter().position(|note| &note.id == id);
        let deleted = self.note_store().and_then(|store| store.delete(id));
        if let Err(err) = deleted {
            self.notify(Notice::error(
                "Delete Error",
                format!("Could not delete note: {err}."),
            ));
            return;
        }

        let Some(position) = position else {
            self.notify(Notice::info(
                "Note Not Found",
                format!("No note with id {id}; nothing was deleted."),
            ));
            return;
        };

        let removed = self.notes.remove(position);
        self.notify(Notice::info(
            "Note Deleted",
            format!("\"{}\" has been deleted.", removed.display_name()),
        ));
        if self.active.as_ref() == Some(id) {
            self.reset_to_empty_scratch();
        }
    }

    /// Writes every note, newest first, into one markdown file under `dir`.
    pub(crate) fn export(&mut self, dir: &Path) -> Option<PathBuf> {
        let Some(document) = ExportDocument::from_notes(&self.notes) else {
            self.notify(Notice::info("No Notes", "There are no notes to export."));
            return None;
        };
        match export::save_document(dir, &document) {
            Ok(path) => {
                self.notify(Notice::info(
                    "All Notes Exported",
                    format!("\"{}\" has been written to {}.", document.file_name, dir.display()),
                ));
                Some(path)
            }
            Err(err) => {
                self.notify(Notice::error(
                    "Export Error",
                    format!("Could not export notes: {err:#}."),
                ));
                None
            }
        }
    }

    pub(crate) fn append_transcription(&mut self, text: &str, now: Instant) {
        let text = text.trim();
        if text.is_empty() {
            self.notify(Notice::error(
                "Transcription Failed",
                "Could not transcribe audio.",
            ));
            return;
        }
        let mut combined = self.editor.clone();
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(text);
        self.edit(combined, now);
        self.notify(Notice::info("Transcription Complete", "Text added to editor."));
    }

    /// Teardown: unowned content still waiting for its debounced write is
    /// flushed, anything else pending is dropped. Hands the stores back so
    /// their connections can be closed.
    pub(crate) fn shutdown(mut self) -> (Option<S>, K) {
        if self.active.is_none() {
            if let Some(text) = self.scratch_write.flush() {
                let result = self.scratch().write(&text);
                self.warn_on_failure(result, "Could not save scratch content");
            }
        } else {
            self.scratch_write.cancel();
        }
        let Self { store, kv, .. } = self;
        (store, kv)
    }

    fn reconcile(&mut self) {
        let loaded = match self.store.as_ref().map(|store| store.read_all()) {
            None => {
                self.notify(Notice::warning(
                    "Storage Error",
                    "Note storage is not available. Notes cannot be saved.",
                ));
                None
            }
            Some(Err(err)) => {
                self.notify(Notice::warning(
                    "Error",
                    format!("Could not load notes: {err}. Some features may not work."),
                ));
                None
            }
            Some(Ok(notes)) => Some(notes),
        };

        let Some(mut notes) = loaded else {
            let cleared = self.session().set_active(None);
            self.warn_on_failure(cleared, "Could not reset the open note");
            self.restore_scratch();
            return;
        };
        sort_for_display(&mut notes);
        self.notes = notes;

        let stored_pointer = self.session().get_active();
        let pointer = match stored_pointer {
            Ok(pointer) => pointer,
            Err(err) => {
                self.warn_on_failure::<()>(Err(err), "Could not read the open note");
                None
            }
        };
        if let Some(id) = pointer {
            if let Some(note) = self.resolve(&id) {
                info!(id = %note.id, "resuming open note");
                self.active = Some(note.id);
                self.editor = note.content;
                let cleared = self.scratch().clear();
                self.warn_on_failure(cleared, "Could not clear scratch content");
                return;
            }
            info!(%id, "dropping session pointer to missing note");
            let cleared = self.session().set_active(None);
            self.warn_on_failure(cleared, "Could not reset the open note");
        }
        self.restore_scratch();
    }

    /// Finds a note by id, asking the store directly when it is missing from
    /// the loaded list.
    fn resolve(&mut self, id: &NoteId) -> Option<Note> {
        if let Some(note) = self.notes.iter().find(|note| &note.id == id) {
            return Some(note.clone());
        }
        let lookup = self.note_store().and_then(|store| store.read_one(id));
        let fetched = match lookup {
            Ok(fetched) => fetched,
            Err(err) => {
                self.warn_on_failure::<()>(Err(err), "Could not read the open note");
                None
            }
        }?;
        self.notes.push(fetched.clone());
        sort_for_display(&mut self.notes);
        Some(fetched)
    }

    fn restore_scratch(&mut self) {
        self.active = None;
        let stored = self.scratch().read();
        self.editor = match stored {
            Ok(text) => text,
            Err(err) => {
                self.warn_on_failure::<()>(Err(err), "Could not read scratch content");
                String::new()
            }
        };
    }

    fn update_active(&mut self, id: &NoteId) -> SaveOutcome {
        let Some(index) = self.notes.iter().position(|note| &note.id == id) else {
            self.notify(Notice::error(
                "Update Error",
                format!("Could not update note: {}.", StoreError::NotFound(id.clone())),
            ));
            return SaveOutcome::Failed;
        };

        let updated = Note {
            content: self.editor.clone(),
            last_modified: (self.clock)(),
            ..self.notes[index].clone()
        };
        let written = self.note_store().and_then(|store| store.update(&updated));
        match written {
            Ok(()) => {
                let message = format!("\"{}\" has been saved.", updated.display_name());
                self.notes[index] = updated;
                sort_for_display(&mut self.notes);
                self.notify(Notice::info("Note Updated", message));
                SaveOutcome::Updated
            }
            Err(err) => {
                self.notify(Notice::error(
                    "Update Error",
                    format!("Could not update note: {err}."),
                ));
                SaveOutcome::Failed
            }
        }
    }

    fn insert_new(&mut self, name: &str, content: String) -> Option<NoteId> {
        let name = name.trim();
        if name.is_empty() {
            self.notify(Notice::error("Save Error", "Note name cannot be empty."));
            return None;
        }
        if content.trim().is_empty() {
            self.notify(Notice::error(
                "Empty Note",
                "Cannot save an empty note. Type something first!",
            ));
            return None;
        }

        let note = Note {
            id: NoteId::new(),
            name: name.to_string(),
            content,
            last_modified: (self.clock)(),
        };
        let created = self.note_store().and_then(|store| store.create(&note));
        if let Err(err) = created {
            self.notify(Notice::error(
                "Save Error",
                format!("Could not save new note: {err}."),
            ));
            return None;
        }

        let id = note.id.clone();
        self.notes.push(note);
        sort_for_display(&mut self.notes);
        self.notify(Notice::info(
            "Note Saved",
            format!("\"{name}\" has been created."),
        ));
        Some(id)
    }

    /// Shared by new-note and deletion of the open note: nothing is active,
    /// the editor is empty and the scratch buffer holds nothing.
    fn reset_to_empty_scratch(&mut self) {
        self.scratch_write.cancel();
        self.active = None;
        self.editor.clear();
        self.persist_session();
        let cleared = self.scratch().clear();
        self.warn_on_failure(cleared, "Could not clear scratch content");
    }

    fn persist_session(&mut self) {
        let result = self.session().set_active(self.active.as_ref());
        self.warn_on_failure(result, "Could not remember the open note");
    }

    fn warn_on_failure<T>(&mut self, result: StoreResult<T>, context: &str) {
        if let Err(err) = result {
            self.notify(Notice::warning("Storage Error", format!("{context}: {err}.")));
        }
    }

    fn note_store(&self) -> StoreResult<&S> {
        self.store.as_ref().ok_or(StoreError::Offline)
    }

    fn scratch(&self) -> ScratchBuffer<'_, K> {
        ScratchBuffer::new(&self.kv)
    }

    fn session(&self) -> SessionState<'_, K> {
        SessionState::new(&self.kv)
    }
}

#[cfg(test)]
mod tests;
