use chrono::Utc;
use uuid::Uuid;

pub(crate) const UNTITLED_NOTE: &str = "Untitled Note";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NoteId(String);

impl NoteId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Note {
    pub(crate) id: NoteId,
    pub(crate) name: String,
    pub(crate) content: String,
    /// Milliseconds since the Unix epoch.
    pub(crate) last_modified: i64,
}

impl Note {
    pub(crate) fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            UNTITLED_NOTE
        } else {
            trimmed
        }
    }
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Most recently modified first. Stable, so ties keep their relative order.
pub(crate) fn sort_for_display(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
}
