use crate::{db::StoreResult, domain::note::NoteId, store::KvStore};

const ACTIVE_NOTE_KEY: &str = "active_note_id";

/// Remembers which note is loaded in the editor across restarts.
pub(crate) struct SessionState<'a, K: KvStore> {
    kv: &'a K,
}

impl<'a, K: KvStore> SessionState<'a, K> {
    pub(crate) fn new(kv: &'a K) -> Self {
        Self { kv }
    }

    pub(crate) fn set_active(&self, id: Option<&NoteId>) -> StoreResult<()> {
        match id {
            Some(id) => self.kv.set(ACTIVE_NOTE_KEY, id.as_str()),
            None => self.kv.remove(ACTIVE_NOTE_KEY),
        }
    }

    pub(crate) fn get_active(&self) -> StoreResult<Option<NoteId>> {
        Ok(self
            .kv
            .get(ACTIVE_NOTE_KEY)?
            .filter(|value| !value.is_empty())
            .map(NoteId::from))
    }
}
