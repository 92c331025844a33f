use crate::{db::StoreResult, store::KvStore};

const SCRATCH_KEY: &str = "editor_scratch";

/// The single slot holding editor content that belongs to no note.
pub(crate) struct ScratchBuffer<'a, K: KvStore> {
    kv: &'a K,
}

impl<'a, K: KvStore> ScratchBuffer<'a, K> {
    pub(crate) fn new(kv: &'a K) -> Self {
        Self { kv }
    }

    pub(crate) fn write(&self, text: &str) -> StoreResult<()> {
        self.kv.set(SCRATCH_KEY, text)
    }

    pub(crate) fn read(&self) -> StoreResult<String> {
        Ok(self.kv.get(SCRATCH_KEY)?.unwrap_or_default())
    }

    pub(crate) fn clear(&self) -> StoreResult<()> {
        self.kv.remove(SCRATCH_KEY)
    }
}
