//! Storage seams used by the controller.
//!
//! `NoteStore` is the durable keyed record store and `KvStore` is the small
//! string store that backs both the scratch buffer and the session pointer.
//! `Db` implements both; tests substitute their own implementations.

use crate::{
    db::{self, Db, StoreResult},
    domain::note::{Note, NoteId},
};

mod scratch;
mod session;

pub(crate) use scratch::ScratchBuffer;
pub(crate) use session::SessionState;

pub(crate) trait NoteStore {
    /// Fails with `StoreError::Duplicate` if the id is already taken.
    fn create(&self, note: &Note) -> StoreResult<()>;
    /// Every stored note, in no particular order.
    fn read_all(&self) -> StoreResult<Vec<Note>>;
    fn read_one(&self, id: &NoteId) -> StoreResult<Option<Note>>;
    /// Fails with `StoreError::NotFound` if the id is unknown.
    fn update(&self, note: &Note) -> StoreResult<()>;
    /// Deleting an unknown id succeeds.
    fn delete(&self, id: &NoteId) -> StoreResult<()>;
}

pub(crate) trait KvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl NoteStore for Db {
    fn create(&self, note: &Note) -> StoreResult<()> {
        db::insert_note(self, note)
    }

    fn read_all(&self) -> StoreResult<Vec<Note>> {
        db::fetch_notes(self)
    }

    fn read_one(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        db::fetch_note(self, id)
    }

    fn update(&self, note: &Note) -> StoreResult<()> {
        db::update_note(self, note)
    }

    fn delete(&self, id: &NoteId) -> StoreResult<()> {
        db::delete_note(self, id)
    }
}

impl KvStore for Db {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        db::get_kv(self, key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        db::set_kv(self, key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        db::delete_kv(self, key)
    }
}

impl<T: NoteStore + ?Sized> NoteStore for &T {
    fn create(&self, note: &Note) -> StoreResult<()> {
        (**self).create(note)
    }

    fn read_all(&self) -> StoreResult<Vec<Note>> {
        (**self).read_all()
    }

    fn read_one(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        (**self).read_one(id)
    }

    fn update(&self, note: &Note) -> StoreResult<()> {
        (**self).update(note)
    }

    fn delete(&self, id: &NoteId) -> StoreResult<()> {
        (**self).delete(id)
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}
