use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

mod errors;
mod kv_repo;
mod note_repo;
mod schema;

pub(crate) use errors::{StoreError, StoreResult};
pub(crate) use kv_repo::{delete_kv, get_kv, set_kv};
pub(crate) use note_repo::{delete_note, fetch_note, fetch_notes, insert_note, update_note};

pub(crate) struct Db {
    conn: Connection,
}

impl Db {
    pub(crate) fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        schema::init(&conn)?;
        debug!(path = %path.display(), "opened database");
        Ok(Self { conn })
    }

    pub(crate) fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init(&conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, err)| StoreError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reopening_keeps_tables() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.db");

        let db = Db::open(&path).unwrap();
        set_kv(&db, "k", "v").unwrap();
        db.close().unwrap();

        let db = Db::open(&path).unwrap();
        assert_eq!(get_kv(&db, "k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn open_fails_for_directory_path() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Db::open(dir.path()),
            Err(StoreError::Unavailable(_))
        ));
    }
}
