use rusqlite::{OptionalExtension, params};

use crate::db::{Db, StoreResult};

pub(crate) fn set_kv(db: &Db, key: &str, value: &str) -> StoreResult<()> {
    db.conn().execute(
        "INSERT INTO kv (key, value)
         VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub(crate) fn get_kv(db: &Db, key: &str) -> StoreResult<Option<String>> {
    let value = db
        .conn()
        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

pub(crate) fn delete_kv(db: &Db, key: &str) -> StoreResult<()> {
    db.conn()
        .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_previous_value() {
        let db = Db::open_in_memory().unwrap();
        set_kv(&db, "draft", "one").unwrap();
        set_kv(&db, "draft", "two").unwrap();
        assert_eq!(get_kv(&db, "draft").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn delete_removes_key_and_tolerates_missing() {
        let db = Db::open_in_memory().unwrap();
        set_kv(&db, "draft", "one").unwrap();
        delete_kv(&db, "draft").unwrap();
        delete_kv(&db, "draft").unwrap();
        assert_eq!(get_kv(&db, "draft").unwrap(), None);
    }
}
