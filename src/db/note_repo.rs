use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

use crate::{
    db::{Db, StoreError, StoreResult},
    domain::note::{Note, NoteId},
};

pub(crate) fn insert_note(db: &Db, note: &Note) -> StoreResult<()> {
    let inserted = db.conn().execute(
        "INSERT INTO notes (note_id, name, content, last_modified)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(note_id) DO NOTHING",
        params![
            note.id.as_str(),
            &note.name,
            &note.content,
            note.last_modified
        ],
    )?;
    if inserted == 0 {
        return Err(StoreError::Duplicate(note.id.clone()));
    }
    debug!(id = %note.id, "inserted note");
    Ok(())
}

pub(crate) fn fetch_notes(db: &Db) -> StoreResult<Vec<Note>> {
    let mut stmt = db
        .conn()
        .prepare("SELECT note_id, name, content, last_modified FROM notes")?;
    let rows = stmt.query_map([], note_from_row)?;

    let mut notes = Vec::new();
    for row in rows {
        notes.push(row?);
    }
    Ok(notes)
}

pub(crate) fn fetch_note(db: &Db, id: &NoteId) -> StoreResult<Option<Note>> {
    let note = db
        .conn()
        .query_row(
            "SELECT note_id, name, content, last_modified
             FROM notes
             WHERE note_id = ?1",
            params![id.as_str()],
            note_from_row,
        )
        .optional()?;
    Ok(note)
}

pub(crate) fn update_note(db: &Db, note: &Note) -> StoreResult<()> {
    let updated = db.conn().execute(
        "UPDATE notes
         SET name = ?2, content = ?3, last_modified = ?4
         WHERE note_id = ?1",
        params![
            note.id.as_str(),
            &note.name,
            &note.content,
            note.last_modified
        ],
    )?;
    if updated == 0 {
        return Err(StoreError::NotFound(note.id.clone()));
    }
    debug!(id = %note.id, "updated note");
    Ok(())
}

pub(crate) fn delete_note(db: &Db, id: &NoteId) -> StoreResult<()> {
    let deleted = db
        .conn()
        .execute("DELETE FROM notes WHERE note_id = ?1", params![id.as_str()])?;
    debug!(%id, deleted, "deleted note");
    Ok(())
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get::<_, String>(0)?.into(),
        name: row.get(1)?,
        content: row.get(2)?,
        last_modified: row.get(3)?,
    })
}
