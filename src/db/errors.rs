use thiserror::Error;

use crate::domain::note::NoteId;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("note {0} already exists")]
    Duplicate(NoteId),

    #[error("note {0} does not exist")]
    NotFound(NoteId),

    #[error("note storage is not open")]
    Offline,

    #[error("storage unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),
}

pub(crate) type StoreResult<T> = Result<T, StoreError>;
