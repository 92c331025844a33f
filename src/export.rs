use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::note::Note;

pub(crate) const EXPORT_FILE_NAME: &str = "All Quill Notes.md";
const NOTE_SEPARATOR: &str = "\n---\n\n";

pub(crate) struct ExportDocument {
    pub(crate) file_name: &'static str,
    pub(crate) contents: String,
}

impl ExportDocument {
    /// Renders `notes` in the order given. Returns `None` for an empty slice.
    pub(crate) fn from_notes(notes: &[Note]) -> Option<Self> {
        if notes.is_empty() {
            return None;
        }
        let contents = notes
            .iter()
            .map(|note| format!("# {}\n\n{}\n", note.display_name(), note.content.trim()))
            .collect::<Vec<_>>()
            .join(NOTE_SEPARATOR);
        Some(Self {
            file_name: EXPORT_FILE_NAME,
            contents,
        })
    }
}

pub(crate) fn save_document(dir: &Path, document: &ExportDocument) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    let path = dir.join(document.file_name);
    fs::write(&path, &document.contents)
        .with_context(|| format!("could not write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::note::NoteId;
    use tempfile::tempdir;

    fn note(name: &str, content: &str) -> Note {
        Note {
            id: NoteId::new(),
            name: name.to_string(),
            content: content.to_string(),
            last_modified: 0,
        }
    }

    #[test]
    fn nothing_to_export_for_empty_collection() {
        assert!(ExportDocument::from_notes(&[]).is_none());
    }

    #[test]
    fn notes_are_joined_with_rule() {
        let document =
            ExportDocument::from_notes(&[note("A", "x"), note("B", "y")]).unwrap();
        assert_eq!(document.contents, "# A\n\nx\n\n---\n\n# B\n\ny\n");
        assert_eq!(document.file_name, EXPORT_FILE_NAME);
    }

    #[test]
    fn names_and_content_are_trimmed() {
        let document =
            ExportDocument::from_notes(&[note("  ", "\n\n body \n")]).unwrap();
        assert_eq!(document.contents, "# Untitled Note\n\nbody\n");
    }

    #[test]
    fn save_writes_fixed_file_name() {
        let dir = tempdir().unwrap();
        let document = ExportDocument::from_notes(&[note("A", "x")]).unwrap();

        let path = save_document(&dir.path().join("out"), &document).unwrap();

        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);
        assert_eq!(fs::read_to_string(path).unwrap(), "# A\n\nx\n");
    }
}
