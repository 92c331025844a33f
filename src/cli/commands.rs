use anyhow::{Result, bail};
use crossterm::terminal;
use std::path::Path;

use crate::{
    app::{AppContext, NotesController},
    cli::args::{Cli, Command},
    controller::NoticeLevel,
    dictation::{AudioClip, TranscriptionClient},
    domain::note::{Note, NoteId},
    format, tui,
};

pub(crate) fn dispatch(app: &mut AppContext, cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::List) => list_notes(app.controller()),
        Some(Command::Add { name, content }) => {
            let created = app.controller().create_note(&name, &content);
            report(app.controller())?;
            if let Some(id) = created {
                println!("{id}");
            }
            Ok(())
        }
        Some(Command::Show { id }) => show_note(app.controller(), &id),
        Some(Command::Delete { id }) => {
            let id = resolve_id(app.controller(), &id)?;
            app.controller().delete_note(&id);
            report(app.controller())
        }
        Some(Command::Export { dir }) => {
            let dir = dir.unwrap_or_else(|| app.settings().export_dir.clone());
            if let Some(path) = app.controller().export(&dir) {
                println!("{}", path.display());
            }
            report(app.controller())
        }
        Some(Command::Dictate { file }) => dictate_file(app, &file),
        Some(Command::Version) => {
            println!("quill {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => tui::run_tui(app),
    }
}

fn list_notes(controller: &mut NotesController) -> Result<()> {
    report(controller)?;
    let terminal_width = terminal::size()
        .map(|(width, _)| width as usize)
        .unwrap_or(80);
    for note in controller.notes() {
        let display_time = format::format_display_time(note.last_modified);
        let label = format!("{}  [{}]", note.display_name(), short_id(&note.id));
        let line = format::format_note_line(&display_time, &label, &note.content, terminal_width);
        println!("{}", line);
    }
    Ok(())
}

fn show_note(controller: &mut NotesController, id: &str) -> Result<()> {
    report(controller)?;
    let id = resolve_id(controller, id)?;
    match controller.notes().iter().find(|note| note.id == id) {
        Some(note) => {
            println!("{}", note.content);
            Ok(())
        }
        None => bail!("no note with id {id}"),
    }
}

fn dictate_file(app: &AppContext, file: &Path) -> Result<()> {
    let client = TranscriptionClient::from_settings(&app.settings().transcription)?;
    let clip = AudioClip::from_file(file)?;
    println!("{}", client.transcribe(&clip)?);
    Ok(())
}

/// Accepts a full id or any unambiguous prefix of one.
fn resolve_id(controller: &NotesController, input: &str) -> Result<NoteId> {
    let input = input.trim();
    if input.is_empty() {
        bail!("a note id is required");
    }
    let matches: Vec<&Note> = controller
        .notes()
        .iter()
        .filter(|note| note.id.as_str().starts_with(input))
        .collect();
    match matches.as_slice() {
        [note] => Ok(note.id.clone()),
        [] => Ok(NoteId::from(input)),
        _ => bail!("id prefix {input} matches {} notes", matches.len()),
    }
}

fn short_id(id: &NoteId) -> &str {
    id.as_str().get(..8).unwrap_or(id.as_str())
}

/// Prints queued notices; the first error becomes the command's failure.
fn report(controller: &mut NotesController) -> Result<()> {
    let mut failure = None;
    for notice in controller.take_notices() {
        match notice.level {
            NoticeLevel::Info => println!("{notice}"),
            NoticeLevel::Warning => eprintln!("{notice}"),
            NoticeLevel::Error => {
                if failure.is_none() {
                    failure = Some(notice);
                } else {
                    eprintln!("{notice}");
                }
            }
        }
    }
    match failure {
        Some(notice) => bail!("{notice}"),
        None => Ok(()),
    }
}
