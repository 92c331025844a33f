use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;
use tracing::info;

use super::state::{Focus, InputState, Pending, TuiState};
use crate::{
    app::AppContext,
    controller::SaveOutcome,
    dictation::{Recorder, TranscriptionClient},
    domain::note::NoteId,
};

#[derive(Clone, Copy, Debug)]
enum Action {
    Quit,
    Dismiss,
    ToggleFocus,
    TogglePreview,
    NewNote,
    Save,
    Export,
    ToggleRecording,
    OpenSelected,
    DeleteSelected,
    InsertNewline,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Backspace,
    Delete,
    InsertChar(char),
}

#[derive(Clone, Copy, Debug)]
enum PromptAction {
    Submit,
    Cancel,
    Backspace,
    InsertChar(char),
}

pub(crate) fn handle_tui_key(
    app: &mut AppContext,
    state: &mut TuiState,
    key: KeyEvent,
) -> Result<bool> {
    if key.kind == KeyEventKind::Release {
        return Ok(false);
    }
    if state.name_prompt.is_some() {
        if let Some(action) = key_to_prompt_action(&key) {
            apply_prompt_action(app, state, action);
        }
        return Ok(false);
    }
    match key_to_action(&key, state.focus) {
        Some(action) => apply_action(app, state, action),
        None => Ok(false),
    }
}

fn key_to_action(key: &KeyEvent, focus: Focus) -> Option<Action> {
    let code = key.code;

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('n') => Some(Action::NewNote),
            KeyCode::Char('s') => Some(Action::Save),
            KeyCode::Char('e') => Some(Action::Export),
            KeyCode::Char('r') => Some(Action::ToggleRecording),
            KeyCode::Char('p') => Some(Action::TogglePreview),
            _ => None,
        };
    }

    match code {
        KeyCode::Esc => return Some(Action::Dismiss),
        KeyCode::Tab => return Some(Action::ToggleFocus),
        _ => {}
    }

    if matches!(focus, Focus::Notes) {
        return match code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
            KeyCode::Enter => Some(Action::OpenSelected),
            KeyCode::Delete | KeyCode::Char('d') => Some(Action::DeleteSelected),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    match code {
        KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => Some(Action::InsertNewline),
        KeyCode::Up => Some(Action::MoveUp),
        KeyCode::Down => Some(Action::MoveDown),
        KeyCode::Left => Some(Action::MoveLeft),
        KeyCode::Right => Some(Action::MoveRight),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Delete => Some(Action::Delete),
        KeyCode::Char(ch) => Some(Action::InsertChar(ch)),
        _ => None,
    }
}

fn key_to_prompt_action(key: &KeyEvent) -> Option<PromptAction> {
    match key.code {
        KeyCode::Enter => Some(PromptAction::Submit),
        KeyCode::Esc => Some(PromptAction::Cancel),
        KeyCode::Backspace => Some(PromptAction::Backspace),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(PromptAction::InsertChar(ch))
        }
        _ => None,
    }
}

fn apply_action(app: &mut AppContext, state: &mut TuiState, action: Action) -> Result<bool> {
    match action {
        Action::Quit => return Ok(true),
        Action::Dismiss => state.notice = None,
        Action::ToggleFocus => state.toggle_focus(),
        Action::TogglePreview => state.show_preview = !state.show_preview,
        Action::NewNote => {
            app.controller().new_note();
            sync_from_controller(app, state);
            state.focus = Focus::Editor;
        }
        Action::Save => match app.controller().save() {
            SaveOutcome::NeedsName => state.open_name_prompt(),
            SaveOutcome::Updated | SaveOutcome::Rejected | SaveOutcome::Failed => {}
        },
        Action::Export => {
            let dir = app.settings().export_dir.clone();
            app.controller().export(&dir);
        }
        Action::ToggleRecording => toggle_recording(app, state),
        Action::OpenSelected => {
            if let Some(id) = selected_id(app, state) {
                app.controller().open_note(&id);
                sync_from_controller(app, state);
                state.focus = Focus::Editor;
            }
        }
        Action::DeleteSelected => {
            if let Some(id) = selected_id(app, state) {
                app.controller().delete_note(&id);
                sync_from_controller(app, state);
            }
        }
        Action::InsertNewline => edit(app, state, |input| input.newline()),
        Action::MoveUp => match state.focus {
            Focus::Notes => state.move_selection_up(app.controller().notes().len()),
            Focus::Editor => state.editor.move_up(),
        },
        Action::MoveDown => match state.focus {
            Focus::Notes => state.move_selection_down(app.controller().notes().len()),
            Focus::Editor => state.editor.move_down(),
        },
        Action::MoveLeft => state.editor.move_left(),
        Action::MoveRight => state.editor.move_right(),
        Action::Backspace => edit(app, state, |input| input.backspace()),
        Action::Delete => edit(app, state, |input| input.delete_char()),
        Action::InsertChar(ch) => edit(app, state, |input| input.insert_char(ch)),
    }
    Ok(false)
}

fn apply_prompt_action(app: &mut AppContext, state: &mut TuiState, action: PromptAction) {
    let Some(prompt) = state.name_prompt.as_mut() else {
        return;
    };
    match action {
        PromptAction::InsertChar(ch) => prompt.insert_char(ch),
        PromptAction::Backspace => prompt.backspace(),
        PromptAction::Cancel => state.name_prompt = None,
        PromptAction::Submit => {
            let name = prompt.value.clone();
            if app.controller().save_as(&name) {
                state.name_prompt = None;
                sync_from_controller(app, state);
            }
        }
    }
}

fn edit(app: &mut AppContext, state: &mut TuiState, change: impl FnOnce(&mut InputState)) {
    change(&mut state.editor);
    app.controller().edit(state.editor.text(), Instant::now());
}

fn selected_id(app: &mut AppContext, state: &TuiState) -> Option<NoteId> {
    let index = state.notes_index?;
    app.controller().notes().get(index).map(|note| note.id.clone())
}

/// Reloads the editor after an action that may have swapped the loaded note.
fn sync_from_controller(app: &mut AppContext, state: &mut TuiState) {
    let controller = app.controller();
    state.editor.set_text(controller.editor());
    state.clamp_selection(controller.notes().len());
}

fn toggle_recording(app: &mut AppContext, state: &mut TuiState) {
    if let Some(recorder) = state.recorder.take() {
        state.schedule(Pending::Transcribe(recorder), "Transcribing...");
        return;
    }
    match Recorder::start(&app.settings().record_command) {
        Ok(recorder) => {
            info!("recording started");
            state.recorder = Some(recorder);
            state.status = Some("Recording... (Ctrl+R to stop)".to_string());
        }
        Err(err) => app.controller().report_failure("Recording Failed", err),
    }
}

/// Runs work scheduled by a key press. Called after the frame showing its
/// status line has been drawn.
pub(crate) fn run_pending(app: &mut AppContext, state: &mut TuiState, work: Pending) {
    match work {
        Pending::Transcribe(recorder) => {
            let transcribed = recorder.stop().and_then(|clip| {
                TranscriptionClient::from_settings(&app.settings().transcription)?.transcribe(&clip)
            });
            match transcribed {
                Ok(text) => {
                    app.controller().append_transcription(&text, Instant::now());
                    sync_from_controller(app, state);
                }
                Err(err) => app.controller().report_failure("Transcription Failed", err),
            }
        }
    }
    state.status = None;
}
