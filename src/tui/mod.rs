use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{io, time::Instant};
use tracing::warn;

mod handler;
mod state;
mod view;

use crate::app::AppContext;
use handler::{handle_tui_key, run_pending};
use state::TuiState;
use view::draw_tui;

const TUI_POLL_MS: u64 = 200;

pub(crate) fn run_tui(app: &mut AppContext) -> Result<()> {
    let (mut terminal, keyboard_enhanced) = setup_terminal()?;
    let controller = app.controller();
    let mut state = TuiState::new(controller.editor(), controller.notes().len());
    state.push_notices(controller.take_notices());

    let result = run_tui_loop(&mut terminal, app, &mut state);
    if state.recorder.take().is_some() {
        warn!("recording abandoned on exit");
    }
    restore_terminal(&mut terminal, keyboard_enhanced)?;
    result
}

fn setup_terminal() -> Result<(Terminal<CrosstermBackend<io::Stdout>>, bool)> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if keyboard_enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture,)?;
    let backend = CrosstermBackend::new(stdout);
    Ok((Terminal::new(backend)?, keyboard_enhanced))
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    keyboard_enhanced: bool,
) -> Result<()> {
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    disable_raw_mode()?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppContext,
    state: &mut TuiState,
) -> Result<()> {
    loop {
        let controller = app.controller();
        controller.tick(Instant::now());
        state.push_notices(controller.take_notices());
        terminal.draw(|frame| draw_tui(frame, controller, state))?;

        if let Some(work) = state.take_pending() {
            run_pending(app, state, work);
            continue;
        }
        if !poll_event()? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if handle_tui_key(app, state, key)? {
                    break;
                }
            }
            Event::Mouse(_) => {}
            _ => {}
        }
    }
    Ok(())
}

fn poll_event() -> Result<bool> {
    Ok(event::poll(std::time::Duration::from_millis(TUI_POLL_MS))?)
}
