use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::state::{Focus, TuiState};
use crate::{
    app::NotesController,
    controller::{Notice, NoticeLevel},
    format, markdown,
};

const NOTES_WIDTH: u16 = 32;

pub(crate) fn draw_tui(frame: &mut Frame<'_>, controller: &NotesController, state: &mut TuiState) {
    let layout = split_layout(frame.area(), state.show_preview);

    draw_notes(frame, controller, state, layout.notes_area);
    draw_editor(frame, controller, state, layout.editor_area);
    if let Some(preview_area) = layout.preview_area {
        draw_preview(frame, state, preview_area);
    }
    draw_footer(frame, state, layout.footer_area);
    if state.name_prompt.is_some() {
        draw_name_prompt(frame, state, layout.editor_area);
    }
}

fn draw_notes(frame: &mut Frame<'_>, controller: &NotesController, state: &TuiState, area: Rect) {
    let active = controller.active_id();
    let row_width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = controller
        .notes()
        .iter()
        .map(|note| {
            let marker = if Some(&note.id) == active { "● " } else { "  " };
            let name = format::truncate_with_ellipsis(
                &format::sanitize(note.display_name()),
                row_width.saturating_sub(marker.chars().count()),
            );
            let time = format::format_display_time(note.last_modified);
            ListItem::new(Text::from(vec![
                Line::from(format!("{marker}{name}")),
                Line::styled(format!("  {time}"), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let title = if controller.is_storage_available() {
        format!("Notes ({})", controller.notes().len())
    } else {
        "Notes (storage unavailable)".to_string()
    };
    let notes_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(state.focus, Focus::Notes)),
        )
        .highlight_style(highlight_style(state.focus))
        .style(Style::default());
    let mut list_state = ListState::default();
    list_state.select(state.notes_index);
    frame.render_stateful_widget(notes_widget, area, &mut list_state);
}

fn draw_editor(
    frame: &mut Frame<'_>,
    controller: &NotesController,
    state: &mut TuiState,
    area: Rect,
) {
    let scroll = state.editor.scroll_into_view(area);
    let lines: Vec<Line> = state
        .editor
        .lines
        .iter()
        .map(|line| Line::from(format::sanitize(line)))
        .collect();
    let title = match controller.active_note() {
        Some(note) => format!("Editing: {}", format::sanitize(note.display_name())),
        None if controller.has_pending_scratch() => "Scratchpad (unsaved)".to_string(),
        None => "Scratchpad".to_string(),
    };
    let editor_widget = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(state.focus, Focus::Editor)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(editor_widget, area);
    if matches!(state.focus, Focus::Editor) && state.name_prompt.is_none() {
        frame.set_cursor_position(state.editor.cursor_position(area));
    }
}

fn draw_preview(frame: &mut Frame<'_>, state: &TuiState, area: Rect) {
    let preview = Paragraph::new(markdown::render(&state.editor.text()))
        .block(Block::default().borders(Borders::ALL).title("Preview"))
        .wrap(Wrap { trim: false });
    frame.render_widget(preview, area);
}

fn draw_footer(frame: &mut Frame<'_>, state: &TuiState, area: Rect) {
    let line = if let Some(status) = state.status.as_deref() {
        Line::styled(status.to_string(), Style::default().fg(Color::Magenta))
    } else if let Some(notice) = state.notice.as_ref() {
        notice_line(notice)
    } else {
        Line::styled(
            "Ctrl+S save  Ctrl+N new  Ctrl+E export  Ctrl+R dictate  Ctrl+P preview  Tab switch  Ctrl+Q quit",
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn notice_line(notice: &Notice) -> Line<'static> {
    let color = match notice.level {
        NoticeLevel::Info => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    };
    Line::from(vec![
        Span::styled(
            format!("{}: ", format::sanitize(&notice.title)),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format::sanitize(&notice.message)),
        Span::styled("  (Esc dismiss)", Style::default().fg(Color::DarkGray)),
    ])
}

fn draw_name_prompt(frame: &mut Frame<'_>, state: &TuiState, editor_area: Rect) {
    let Some(prompt) = state.name_prompt.as_ref() else {
        return;
    };
    let area = Rect {
        x: editor_area.x + 2,
        y: editor_area.y + 1,
        width: editor_area.width.saturating_sub(4).max(10),
        height: 3,
    }
    .intersection(frame.area());
    let prompt_widget = Paragraph::new(Line::from(format::sanitize(&prompt.value)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Note name (Enter save, Esc cancel)")
                .border_style(Style::default().fg(Color::Green)),
        )
        .scroll((0, prompt.scroll_offset(area)));
    frame.render_widget(Clear, area);
    frame.render_widget(prompt_widget, area);
    frame.set_cursor_position(prompt.cursor_position_inline(area));
}

fn focus_style(current: Focus, target: Focus) -> Style {
    if current == target {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

fn highlight_style(focus: Focus) -> Style {
    let style = Style::default().add_modifier(Modifier::REVERSED);
    if matches!(focus, Focus::Notes) {
        style.fg(Color::Green)
    } else {
        style
    }
}

struct LayoutAreas {
    notes_area: Rect,
    editor_area: Rect,
    preview_area: Option<Rect>,
    footer_area: Rect,
}

fn split_layout(area: Rect, show_preview: bool) -> LayoutAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    if show_preview {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(NOTES_WIDTH),
                Constraint::Percentage(50),
                Constraint::Min(10),
            ])
            .split(rows[0]);
        LayoutAreas {
            notes_area: columns[0],
            editor_area: columns[1],
            preview_area: Some(columns[2]),
            footer_area: rows[1],
        }
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(NOTES_WIDTH), Constraint::Min(10)])
            .split(rows[0]);
        LayoutAreas {
            notes_area: columns[0],
            editor_area: columns[1],
            preview_area: None,
            footer_area: rows[1],
        }
    }
}
