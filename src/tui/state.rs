use ratatui::layout::Rect;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{controller::Notice, dictation::Recorder, domain::note::UNTITLED_NOTE};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    Editor,
    Notes,
}

/// Work the loop runs after the next frame is drawn, so the status bar can
/// say what is happening while it blocks.
pub(crate) enum Pending {
    Transcribe(Recorder),
}

pub(crate) struct TuiState {
    pub(crate) editor: InputState,
    pub(crate) focus: Focus,
    pub(crate) notes_index: Option<usize>,
    pub(crate) name_prompt: Option<PromptState>,
    pub(crate) notice: Option<Notice>,
    pub(crate) status: Option<String>,
    pub(crate) show_preview: bool,
    pub(crate) recorder: Option<Recorder>,
    pending: Option<Pending>,
}

impl TuiState {
    pub(crate) fn new(editor_text: &str, notes_len: usize) -> Self {
        let mut editor = InputState::new();
        editor.set_text(editor_text);
        let mut state = Self {
            editor,
            focus: Focus::Editor,
            notes_index: None,
            name_prompt: None,
            notice: None,
            status: None,
            show_preview: true,
            recorder: None,
            pending: None,
        };
        state.clamp_selection(notes_len);
        state
    }

    pub(crate) fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Editor => Focus::Notes,
            Focus::Notes => Focus::Editor,
        };
    }

    /// Keeps the newest notice; older ones have already been logged.
    pub(crate) fn push_notices(&mut self, notices: Vec<Notice>) {
        if let Some(latest) = notices.into_iter().last() {
            self.notice = Some(latest);
        }
    }

    pub(crate) fn open_name_prompt(&mut self) {
        self.name_prompt = Some(PromptState::new(UNTITLED_NOTE));
    }

    pub(crate) fn schedule(&mut self, work: Pending, status: impl Into<String>) {
        self.status = Some(status.into());
        self.pending = Some(work);
    }

    pub(crate) fn take_pending(&mut self) -> Option<Pending> {
        self.pending.take()
    }

    pub(crate) fn move_selection_up(&mut self, notes_len: usize) {
        let Some(current) = self.notes_index else {
            self.clamp_selection(notes_len);
            return;
        };
        if current > 0 {
            self.notes_index = Some(current - 1);
        }
    }

    pub(crate) fn move_selection_down(&mut self, notes_len: usize) {
        let Some(current) = self.notes_index else {
            self.clamp_selection(notes_len);
            return;
        };
        if current + 1 < notes_len {
            self.notes_index = Some(current + 1);
        }
    }

    pub(crate) fn clamp_selection(&mut self, notes_len: usize) {
        self.notes_index = match (self.notes_index, notes_len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(index), len) => Some(index.min(len - 1)),
        };
    }
}

/// Single-line input for the note name.
pub(crate) struct PromptState {
    pub(crate) value: String,
}

impl PromptState {
    fn new(initial: &str) -> Self {
        Self {
            value: initial.to_string(),
        }
    }

    pub(crate) fn insert_char(&mut self, ch: char) {
        self.value.push(ch);
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// Columns scrolled off the left so the end of a long name stays in view.
    pub(crate) fn scroll_offset(&self, area: Rect) -> u16 {
        let inner = area.width.saturating_sub(2);
        let width = UnicodeWidthStr::width(self.value.as_str()) as u16;
        width.saturating_sub(inner.saturating_sub(1))
    }

    pub(crate) fn cursor_position_inline(&self, area: Rect) -> (u16, u16) {
        let width = UnicodeWidthStr::width(self.value.as_str()) as u16;
        let col = width
            .saturating_sub(self.scroll_offset(area))
            .min(area.width.saturating_sub(2));
        (area.x + col + 1, area.y + 1)
    }
}

pub(crate) struct InputState {
    pub(crate) lines: Vec<String>,
    cursor: InputCursor,
    scroll: usize,
}

impl InputState {
    fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: InputCursor::new(),
            scroll: 0,
        }
    }

    pub(crate) fn insert_char(&mut self, ch: char) {
        self.ensure_invariants();
        let line = &mut self.lines[self.cursor.line];
        let byte_index = byte_index_at_char(line, self.cursor.col);
        line.insert(byte_index, ch);
        self.cursor.col = self.cursor.col.saturating_add(1);
        self.reset_edit_state();
    }

    pub(crate) fn backspace(&mut self) {
        self.ensure_invariants();
        if self.cursor.col > 0 {
            let line = &mut self.lines[self.cursor.line];
            let remove_at = byte_index_at_char(line, self.cursor.col.saturating_sub(1));
            if let Some((byte_len, _)) = line[remove_at..]
                .chars()
                .next()
                .map(|ch| (ch.len_utf8(), ch))
            {
                line.replace_range(remove_at..remove_at + byte_len, "");
            }
            self.cursor.col = self.cursor.col.saturating_sub(1);
            self.reset_edit_state();
            return;
        }
        if self.cursor.line > 0 {
            let current_line = self.lines.remove(self.cursor.line);
            self.cursor.line = self.cursor.line.saturating_sub(1);
            let line = &mut self.lines[self.cursor.line];
            let prev_len = line.chars().count();
            line.push_str(&current_line);
            self.cursor.col = prev_len;
            self.reset_edit_state();
        }
    }

    pub(crate) fn delete_char(&mut self) {
        self.ensure_invariants();
        let line_len = self.current_line_len();
        if self.cursor.col < line_len {
            let line = &mut self.lines[self.cursor.line];
            let remove_at = byte_index_at_char(line, self.cursor.col);
            if let Some((byte_len, _)) = line[remove_at..]
                .chars()
                .next()
                .map(|ch| (ch.len_utf8(), ch))
            {
                line.replace_range(remove_at..remove_at + byte_len, "");
            }
            self.reset_edit_state();
            return;
        }
        if self.cursor.line + 1 < self.lines.len() {
            let next_line = self.lines.remove(self.cursor.line + 1);
            self.lines[self.cursor.line].push_str(&next_line);
            self.reset_edit_state();
        }
    }

    pub(crate) fn newline(&mut self) {
        self.ensure_invariants();
        let line = &mut self.lines[self.cursor.line];
        let split_at = byte_index_at_char(line, self.cursor.col);
        let tail = line[split_at..].to_string();
        line.truncate(split_at);
        let insert_at = self.cursor.line + 1;
        self.lines.insert(insert_at, tail);
        self.cursor.line = insert_at;
        self.cursor.col = 0;
        self.reset_edit_state();
    }

    /// Replaces the buffer and puts the cursor at the end of it.
    pub(crate) fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.cursor = InputCursor::new();
        self.cursor.line = self.lines.len().saturating_sub(1);
        self.cursor.col = self.current_line_len();
        self.scroll = 0;
    }

    pub(crate) fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Moves the first visible row so the cursor row is inside `area`, and
    /// returns it for `Paragraph::scroll`.
    pub(crate) fn scroll_into_view(&mut self, area: Rect) -> u16 {
        let content_width = area.width.saturating_sub(2).max(1) as usize;
        let height = area.height.saturating_sub(2).max(1) as usize;
        let (row, _) = wrapped_cursor_position(&self.lines, &self.cursor, content_width);
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + height {
            self.scroll = row + 1 - height;
        }
        u16::try_from(self.scroll).unwrap_or(u16::MAX)
    }

    pub(crate) fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let content_width = area.width.saturating_sub(2).max(1) as usize;
        let height = area.height.saturating_sub(2).max(1) as usize;
        let (row, col) = wrapped_cursor_position(&self.lines, &self.cursor, content_width);
        let row = row.saturating_sub(self.scroll).min(height - 1);
        (area.x + col as u16 + 1, area.y + row as u16 + 1)
    }

    pub(crate) fn move_left(&mut self) {
        self.ensure_invariants();
        if self.cursor.col > 0 {
            self.cursor.col = self.cursor.col.saturating_sub(1);
        } else if self.cursor.line > 0 {
            self.cursor.line = self.cursor.line.saturating_sub(1);
            self.cursor.col = self.current_line_len();
        }
        self.cursor.preferred_col = None;
    }

    pub(crate) fn move_right(&mut self) {
        self.ensure_invariants();
        let line_len = self.current_line_len();
        if self.cursor.col < line_len {
            self.cursor.col = self.cursor.col.saturating_add(1);
        } else if self.cursor.line + 1 < self.lines.len() {
            self.cursor.line = self.cursor.line.saturating_add(1);
            self.cursor.col = 0;
        }
        self.cursor.preferred_col = None;
    }

    pub(crate) fn move_up(&mut self) {
        self.ensure_invariants();
        if self.cursor.line == 0 {
            return;
        }
        let target_col = self.cursor.preferred_col.unwrap_or(self.cursor.col);
        self.cursor.line = self.cursor.line.saturating_sub(1);
        self.cursor.col = target_col.min(self.current_line_len());
        self.cursor.preferred_col = Some(target_col);
    }

    pub(crate) fn move_down(&mut self) {
        self.ensure_invariants();
        if self.cursor.line + 1 >= self.lines.len() {
            return;
        }
        let target_col = self.cursor.preferred_col.unwrap_or(self.cursor.col);
        self.cursor.line = self.cursor.line.saturating_add(1);
        self.cursor.col = target_col.min(self.current_line_len());
        self.cursor.preferred_col = Some(target_col);
    }

    fn ensure_invariants(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        if self.cursor.line >= self.lines.len() {
            self.cursor.line = self.lines.len().saturating_sub(1);
        }
        let line_len = self.current_line_len();
        if self.cursor.col > line_len {
            self.cursor.col = line_len;
        }
    }

    fn current_line_len(&self) -> usize {
        self.lines
            .get(self.cursor.line)
            .map(|line| line.chars().count())
            .unwrap_or(0)
    }

    fn reset_edit_state(&mut self) {
        self.cursor.preferred_col = None;
    }
}

struct InputCursor {
    line: usize,
    col: usize,
    preferred_col: Option<usize>,
}

impl InputCursor {
    fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            preferred_col: None,
        }
    }
}

fn byte_index_at_char(value: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }
    value
        .char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| value.len())
}

fn width_up_to_char(value: &str, char_index: usize) -> usize {
    value
        .chars()
        .take(char_index)
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

fn wrapped_cursor_position(
    lines: &[String],
    cursor: &InputCursor,
    content_width: usize,
) -> (usize, usize) {
    let mut rows_before = 0usize;
    let cursor_line = cursor.line.min(lines.len().saturating_sub(1));
    for line in lines.iter().take(cursor_line) {
        let line_width = UnicodeWidthStr::width(line.as_str());
        let wrapped_rows = if line_width == 0 {
            0
        } else {
            (line_width - 1) / content_width
        };
        rows_before += wrapped_rows + 1;
    }

    let line = lines
        .get(cursor_line)
        .map(String::as_str)
        .unwrap_or("");
    let cursor_col = cursor.col.min(line.chars().count());
    let prefix_width = width_up_to_char(line, cursor_col);
    let row_in_line = prefix_width / content_width;
    let col_in_line = prefix_width % content_width;
    let row = rows_before.saturating_add(row_in_line);
    let col = col_in_line;

    (row, col)
}
