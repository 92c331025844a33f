mod text;
mod time;

pub(crate) use text::{format_note_line, sanitize, truncate_with_ellipsis};
pub(crate) use time::format_display_time;
