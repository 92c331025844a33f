use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// One list row: time, label, then as much of the content as fits.
pub(crate) fn format_note_line(
    display_time: &str,
    label: &str,
    content: &str,
    max_width: usize,
) -> String {
    if max_width == 0 {
        return String::new();
    }

    let prefix = format!("{}  {}  ", display_time, sanitize_content(label));
    let prefix_width = UnicodeWidthStr::width(prefix.as_str());
    if max_width <= prefix_width {
        return truncate_with_ellipsis(prefix.trim_end(), max_width);
    }

    let content_width = max_width.saturating_sub(prefix_width);
    let truncated = truncate_with_ellipsis(&sanitize_content(content), content_width);
    format!("{}{}", prefix, truncated).trim_end().to_string()
}

fn sanitize_content(content: &str) -> String {
    sanitize(&content.replace(['\n', '\r', '\t'], " "))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text safe to hand to the terminal: control characters (ESC included) are
/// dropped and tabs become spaces.
pub(crate) fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter_map(|ch| match ch {
            '\t' => Some(' '),
            ch if ch.is_control() => None,
            ch => Some(ch),
        })
        .collect()
}

pub(crate) fn truncate_with_ellipsis(value: &str, max_width: usize) -> String {
    let value_width = UnicodeWidthStr::width(value);
    if value_width <= max_width {
        return value.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let mut current_width = 0;
    let mut result = String::new();
    for ch in value.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);
        if current_width + ch_width > max_width - 3 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("...");
    result
}
