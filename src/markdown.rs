//! Terminal preview for markdown.
//!
//! `pulldown-cmark` does the parsing (GFM tables, strikethrough and task
//! lists on); this module maps its events onto styled ratatui lines. Raw HTML
//! is dropped and text goes through [`format::sanitize`], so note content
//! never reaches the terminal as escape sequences.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};

use crate::format;

const RULE_WIDTH: usize = 40;

pub(crate) fn render(markdown: &str) -> Text<'static> {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut renderer = Renderer::default();
    for event in Parser::new_ext(markdown, options) {
        renderer.event(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    quote_depth: usize,
    lists: Vec<Option<u64>>,
    /// Per open list item: index of its marker span, and whether it is a
    /// finished task whose style must be popped at the end.
    items: Vec<(Option<usize>, bool)>,
    in_code_block: bool,
    table_cell: usize,
}

impl Renderer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.in_code_block => {
                for line in text.lines() {
                    self.push(format::sanitize(line), code_style());
                    self.flush();
                }
            }
            Event::Text(text) => {
                let style = self.style();
                self.push(format::sanitize(&text), style);
            }
            Event::Code(code) => {
                let style = self.style().patch(code_style());
                self.push(format::sanitize(&code), style);
            }
            Event::SoftBreak => {
                let style = self.style();
                self.push(" ".to_string(), style);
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.rule(Style::default().fg(Color::DarkGray));
                self.blank();
            }
            Event::TaskListMarker(done) => self.task_marker(done),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                let level = heading_depth(level);
                self.push(
                    format!("{} ", "#".repeat(level)),
                    Style::default().fg(Color::DarkGray),
                );
                self.styles.push(heading_style(level));
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
                self.styles
                    .push(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.in_code_block = true;
                let label = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => format::sanitize(&lang),
                    _ => String::new(),
                };
                self.push(
                    format!("{label}{}", "─".repeat(RULE_WIDTH.saturating_sub(label.len()))),
                    code_style(),
                );
                self.flush();
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                if !indent.is_empty() {
                    self.push(indent, Style::default());
                }
                self.push(marker, Style::default().fg(Color::Cyan));
                self.items.push((Some(self.current.len() - 1), false));
            }
            Tag::Table(_) => self.flush(),
            Tag::TableHead | Tag::TableRow => {
                self.flush();
                self.table_cell = 0;
                self.push("│ ".to_string(), border_style());
            }
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.push(" │ ".to_string(), border_style());
                }
                self.table_cell += 1;
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { .. } => self.push_style(
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Tag::Image { .. } => self.push_style(Style::default().fg(Color::Magenta)),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.flush();
                self.blank();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.styles.pop();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }
            TagEnd::CodeBlock => {
                self.flush();
                self.in_code_block = false;
                self.rule(code_style());
                self.blank();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => {
                self.flush();
                if let Some((_, true)) = self.items.pop() {
                    self.styles.pop();
                }
            }
            TagEnd::TableHead => {
                self.push(" │".to_string(), border_style());
                self.flush();
                self.rule(border_style());
            }
            TagEnd::TableRow => {
                self.push(" │".to_string(), border_style());
                self.flush();
            }
            TagEnd::Table => self.blank(),
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image => {
                self.styles.pop();
            }
            _ => {}
        }
    }

    fn task_marker(&mut self, done: bool) {
        let Some((marker, struck)) = self.items.last_mut() else {
            return;
        };
        if let Some(span) = marker.and_then(|index| self.current.get_mut(index)) {
            span.content = if done { "☑ " } else { "☐ " }.into();
        }
        if done {
            *struck = true;
            self.styles.push(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT),
            );
        }
    }

    fn push_style(&mut self, style: Style) {
        self.styles.push(style);
    }

    fn style(&self) -> Style {
        self.styles
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    }

    fn push(&mut self, content: String, style: Style) {
        if content.is_empty() {
            return;
        }
        if self.current.is_empty() && self.quote_depth > 0 {
            self.current.push(Span::styled(
                "│ ".repeat(self.quote_depth),
                Style::default().fg(Color::DarkGray),
            ));
        }
        self.current.push(Span::styled(content, style));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
        if let Some((marker, _)) = self.items.last_mut() {
            *marker = None;
        }
    }

    fn rule(&mut self, style: Style) {
        self.lines.push(Line::styled("─".repeat(RULE_WIDTH), style));
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Text<'static> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        Text::from(self.lines)
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn heading_style(level: usize) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match level {
        1 => style.fg(Color::Green).add_modifier(Modifier::UNDERLINED),
        2 => style.fg(Color::Green),
        _ => style.fg(Color::LightGreen),
    }
}

fn code_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn border_style() -> Style {
    Style::default().fg(Color::DarkGray)
}
