//! Virtualized review list widget.
//!
//! Draws only the files in the current render window. Each file occupies a
//! header row followed by its body; the number of rows actually drawn is fed
//! back to the state as the file's measured height.

use crate::model::{DiffLine, FileDiffRecord, LineKind};
use crate::render::FileBody;
use crate::state::{FileViewMode, ReviewState};
use crate::traits::ThemeProvider;
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Widget};

/// A single hint entry for the footer.
#[derive(Debug, Clone)]
pub struct FooterHint {
    /// The key (e.g., "v", "E").
    pub key: String,
    /// The description (e.g., "Viewed", "Expand all").
    pub description: String,
}

impl FooterHint {
    /// Create a new footer hint.
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// The review list widget.
///
/// # Example
///
/// ```ignore
/// let widget = ReviewListWidget::new(&theme).with_footer_hints(hints);
/// widget.render_with_state(frame.area(), frame.buffer_mut(), &mut state);
/// ```
pub struct ReviewListWidget<'a, T: ThemeProvider> {
    theme: &'a T,
    footer_hints: Vec<FooterHint>,
}

impl<'a, T: ThemeProvider> ReviewListWidget<'a, T> {
    pub fn new(theme: &'a T) -> Self {
        Self {
            theme,
            footer_hints: Vec::new(),
        }
    }

    /// Set footer hints to display at the bottom border.
    pub fn with_footer_hints(mut self, hints: Vec<FooterHint>) -> Self {
        self.footer_hints = hints;
        self
    }
}

/// Rows a file occupies when drawn: its header plus its body.
fn file_rows(body: &FileBody) -> u32 {
    1 + body.row_count() as u32
}

impl<T: ThemeProvider> ReviewListWidget<'_, T> {
    /// Render the list and report measured file heights back to `state`.
    pub fn render_with_state(self, area: Rect, buf: &mut Buffer, state: &mut ReviewState) {
        let block = self.block(state);
        let inner = block.inner(area);
        block.render(area, buf);

        state.set_viewport(inner.height as u32);
        if state.displayed_len() == 0 {
            let msg = if state.is_loading() {
                "Loading diff..."
            } else if state.stats().has_changes {
                "No files match the filter"
            } else {
                "No changes"
            };
            let x = inner.x + (inner.width.saturating_sub(msg.len() as u16)) / 2;
            let y = inner.y + inner.height / 2;
            buf.set_string(x, y, msg, Style::default().fg(Color::DarkGray));
            return;
        }

        let window = state.window();
        let scroll_top = state.nav().scroll_top;
        let view_end = scroll_top.saturating_add(inner.height as u32);
        let mut measured = Vec::with_capacity(window.range.len());

        for (i, position) in window.range.clone().enumerate() {
            let Some(key) = state.displayed_record(position).map(|r| r.key.clone()) else {
                continue;
            };
            let top = window.offsets[i];
            let bottom = window.offsets[i + 1];
            let body = state.file_body(&key);
            let rows = file_rows(&body);
            let number_width = match body.as_ref() {
                FileBody::Lines { lines, .. } => line_no_width(lines),
                _ => 0,
            };

            for row in 0..rows {
                let y_abs = top + row;
                if y_abs >= bottom || y_abs >= view_end {
                    break;
                }
                if y_abs < scroll_top {
                    continue;
                }
                let y = inner.y + (y_abs - scroll_top) as u16;
                if row == 0 {
                    if let Some(record) = state.record(&key) {
                        self.render_file_header(state, record, inner.x, y, inner.width, buf);
                    }
                } else {
                    let index = row as usize - 1;
                    self.render_body_row(&body, index, number_width, inner.x, y, inner.width, buf);
                }
            }
            measured.push((key, rows));
        }

        for (key, rows) in measured {
            state.set_measured_height(&key, rows);
        }
    }

    fn block(&self, state: &ReviewState) -> Block<'static> {
        let stats = state.stats();
        let title = if stats.is_loading {
            " Loading... ".to_string()
        } else {
            format!(
                " {} files  +{} -{}  {}/{} viewed ",
                stats.file_count,
                stats.additions,
                stats.deletions,
                state.viewed_count(),
                stats.file_count
            )
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title);

        if !self.footer_hints.is_empty() {
            let mut spans = vec![Span::raw(" ")];
            for (i, hint) in self.footer_hints.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
                }
                spans.push(Span::styled(
                    hint.key.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(
                    format!(" {}", hint.description),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            spans.push(Span::raw(" "));
            block = block.title_bottom(Line::from(spans));
        }
        block
    }

    fn render_file_header(
        &self,
        state: &ReviewState,
        record: &FileDiffRecord,
        x: u16,
        y: u16,
        width: u16,
        buf: &mut Buffer,
    ) {
        let bg = if state.nav().is_highlighted(&record.key) {
            self.theme.highlight_background()
        } else {
            self.theme.file_header_background()
        };
        let base = Style::default().bg(bg);
        buf.set_stringn(x, y, " ".repeat(width as usize), width as usize, base);

        let mode = state.mode(&record.key);
        let status = record.status();
        let viewed = if state.is_viewed(&record.key) { "✓" } else { " " };
        let full = if mode == FileViewMode::ExpandedFull {
            "  [full]"
        } else {
            ""
        };

        let spans = vec![
            Span::styled(format!("{} ", mode.indicator()), base),
            Span::styled(
                format!("{} ", status.as_char()),
                base.fg(self.theme.status_foreground(status)),
            ),
            Span::styled(
                format!("{} ", viewed),
                base.fg(self.theme.viewed_foreground()),
            ),
            Span::styled(record.display_name(), base.add_modifier(Modifier::BOLD)),
            Span::styled(format!("  +{}", record.additions), base.fg(Color::Green)),
            Span::styled(format!(" -{}", record.deletions), base.fg(Color::Red)),
            Span::styled(full, base.fg(self.theme.line_number_foreground())),
        ];
        buf.set_line(x, y, &Line::from(spans), width);
    }

    #[allow(clippy::too_many_arguments)]
    fn render_body_row(
        &self,
        body: &FileBody,
        index: usize,
        number_width: usize,
        x: u16,
        y: u16,
        width: u16,
        buf: &mut Buffer,
    ) {
        let warning_style = Style::default().fg(self.theme.warning_foreground());
        match body {
            FileBody::Collapsed => {}
            FileBody::Placeholder(placeholder) => {
                buf.set_stringn(
                    x + 2,
                    y,
                    placeholder.message(),
                    width.saturating_sub(2) as usize,
                    warning_style,
                );
            }
            FileBody::Lines { lines, warning } => {
                let index = match warning {
                    Some(text) if index == 0 => {
                        let banner = format!("⚠ {}", text);
                        buf.set_stringn(x, y, banner, width as usize, warning_style);
                        return;
                    }
                    Some(_) => index - 1,
                    None => index,
                };
                match lines.get(index) {
                    Some(line) => self.render_diff_line(line, number_width, x, y, width, buf),
                    None if lines.is_empty() => {
                        buf.set_string(
                            x + 2,
                            y,
                            "No content changes",
                            Style::default().fg(Color::DarkGray),
                        );
                    }
                    None => {}
                }
            }
        }
    }

    fn render_diff_line(
        &self,
        line: &DiffLine,
        number_width: usize,
        x: u16,
        y: u16,
        width: u16,
        buf: &mut Buffer,
    ) {
        if line.kind == LineKind::HunkHeader {
            let style = Style::default()
                .fg(self.theme.hunk_header_foreground())
                .bg(self.theme.hunk_header_background());
            buf.set_stringn(x, y, " ".repeat(width as usize), width as usize, style);
            buf.set_stringn(x, y, &line.content, width as usize, style);
            return;
        }

        let bg = match line.kind {
            LineKind::Addition => self.theme.addition_background(),
            LineKind::Deletion => self.theme.deletion_background(),
            _ => self.theme.context_background(),
        };
        let base_style = Style::default().bg(bg);
        buf.set_stringn(x, y, " ".repeat(width as usize), width as usize, base_style);

        let number = |n: Option<u32>| {
            n.map(|n| format!("{:>w$}", n, w = number_width))
                .unwrap_or_else(|| " ".repeat(number_width))
        };
        let prefix_style = match line.kind {
            LineKind::Addition => base_style.fg(Color::Green),
            LineKind::Deletion => base_style.fg(Color::Red),
            _ => base_style,
        };
        let line_no_style = base_style.fg(self.theme.line_number_foreground());

        let mut spans = vec![
            Span::styled(number(line.old_line), line_no_style),
            Span::styled(" ", base_style),
            Span::styled(number(line.new_line), line_no_style),
            Span::styled(" ", base_style),
            Span::styled(line.kind.prefix().to_string(), prefix_style),
            Span::styled(line.content.as_str(), base_style),
        ];
        if line.missing_newline {
            spans.push(Span::styled(" (no newline)", line_no_style));
        }
        buf.set_line(x, y, &Line::from(spans), width);
    }
}

impl<T: ThemeProvider> Widget for ReviewListWidget<'_, T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Needs state; use render_with_state instead
        buf.set_string(
            area.x,
            area.y,
            "Use ReviewListWidget::render_with_state",
            Style::default().fg(Color::Red),
        );
    }
}

fn line_no_width(lines: &[DiffLine]) -> usize {
    let max = lines
        .iter()
        .flat_map(|l| [l.old_line, l.new_line])
        .flatten()
        .max()
        .unwrap_or(0);
    max.to_string().len().max(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, HeightModel};
    use crate::traits::DefaultTheme;

    fn terminal_config() -> EngineConfig {
        EngineConfig {
            layout: HeightModel {
                per_line_height: 1,
                header_height: 1,
                collapsed_height: 1,
                min_height: 2,
                max_height: 30,
                overscan: 1,
            },
            ..EngineConfig::default()
        }
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect()
    }

    fn state_with(paths: &[&str]) -> ReviewState {
        let text: String = paths
            .iter()
            .map(|p| {
                format!(
                    "diff --git a/{p} b/{p}\n--- a/{p}\n+++ b/{p}\n@@ -1 +1 @@\n-old\n+new {p}\n"
                )
            })
            .collect();
        let mut state = ReviewState::new(terminal_config());
        state.set_diff_text(&text);
        state
    }

    #[test]
    fn test_renders_headers_and_lines() {
        let mut state = state_with(&["a.rs", "b.rs"]);
        let theme = DefaultTheme;
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);

        // The first pass measures; the second lays out with real heights.
        ReviewListWidget::new(&theme).render_with_state(area, &mut buf, &mut state);
        let mut buf = Buffer::empty(area);
        ReviewListWidget::new(&theme).render_with_state(area, &mut buf, &mut state);

        assert!(row(&buf, 0).contains("2 files"));
        assert!(row(&buf, 1).contains("a.rs"));
        let rows: Vec<String> = (0..12).map(|y| row(&buf, y)).collect();
        assert!(rows.iter().any(|r| r.contains("new a.rs")));
        assert!(rows.iter().any(|r| r.contains("new b.rs")));
        assert!(rows.iter().any(|r| r.starts_with("│@@ -1")));
        assert_eq!(state.nav().viewport_height, 10);
    }

    #[test]
    fn test_measured_rows_replace_estimates() {
        let mut state = state_with(&["a.rs", "b.rs"]);
        // Estimated: 2 changed lines + header.
        assert_eq!(state.window().total_height, 6);

        let theme = DefaultTheme;
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        ReviewListWidget::new(&theme).render_with_state(area, &mut buf, &mut state);

        // Header, hunk header and two change lines per file.
        assert_eq!(state.window().total_height, 8);
    }

    #[test]
    fn test_empty_state_message() {
        let mut state = ReviewState::new(terminal_config());
        state.set_diff_text("");
        let theme = DefaultTheme;
        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        ReviewListWidget::new(&theme)
            .with_footer_hints(vec![FooterHint::new("q", "Quit")])
            .render_with_state(area, &mut buf, &mut state);

        assert!(row(&buf, 2).contains("No changes"));
        assert!(row(&buf, 4).contains("Quit"));
    }

    #[test]
    fn test_line_number_width() {
        let lines = vec![DiffLine::context("x", 9, 1200)];
        assert_eq!(line_no_width(&lines), 4);
        assert_eq!(line_no_width(&[]), 3);
    }
}
