//! Trait for providing theme colors to the review list widget.

use crate::model::FileStatus;
use ratatui::style::Color;

/// Provides theme colors for the review list.
///
/// Implement this trait to integrate the widget with the host's theme system.
pub trait ThemeProvider: Send + Sync {
    /// Background color for addition lines.
    fn addition_background(&self) -> Color;

    /// Background color for deletion lines.
    fn deletion_background(&self) -> Color;

    /// Background color for context lines.
    fn context_background(&self) -> Color {
        Color::Reset
    }

    /// Background color for hunk header lines.
    fn hunk_header_background(&self) -> Color {
        Color::Rgb(40, 40, 60)
    }

    /// Foreground color for hunk header text.
    fn hunk_header_foreground(&self) -> Color {
        Color::Cyan
    }

    /// Foreground color for line numbers.
    fn line_number_foreground(&self) -> Color {
        Color::DarkGray
    }

    /// Background color for file header rows.
    fn file_header_background(&self) -> Color {
        Color::Rgb(35, 35, 45)
    }

    /// Background of a file header under a focus highlight.
    fn highlight_background(&self) -> Color {
        Color::Rgb(70, 70, 20)
    }

    /// Foreground for the status letter of a file.
    fn status_foreground(&self, status: FileStatus) -> Color {
        status.color()
    }

    /// Foreground for the viewed checkmark.
    fn viewed_foreground(&self) -> Color {
        Color::Green
    }

    /// Foreground for placeholders and malformed-diff banners.
    fn warning_foreground(&self) -> Color {
        Color::Yellow
    }
}

/// Default theme with sensible dark-mode colors.
#[derive(Debug, Clone, Default)]
pub struct DefaultTheme;

impl ThemeProvider for DefaultTheme {
    fn addition_background(&self) -> Color {
        Color::Rgb(30, 60, 30) // dark green
    }

    fn deletion_background(&self) -> Color {
        Color::Rgb(60, 30, 30) // dark red
    }
}
