//! Terminal capability detection and table output

use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(w, _)| usize::from(w.0))
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as error (red)
    fn error(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn error(&self) -> String {
        if supports_color() {
            self.fg::<css::Red>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn error(&self) -> String {
        self.as_str().error()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

/// Prints rows under a header, with columns padded to a common width.
///
/// When the table is wider than the terminal, the last column is cut short
/// and marked with an ellipsis.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    for line in render_table(headers, rows, terminal_width()) {
        println!("{line}");
    }
}

fn render_table(headers: &[&str], rows: &[Vec<String>], max_width: Option<usize>) -> Vec<String> {
    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| row.get(idx).map_or(0, |cell| cell.chars().count()))
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect::<Vec<_>>();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_row(headers.iter().map(ToString::to_string), &widths, max_width));
    lines.push(render_row(widths.iter().map(|&width| "-".repeat(width)), &widths, max_width));
    for row in rows {
        lines.push(render_row(row.iter().cloned(), &widths, max_width));
    }
    lines
}

fn render_row(cells: impl Iterator<Item = String>, widths: &[usize], max_width: Option<usize>) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    fit(line.trim_end(), max_width)
}

fn fit(line: &str, max_width: Option<usize>) -> String {
    match max_width {
        Some(max) if max > 1 && line.chars().count() > max => {
            let cut: String = line.chars().take(max - 1).collect();
            format!("{cut}…")
        }
        _ => line.to_string(),
    }
}
