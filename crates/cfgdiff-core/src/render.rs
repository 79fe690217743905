//! Unified and side-by-side renderings of an edit script

use crate::change::{EditScript, LineTag};
use crate::diff::DiffError;

/// Columns reserved on each side of a side-by-side row
pub const SIDE_MARGIN: usize = 5;

/// Fallback width when neither `COLUMNS` nor the terminal reports one
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Strings wrapped around tagged lines when rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffColors {
    pub addition: String,
    pub deletion: String,
    pub hint: String,
    pub reset: String,
}

impl DiffColors {
    /// ANSI bright green / red / yellow
    pub fn ansi() -> Self {
        Self::custom("\x1b[92m", "\x1b[91m", "\x1b[93m", "\x1b[0m")
    }

    /// Diff markers in place of colors, used by the uncolored side-by-side view
    pub fn markers() -> Self {
        Self::custom("+ ", "- ", "? ", "")
    }

    pub fn none() -> Self {
        Self::custom("", "", "", "")
    }

    pub fn custom(
        addition: impl Into<String>,
        deletion: impl Into<String>,
        hint: impl Into<String>,
        reset: impl Into<String>,
    ) -> Self {
        Self {
            addition: addition.into(),
            deletion: deletion.into(),
            hint: hint.into(),
            reset: reset.into(),
        }
    }
}

/// Render every line in order, wrapping changed lines in their color
///
/// Terminators come from the lines themselves; nothing is inserted.
pub fn render_unified(script: &EditScript, colors: &DiffColors) -> String {
    let mut out = String::new();

    for line in script {
        let color = match line.tag {
            LineTag::Context => {
                out.push_str(&line.text);
                continue;
            }
            LineTag::Added => &colors.addition,
            LineTag::Removed => &colors.deletion,
            LineTag::Hint => &colors.hint,
        };
        out.push_str(color);
        out.push_str(&line.text);
        out.push_str(&colors.reset);
    }

    out
}

/// Render source and candidate in two columns of `width / 2` each
///
/// Cell text is cut to `width / 2 - 5` chars and right-trimmed. The left
/// column is padded to the half width, the right column is not padded.
/// Rows are joined by `\n` with no trailing newline.
pub fn render_side_by_side(
    script: &EditScript,
    width: usize,
    colors: &DiffColors,
) -> Result<String, DiffError> {
    let half_width = width / 2;
    let content_width = half_width as isize - SIDE_MARGIN as isize;
    if content_width < 1 {
        return Err(DiffError::RenderConfiguration {
            width,
            content_width,
        });
    }
    let content_width = content_width as usize;

    let rows: Vec<String> = script
        .iter()
        .map(|line| {
            let cell = cell_text(&line.text, content_width);
            let (left, right) = match line.tag {
                LineTag::Hint => (
                    format!("{}{:<half_width$}{}", colors.hint, cell, colors.reset),
                    format!("{}{}{}", colors.hint, cell, colors.reset),
                ),
                LineTag::Removed => (
                    format!("{}{:<half_width$}{}", colors.deletion, cell, colors.reset),
                    String::new(),
                ),
                LineTag::Added => (
                    " ".repeat(half_width),
                    format!("{}{}{}", colors.addition, cell, colors.reset),
                ),
                LineTag::Context => (format!("{:<half_width$}", cell), cell.to_string()),
            };
            left + &right
        })
        .collect();

    Ok(rows.join("\n"))
}

fn cell_text(text: &str, content_width: usize) -> String {
    let truncated: String = text.chars().take(content_width).collect();
    truncated.trim_end().to_string()
}

/// Resolve the side-by-side width: `COLUMNS`, then the terminal, then 80
pub fn terminal_width() -> usize {
    let columns = std::env::var("COLUMNS").ok();
    let terminal = crossterm::terminal::size()
        .ok()
        .map(|(columns, _)| columns as usize);
    resolve_width(columns.as_deref(), terminal)
}

fn resolve_width(columns: Option<&str>, terminal: Option<usize>) -> usize {
    columns
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&c| c > 0)
        .or(terminal.filter(|&c| c > 0))
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}
