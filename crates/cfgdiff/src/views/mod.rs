//! Output rendering for each view mode

use crate::config::ViewMode;
use anyhow::Result;
use cfgdiff_core::DiffRecord;

/// Render a recorded diff for printing
pub fn render_view(mode: ViewMode, record: &DiffRecord) -> Result<String> {
    let out = match mode {
        ViewMode::Unified => record.unified_diff()?.to_string(),
        ViewMode::SideBySide => {
            let mut out = record.side_by_side_diff()?.to_string();
            if !out.is_empty() {
                out.push('\n');
            }
            out
        }
        ViewMode::Json => {
            let mut out = serde_json::to_string_pretty(&record.summary()?)?;
            out.push('\n');
            out
        }
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DiffRecord {
        let mut record = DiffRecord::new("r1", "running")
            .with_colorize(false)
            .with_side_by_side_width(30);
        record.record("a\nb\n", "a\nc\n", "").unwrap();
        record
    }

    #[test]
    fn test_unified_view() {
        assert_eq!(render_view(ViewMode::Unified, &record()).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn test_side_by_side_view_ends_with_newline() {
        let out = render_view(ViewMode::SideBySide, &record()).unwrap();
        assert!(out.ends_with('\n'));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_json_view() {
        let out = render_view(ViewMode::Json, &record()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["subtractions"], "b\n");
        assert_eq!(value["additions"], "c\n");
    }

    #[test]
    fn test_unrecorded_is_an_error() {
        assert!(render_view(ViewMode::Unified, &DiffRecord::new("r1", "running")).is_err());
    }
}
