//! Recorded comparison of a source config against a candidate config

use crate::change::{EditScript, LineTag};
use crate::diff::{DiffEngine, DiffError, LineDiffer};
use crate::render::{self, DiffColors};
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Everything fixed by [`DiffRecord::record`]
#[derive(Debug, Clone)]
struct Recorded {
    source_config: String,
    candidate_config: String,
    device_diff: String,
    edit_script: EditScript,
    additions: String,
    subtractions: String,
}

/// Outcome of comparing one source text against one candidate text
///
/// Populated once via [`record`](Self::record); both renderings are computed
/// on first access and cached for the life of the record.
#[derive(Debug)]
pub struct DiffRecord {
    host: String,
    source: String,
    colorize: bool,
    /// 0 means query the terminal at render time
    side_by_side_width: usize,
    colors: DiffColors,
    recorded: Option<Recorded>,
    unified: OnceLock<String>,
    side_by_side: OnceLock<String>,
}

/// Serializable view of a recorded diff
#[derive(Debug, Clone, Serialize)]
pub struct DiffSummary<'a> {
    pub host: &'a str,
    pub source: &'a str,
    pub additions: &'a str,
    pub subtractions: &'a str,
    pub device_diff: &'a str,
    pub edit_script: &'a EditScript,
}

impl DiffRecord {
    pub fn new(host: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            source: source.into(),
            colorize: true,
            side_by_side_width: 0,
            colors: DiffColors::ansi(),
            recorded: None,
            unified: OnceLock::new(),
            side_by_side: OnceLock::new(),
        }
    }

    pub fn with_colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    pub fn with_side_by_side_width(mut self, width: usize) -> Self {
        self.side_by_side_width = width;
        self
    }

    /// Replace the palette used when colorizing
    pub fn with_colors(mut self, colors: DiffColors) -> Self {
        self.colors = colors;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn colorize(&self) -> bool {
        self.colorize
    }

    pub fn is_recorded(&self) -> bool {
        self.recorded.is_some()
    }

    /// Record the compared texts using the default engine
    pub fn record(
        &mut self,
        source_config: impl Into<String>,
        candidate_config: impl Into<String>,
        device_diff: impl Into<String>,
    ) -> Result<(), DiffError> {
        self.record_with(
            &DiffEngine::default(),
            source_config,
            candidate_config,
            device_diff,
        )
    }

    /// Record the compared texts, computing the edit script with `differ`
    pub fn record_with(
        &mut self,
        differ: &dyn LineDiffer,
        source_config: impl Into<String>,
        candidate_config: impl Into<String>,
        device_diff: impl Into<String>,
    ) -> Result<(), DiffError> {
        if self.recorded.is_some() {
            return Err(DiffError::AlreadyRecorded);
        }

        let source_config = source_config.into();
        let candidate_config = candidate_config.into();
        let edit_script = differ.edit_script(&source_config, &candidate_config);
        let additions = edit_script.joined(LineTag::Added);
        let subtractions = edit_script.joined(LineTag::Removed);

        self.recorded = Some(Recorded {
            source_config,
            candidate_config,
            device_diff: device_diff.into(),
            edit_script,
            additions,
            subtractions,
        });
        Ok(())
    }

    fn recorded(&self) -> Result<&Recorded, DiffError> {
        self.recorded.as_ref().ok_or(DiffError::NotRecorded)
    }

    pub fn source_config(&self) -> Result<&str, DiffError> {
        Ok(&self.recorded()?.source_config)
    }

    pub fn candidate_config(&self) -> Result<&str, DiffError> {
        Ok(&self.recorded()?.candidate_config)
    }

    /// Diff text produced by the device itself, passed through untouched
    pub fn device_diff(&self) -> Result<&str, DiffError> {
        Ok(&self.recorded()?.device_diff)
    }

    pub fn edit_script(&self) -> Result<&EditScript, DiffError> {
        Ok(&self.recorded()?.edit_script)
    }

    /// All added lines, in edit script order
    pub fn additions(&self) -> Result<&str, DiffError> {
        Ok(&self.recorded()?.additions)
    }

    /// All removed lines, in edit script order
    pub fn subtractions(&self) -> Result<&str, DiffError> {
        Ok(&self.recorded()?.subtractions)
    }

    /// Check if source and candidate differ at all
    pub fn has_changes(&self) -> Result<bool, DiffError> {
        Ok(self.recorded()?.edit_script.has_changes())
    }

    pub fn unified_diff(&self) -> Result<&str, DiffError> {
        let recorded = self.recorded()?;
        Ok(self.unified.get_or_init(|| {
            tracing::debug!(host = %self.host, source = %self.source, "rendering unified diff");
            if self.colorize {
                render::render_unified(&recorded.edit_script, &self.colors)
            } else {
                render::render_unified(&recorded.edit_script, &DiffColors::none())
            }
        }))
    }

    pub fn side_by_side_diff(&self) -> Result<&str, DiffError> {
        let recorded = self.recorded()?;
        if let Some(cached) = self.side_by_side.get() {
            return Ok(cached);
        }

        let width = match self.side_by_side_width {
            0 => render::terminal_width(),
            width => width,
        };
        tracing::debug!(host = %self.host, source = %self.source, width, "rendering side-by-side diff");

        let rendered = if self.colorize {
            render::render_side_by_side(&recorded.edit_script, width, &self.colors)?
        } else {
            render::render_side_by_side(&recorded.edit_script, width, &DiffColors::markers())?
        };
        Ok(self.side_by_side.get_or_init(|| rendered))
    }

    pub fn summary(&self) -> Result<DiffSummary<'_>, DiffError> {
        let recorded = self.recorded()?;
        Ok(DiffSummary {
            host: &self.host,
            source: &self.source,
            additions: &recorded.additions,
            subtractions: &recorded.subtractions,
            device_diff: &recorded.device_diff,
            edit_script: &recorded.edit_script,
        })
    }
}

impl fmt::Display for DiffRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DiffRecord <host: {}, source: {}, recorded: {}>",
            self.host,
            self.source,
            self.is_recorded()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::EditScript;
    use std::cell::Cell;

    struct CountingDiffer {
        calls: Cell<usize>,
    }

    impl LineDiffer for CountingDiffer {
        fn edit_script(&self, source: &str, candidate: &str) -> EditScript {
            self.calls.set(self.calls.get() + 1);
            DiffEngine::default().compute(source, candidate)
        }
    }

    fn recorded(source: &str, candidate: &str) -> DiffRecord {
        let mut record = DiffRecord::new("r1", "running")
            .with_colorize(false)
            .with_side_by_side_width(40);
        record.record(source, candidate, "").unwrap();
        record
    }

    #[test]
    fn test_not_recorded() {
        let record = DiffRecord::new("r1", "running");
        assert!(matches!(record.unified_diff(), Err(DiffError::NotRecorded)));
        assert!(matches!(
            record.side_by_side_diff(),
            Err(DiffError::NotRecorded)
        ));
        assert!(matches!(record.additions(), Err(DiffError::NotRecorded)));
        assert!(matches!(record.subtractions(), Err(DiffError::NotRecorded)));
    }

    #[test]
    fn test_record_only_once() {
        let mut record = recorded("a\n", "b\n");
        let err = record.record("x\n", "y\n", "").unwrap_err();
        assert!(matches!(err, DiffError::AlreadyRecorded));
        assert_eq!(record.source_config().unwrap(), "a\n");
    }

    #[test]
    fn test_scenario_single_line_change() {
        let record = recorded("a\nb\nc\n", "a\nx\nc\n");
        assert_eq!(record.subtractions().unwrap(), "b\n");
        assert_eq!(record.additions().unwrap(), "x\n");
        assert_eq!(record.unified_diff().unwrap(), "a\nb\nx\nc\n");
    }

    #[test]
    fn test_scenario_empty_source() {
        let record = recorded("", "new\n");
        assert_eq!(record.additions().unwrap(), "new\n");
        assert_eq!(record.subtractions().unwrap(), "");
    }

    #[test]
    fn test_identity() {
        let text = "hostname r1\n!\nline vty 0 4\n login local\n";
        let record = recorded(text, text);
        assert_eq!(record.additions().unwrap(), "");
        assert_eq!(record.subtractions().unwrap(), "");
        assert!(!record.has_changes().unwrap());
        assert_eq!(record.unified_diff().unwrap(), text);
    }

    #[test]
    fn test_completeness() {
        let record = recorded(
            "hostname r1\nntp server 1.1.1.1\nsnmp-server community public RO\n",
            "hostname r2\nntp server 1.1.1.1\nlogging host 10.0.0.9\n",
        );
        let script = record.edit_script().unwrap();
        assert_eq!(
            record.additions().unwrap().lines().count(),
            script.count(LineTag::Added)
        );
        assert_eq!(
            record.subtractions().unwrap().lines().count(),
            script.count(LineTag::Removed)
        );
    }

    #[test]
    fn test_edit_script_computed_once_and_renderings_cached() {
        let differ = CountingDiffer {
            calls: Cell::new(0),
        };
        let mut record = DiffRecord::new("r1", "running").with_side_by_side_width(60);
        record
            .record_with(&differ, "a\nb\nc\n", "a\nx\nc\n", "")
            .unwrap();

        let first = record.unified_diff().unwrap();
        let second = record.unified_diff().unwrap();
        assert_eq!(first, second);
        assert!(std::ptr::eq(first, second));

        let first = record.side_by_side_diff().unwrap();
        let second = record.side_by_side_diff().unwrap();
        assert!(std::ptr::eq(first, second));

        assert_eq!(differ.calls.get(), 1);
    }

    #[test]
    fn test_no_color_fallbacks() {
        let record = recorded("a\nb\n", "a\nc\n");
        assert!(!record.unified_diff().unwrap().contains('\x1b'));

        let side = record.side_by_side_diff().unwrap();
        assert!(!side.contains('\x1b'));
        assert!(side.contains("- b"));
        assert!(side.contains("+ c"));
    }

    #[test]
    fn test_no_color_hint_rows_marked_on_both_sides() {
        let mut record = DiffRecord::new("r1", "running")
            .with_colorize(false)
            .with_side_by_side_width(80);
        record
            .record(
                "interface Gi0/1\n description uplink\n",
                "interface Gi0/1\n description downlink\n",
                "",
            )
            .unwrap();

        let old_hint = format!("{}^^", " ".repeat(13));
        let new_hint = format!("{}^^^^", " ".repeat(13));
        let rows: Vec<&str> = record.side_by_side_diff().unwrap().split('\n').collect();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1], format!("- {:<40}", " description uplink"));
        assert_eq!(rows[2], format!("? {:<40}? {}", old_hint, old_hint));
        assert_eq!(rows[3], format!("{}+  description downlink", " ".repeat(40)));
        assert_eq!(rows[4], format!("? {:<40}? {}", new_hint, new_hint));
    }

    #[test]
    fn test_terminal_width_rendering_is_cached() {
        let mut record = DiffRecord::new("r1", "running").with_colorize(false);
        record.record("a\nb\n", "a\nc\n", "").unwrap();

        let first = record.side_by_side_diff().unwrap();
        let second = record.side_by_side_diff().unwrap();
        assert!(std::ptr::eq(first, second));

        let width = render::terminal_width();
        for row in first.split('\n') {
            assert!(row.chars().count() <= 2 * (width / 2));
        }
    }

    #[test]
    fn test_colorized_output() {
        let mut record = DiffRecord::new("r1", "running").with_side_by_side_width(40);
        record.record("a\nb\n", "a\nc\n", "").unwrap();
        assert_eq!(
            record.unified_diff().unwrap(),
            "a\n\x1b[91mb\n\x1b[0m\x1b[92mc\n\x1b[0m"
        );
        assert!(record.side_by_side_diff().unwrap().contains("\x1b[92mc\x1b[0m"));
    }

    #[test]
    fn test_narrow_width_is_an_error_and_not_cached() {
        let mut record = DiffRecord::new("r1", "running")
            .with_colorize(false)
            .with_side_by_side_width(8);
        record.record("a\n", "b\n", "").unwrap();
        assert!(matches!(
            record.side_by_side_diff(),
            Err(DiffError::RenderConfiguration { width: 8, .. })
        ));
        assert!(record.side_by_side_diff().is_err());
    }

    #[test]
    fn test_device_diff_passthrough_and_summary() {
        let mut record = DiffRecord::new("r1", "startup");
        record
            .record("a\n", "a\nb\n", "+b\n")
            .unwrap();
        assert_eq!(record.device_diff().unwrap(), "+b\n");

        let json = serde_json::to_value(record.summary().unwrap()).unwrap();
        assert_eq!(json["host"], "r1");
        assert_eq!(json["source"], "startup");
        assert_eq!(json["additions"], "b\n");
        assert_eq!(json["edit_script"][1]["tag"], "added");
    }

    #[test]
    fn test_display() {
        let record = DiffRecord::new("r1", "running");
        assert_eq!(
            record.to_string(),
            "DiffRecord <host: r1, source: running, recorded: false>"
        );
    }
}
