//! Line diff engine producing tagged edit scripts

use crate::change::{EditLine, EditScript};
use similar::{Algorithm, ChangeTag, DiffTag, TextDiff};
use std::collections::HashMap;
use thiserror::Error;

/// Similarity ratio at or above which a removed/added pair gets hint rows
pub const DEFAULT_HINT_CUTOFF: f32 = 0.75;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("No diff has been recorded yet")]
    NotRecorded,
    #[error("A diff has already been recorded")]
    AlreadyRecorded,
    #[error("Side-by-side width {width} leaves no room for content (content width {content_width})")]
    RenderConfiguration { width: usize, content_width: isize },
}

/// Anything that can turn two texts into an edit script
pub trait LineDiffer {
    fn edit_script(&self, source: &str, candidate: &str) -> EditScript;
}

/// The main diff engine
#[derive(Debug, Clone)]
pub struct DiffEngine {
    /// Line matching algorithm
    algorithm: Algorithm,
    /// Minimum similarity ratio for intraline hints
    hint_cutoff: f32,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Myers,
            hint_cutoff: DEFAULT_HINT_CUTOFF,
        }
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_hint_cutoff(mut self, cutoff: f32) -> Self {
        self.hint_cutoff = cutoff;
        self
    }

    pub fn hint_cutoff(&self) -> f32 {
        self.hint_cutoff
    }

    /// Compute the edit script between two texts
    ///
    /// Lines keep their terminators. Matched lines become context; each gap
    /// between matches is emitted as its removed lines followed by its added
    /// lines, with hint rows attached to pairs that are similar enough.
    pub fn compute(&self, source: &str, candidate: &str) -> EditScript {
        self.compute_counted(source, candidate).0
    }

    /// Like [`compute`](Self::compute), also returning how many line pairs
    /// needed a full char diff to score
    fn compute_counted(&self, source: &str, candidate: &str) -> (EditScript, usize) {
        let text_diff = TextDiff::configure()
            .algorithm(self.algorithm)
            .diff_lines(source, candidate);
        let mut lines = Vec::new();
        let mut char_diffs = 0;

        let mut pending_removed: Vec<&str> = Vec::new();
        let mut pending_added: Vec<&str> = Vec::new();

        for change in text_diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Equal => {
                    self.flush_pending(
                        &mut pending_removed,
                        &mut pending_added,
                        &mut lines,
                        &mut char_diffs,
                    );
                    lines.push(EditLine::context(change.value()));
                }
                ChangeTag::Delete => pending_removed.push(change.value()),
                ChangeTag::Insert => pending_added.push(change.value()),
            }
        }

        self.flush_pending(
            &mut pending_removed,
            &mut pending_added,
            &mut lines,
            &mut char_diffs,
        );

        tracing::debug!(
            source_lines = text_diff.old_slices().len(),
            candidate_lines = text_diff.new_slices().len(),
            script_lines = lines.len(),
            char_diffs,
            "computed edit script"
        );

        (EditScript::new(lines), char_diffs)
    }

    fn flush_pending(
        &self,
        pending_removed: &mut Vec<&str>,
        pending_added: &mut Vec<&str>,
        lines: &mut Vec<EditLine>,
        char_diffs: &mut usize,
    ) {
        if pending_removed.is_empty() && pending_added.is_empty() {
            return;
        }

        let removed: Vec<LineProfile> = pending_removed
            .iter()
            .map(|l| LineProfile::new(*l))
            .collect();
        let added: Vec<LineProfile> = pending_added
            .iter()
            .map(|l| LineProfile::new(*l))
            .collect();
        self.replace_block(&removed, &added, lines, char_diffs);

        pending_removed.clear();
        pending_added.clear();
    }

    /// Emit a gap, anchoring on its most similar pair and recursing on both sides
    fn replace_block(
        &self,
        removed: &[LineProfile],
        added: &[LineProfile],
        lines: &mut Vec<EditLine>,
        char_diffs: &mut usize,
    ) {
        let pair = if removed.is_empty() || added.is_empty() {
            None
        } else {
            self.best_pair(removed, added, char_diffs)
        };

        match pair {
            Some((i, j)) => {
                self.replace_block(&removed[..i], &added[..j], lines, char_diffs);
                push_hinted_pair(removed[i].text, added[j].text, lines);
                self.replace_block(&removed[i + 1..], &added[j + 1..], lines, char_diffs);
            }
            None => {
                lines.extend(removed.iter().map(|l| EditLine::removed(l.text)));
                lines.extend(added.iter().map(|l| EditLine::added(l.text)));
            }
        }
    }

    /// Find the most similar (removed, added) pair meeting the cutoff
    ///
    /// Pairs whose length or char-count upper bound cannot beat the current
    /// floor are skipped without running a char diff.
    fn best_pair(
        &self,
        removed: &[LineProfile],
        added: &[LineProfile],
        char_diffs: &mut usize,
    ) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize, f32)> = None;

        for (j, new) in added.iter().enumerate() {
            for (i, old) in removed.iter().enumerate() {
                if old.text == new.text {
                    continue;
                }
                let beats = |bound: f32| {
                    bound >= self.hint_cutoff && best.map_or(true, |(_, _, r)| bound > r)
                };
                if !beats(old.length_bound(new)) || !beats(old.count_bound(new)) {
                    continue;
                }

                *char_diffs += 1;
                let ratio = TextDiff::from_chars(old.text, new.text).ratio();
                if beats(ratio) {
                    best = Some((i, j, ratio));
                }
            }
        }

        best.map(|(i, j, _)| (i, j))
    }
}

/// A line with the char statistics used to bound its similarity cheaply
#[derive(Debug)]
struct LineProfile<'a> {
    text: &'a str,
    len: usize,
    counts: HashMap<char, usize>,
}

impl<'a> LineProfile<'a> {
    fn new(text: &'a str) -> Self {
        let mut counts = HashMap::new();
        for ch in text.chars() {
            *counts.entry(ch).or_insert(0) += 1;
        }
        Self {
            text,
            len: text.chars().count(),
            counts,
        }
    }

    /// Upper bound on the ratio from line lengths alone
    fn length_bound(&self, other: &LineProfile) -> f32 {
        similarity(self.len.min(other.len), self.len + other.len)
    }

    /// Upper bound on the ratio from shared chars, ignoring order
    fn count_bound(&self, other: &LineProfile) -> f32 {
        let shared = self
            .counts
            .iter()
            .map(|(ch, n)| other.counts.get(ch).map_or(0, |m| (*n).min(*m)))
            .sum();
        similarity(shared, self.len + other.len)
    }
}

/// `2 * matches / total`, computed the way `similar` scores a diff
fn similarity(matches: usize, total: usize) -> f32 {
    if total == 0 {
        return 1.0;
    }
    2.0 * matches as f32 / total as f32
}

impl LineDiffer for DiffEngine {
    fn edit_script(&self, source: &str, candidate: &str) -> EditScript {
        self.compute(source, candidate)
    }
}

/// Push a removed/added pair, each followed by its marker row if it has one
fn push_hinted_pair(old: &str, new: &str, lines: &mut Vec<EditLine>) {
    let char_diff = TextDiff::from_chars(old, new);
    let mut old_tags = String::new();
    let mut new_tags = String::new();

    for op in char_diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Replace => {
                old_tags.extend(std::iter::repeat('^').take(old_range.len()));
                new_tags.extend(std::iter::repeat('^').take(new_range.len()));
            }
            DiffTag::Delete => old_tags.extend(std::iter::repeat('-').take(old_range.len())),
            DiffTag::Insert => new_tags.extend(std::iter::repeat('+').take(new_range.len())),
            DiffTag::Equal => {
                old_tags.extend(std::iter::repeat(' ').take(old_range.len()));
                new_tags.extend(std::iter::repeat(' ').take(new_range.len()));
            }
        }
    }

    lines.push(EditLine::removed(old));
    if let Some(row) = hint_row(old, &old_tags) {
        lines.push(EditLine::hint(row));
    }
    lines.push(EditLine::added(new));
    if let Some(row) = hint_row(new, &new_tags) {
        lines.push(EditLine::hint(row));
    }
}

/// Build a marker row, keeping tabs and other whitespace of the line under blank markers
fn hint_row(line: &str, tags: &str) -> Option<String> {
    let row: String = line
        .chars()
        .zip(tags.chars())
        .map(|(ch, tag)| if tag == ' ' && ch.is_whitespace() { ch } else { tag })
        .collect();
    let row = row.trim_end();

    if row.is_empty() {
        None
    } else {
        Some(format!("{}\n", row))
    }
}
