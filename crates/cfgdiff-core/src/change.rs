//! Edit script representation for line diffs

use serde::{Deserialize, Serialize};

/// How a line of the edit script relates the source text to the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTag {
    /// Present unchanged in both texts
    Context,
    /// Present only in the candidate
    Added,
    /// Present only in the source
    Removed,
    /// Intraline marker row for the neighbouring removed/added line
    Hint,
}

impl LineTag {
    /// Classic differ prefix for this tag
    pub fn marker(self) -> &'static str {
        match self {
            LineTag::Context => "  ",
            LineTag::Added => "+ ",
            LineTag::Removed => "- ",
            LineTag::Hint => "? ",
        }
    }
}

/// A single tagged line. `text` keeps its original line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLine {
    pub tag: LineTag,
    pub text: String,
}

impl EditLine {
    pub fn new(tag: LineTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }

    pub fn context(text: impl Into<String>) -> Self {
        Self::new(LineTag::Context, text)
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self::new(LineTag::Added, text)
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self::new(LineTag::Removed, text)
    }

    pub fn hint(text: impl Into<String>) -> Self {
        Self::new(LineTag::Hint, text)
    }

    /// Check if this line is content that differs between the texts
    pub fn is_change(&self) -> bool {
        matches!(self.tag, LineTag::Added | LineTag::Removed)
    }
}

/// Ordered edit script turning the source text into the candidate text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditScript {
    lines: Vec<EditLine>,
}

impl EditScript {
    pub fn new(lines: Vec<EditLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[EditLine] {
        &self.lines
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines carrying the given tag
    pub fn count(&self, tag: LineTag) -> usize {
        self.lines.iter().filter(|l| l.tag == tag).count()
    }

    /// Check if any line differs between the texts
    pub fn has_changes(&self) -> bool {
        self.lines.iter().any(EditLine::is_change)
    }

    /// Concatenation of every line with the given tag, terminators intact
    pub fn joined(&self, tag: LineTag) -> String {
        self.lines
            .iter()
            .filter(|l| l.tag == tag)
            .map(|l| l.text.as_str())
            .collect()
    }

    /// Render in the classic differ format (`"  "`, `"+ "`, `"- "`, `"? "` prefixes)
    pub fn to_ndiff(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{}{}", l.tag.marker(), l.text))
            .collect()
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a EditLine;
    type IntoIter = std::slice::Iter<'a, EditLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
