//! A single proposed change to a text buffer.
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::hash::{Hash, Hasher};

#[derive(Clone, Debug, Serialize, Deserialize)]
/// A proposed or applied change to one span of text.
///
/// Offsets and lengths are counted in characters, not bytes, and are only
/// meaningful against the exact text snapshot the edit was computed from.
pub struct TextEdit {
    /// 0-based character index of the span being replaced
    pub offset: usize,
    /// number of original characters replaced
    pub length: usize,
    /// the exact substring being replaced
    pub original: String,
    /// the substring to insert
    pub replacement: String,
    /// human-readable explanation, may be empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// stable identifier of the rule that produced the edit, may be empty
    #[serde(default, skip_serializing_if = "SmolStr::is_empty")]
    pub rule_id: SmolStr,
}

impl TextEdit {
    /// Creates an edit replacing `length` characters at `offset`.
    pub fn new(
        offset: usize,
        length: usize,
        original: impl Into<String>,
        replacement: impl Into<String>,
        message: impl Into<String>,
        rule_id: impl Into<SmolStr>,
    ) -> TextEdit {
        TextEdit {
            offset,
            length,
            original: original.into(),
            replacement: replacement.into(),
            message: message.into(),
            rule_id: rule_id.into(),
        }
    }

    /// Character index one past the end of the replaced span.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Returns true if the replaced ranges of the two edits overlap.
    ///
    /// Edits that merely touch at a boundary do not conflict.
    pub fn conflicts_with(&self, other: &TextEdit) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }

    /// Returns true if `text` still contains `original` at this edit's span.
    pub fn is_valid_for(&self, text: &str) -> bool {
        char_slice(text, self.offset, self.length)
            .map(|s| s == self.original)
            .unwrap_or(false)
    }
}

// Two edits with the same position and effect are indistinguishable
// duplicates; message and rule_id do not participate.
impl PartialEq for TextEdit {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.length == other.length
            && self.original == other.original
            && self.replacement == other.replacement
    }
}

impl Eq for TextEdit {}

impl Hash for TextEdit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
        self.length.hash(state);
        self.original.hash(state);
        self.replacement.hash(state);
    }
}

/// Byte index of the `chars`-th character of `text`, or `None` when `chars`
/// is past the end.
pub(crate) fn byte_offset(text: &str, chars: usize) -> Option<usize> {
    if chars == 0 {
        return Some(0);
    }
    let mut seen = 0usize;
    for (idx, _) in text.char_indices() {
        if seen == chars {
            return Some(idx);
        }
        seen += 1;
    }
    if seen == chars {
        Some(text.len())
    } else {
        None
    }
}

pub(crate) fn char_slice(text: &str, offset: usize, length: usize) -> Option<&str> {
    let start = byte_offset(text, offset)?;
    let end = byte_offset(text, offset + length)?;
    Some(&text[start..end])
}
