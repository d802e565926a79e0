//! Per-sentence SRL tag matrices and tag vocabulary helpers.
//!
//! A semantic-role labeler returns, per sentence, one row of tags per
//! detected predicate (frame):
//!
//! ```text
//!              Maria   will    sell    the     house
//! frame 0:     B-ARG0  B-ARGM-MOD B-V  B-ARG1  I-ARG1
//! frame 1:     O       O       O       O       O
//! ```
//!
//! Normalization reads the matrix column by column.

use crate::{Error, Result};
use fabula_core::Span;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The "no tag" sentinel.
pub const NO_TAG: &str = "O";

static ARGUMENT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ARG[0-9A]|ARGM").expect("valid regex"));

/// Tag matrix for one sentence: rows are frames, columns are tokens.
///
/// Deserialization goes through the same checks as [`TagFrame::new`] and
/// [`TagFrame::with_offsets`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTagFrame")]
pub struct TagFrame {
    tokens: Vec<String>,
    rows: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offsets: Option<Vec<Span>>,
}

/// Wire form of a [`TagFrame`], before shape validation.
#[derive(Deserialize)]
struct RawTagFrame {
    tokens: Vec<String>,
    rows: Vec<Vec<String>>,
    #[serde(default)]
    offsets: Option<Vec<Span>>,
}

impl TryFrom<RawTagFrame> for TagFrame {
    type Error = Error;

    fn try_from(raw: RawTagFrame) -> Result<Self> {
        let frame = TagFrame::new(raw.tokens, raw.rows)?;
        match raw.offsets {
            Some(offsets) => frame.with_offsets(offsets),
            None => Ok(frame),
        }
    }
}

impl TagFrame {
    /// Build a frame, rejecting rows whose length differs from the token count.
    pub fn new(tokens: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != tokens.len())
        {
            return Err(Error::invalid_input(format!(
                "frame {i} has {} tags for {} tokens",
                row.len(),
                tokens.len()
            )));
        }
        Ok(Self {
            tokens,
            rows,
            offsets: None,
        })
    }

    /// Convenience constructor from string slices.
    pub fn from_strs(tokens: &[&str], rows: &[&[&str]]) -> Result<Self> {
        Self::new(
            tokens.iter().map(|t| t.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|t| t.to_string()).collect())
                .collect(),
        )
    }

    /// Attach true character offsets reported by the tagger, one per token.
    pub fn with_offsets(mut self, offsets: Vec<Span>) -> Result<Self> {
        if offsets.len() != self.tokens.len() {
            return Err(Error::invalid_input(format!(
                "{} offsets for {} tokens",
                offsets.len(),
                self.tokens.len()
            )));
        }
        self.offsets = Some(offsets);
        Ok(self)
    }

    /// Token surfaces in sentence order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tagger-reported offset of token `i`, if any.
    pub fn offset(&self, i: usize) -> Option<Span> {
        self.offsets.as_ref().and_then(|o| o.get(i).copied())
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of tokens.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// True if the labeler found no predicate in the sentence.
    pub fn is_frameless(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tags of token `i` across frames, in frame order.
    pub fn column(&self, i: usize) -> Vec<&str> {
        self.rows.iter().map(|row| row[i].as_str()).collect()
    }

    /// Drop tokens tagged [`NO_TAG`] in every frame.
    ///
    /// A frameless sentence is returned unchanged.
    #[must_use]
    pub fn prune_untagged(&self) -> TagFrame {
        if self.is_frameless() {
            return self.clone();
        }
        let keep: Vec<usize> = (0..self.tokens.len())
            .filter(|&i| self.rows.iter().any(|row| row[i] != NO_TAG))
            .collect();
        TagFrame {
            tokens: keep.iter().map(|&i| self.tokens[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
            offsets: self
                .offsets
                .as_ref()
                .map(|o| keep.iter().map(|&i| o[i]).collect()),
        }
    }
}

/// True for tags opening a span (`B-...`).
#[must_use]
pub fn is_begin(tag: &str) -> bool {
    tag.starts_with('B')
}

/// True if `tag` is one of `verb_tags`.
#[must_use]
pub fn is_verb<S: AsRef<str>>(tag: &str, verb_tags: &[S]) -> bool {
    verb_tags.iter().any(|v| v.as_ref() == tag)
}

/// True for argument (`ARG0`..`ARG9`, `ARGA`) and modifier (`ARGM-*`) tags.
#[must_use]
pub fn is_argument(tag: &str) -> bool {
    ARGUMENT_TAG.is_match(tag)
}

/// True for modifier tags (`B-ARGM-TMP`, `I-ARGM-LOC`, ...).
#[must_use]
pub fn is_modifier(tag: &str) -> bool {
    tag.contains("ARGM")
}

/// Modifier subtype: the last `-` segment of a modifier tag.
///
/// ```
/// use fabula::srl::tags::modifier_subtype;
///
/// assert_eq!(modifier_subtype("B-ARGM-TMP"), Some("TMP"));
/// assert_eq!(modifier_subtype("B-ARG1"), None);
/// ```
#[must_use]
pub fn modifier_subtype(tag: &str) -> Option<&str> {
    if !is_modifier(tag) {
        return None;
    }
    tag.rsplit('-').next()
}
