//! Collapse a tag matrix into one tag per token.
//!
//! Rules, tried in order for each token column:
//!
//! 1. exactly one frame tags the token: take that tag
//! 2. any verb tag among the candidates: take the first, never a begin
//! 3. any argument or modifier tag: take the **last** in frame order
//! 4. otherwise the column is ambiguous
//!
//! ```text
//! column                rule   result
//! [B-ARG0, O]           1      B-ARG0      begin
//! [I-V, B-V]            2      I-V         -
//! [B-ARG1, B-ARGM-TMP]  3      B-ARGM-TMP  begin
//! [B-C-X, B-R-Y]        4      O (ambiguity reported)
//! ```
//!
//! A column that is "O" in every frame normalizes to "O".

use super::tags::{is_argument, is_begin, is_verb, TagFrame, NO_TAG};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Canonical tag of one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTag {
    /// The chosen tag
    pub tag: String,
    /// True if the tag opens a span
    pub is_begin: bool,
}

impl NormalizedTag {
    /// Normalized form of an untagged token.
    #[must_use]
    pub fn untagged() -> Self {
        Self {
            tag: NO_TAG.to_string(),
            is_begin: false,
        }
    }
}

/// A column no rule could resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAmbiguity {
    /// Token index within the sentence
    pub index: usize,
    /// Token surface
    pub token: String,
    /// Non-"O" candidates in frame order
    pub candidates: Vec<String>,
}

impl From<TagAmbiguity> for Error {
    fn from(a: TagAmbiguity) -> Self {
        Error::TagAmbiguity {
            token: a.token,
            candidates: a.candidates,
        }
    }
}

/// Output of normalizing one sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalization {
    /// One entry per token
    pub tags: Vec<NormalizedTag>,
    /// Columns that fell through every rule (normalized to "O")
    pub ambiguities: Vec<TagAmbiguity>,
}

/// Applies the tie-break rules column by column.
#[derive(Debug, Clone)]
pub struct TagNormalizer {
    verb_tags: Vec<String>,
    strict: bool,
}

impl TagNormalizer {
    /// Normalizer recognizing `verb_tags` as verbs.
    pub fn new<S: Into<String>>(verb_tags: impl IntoIterator<Item = S>) -> Self {
        Self {
            verb_tags: verb_tags.into_iter().map(Into::into).collect(),
            strict: false,
        }
    }

    /// Fail on the first ambiguous column instead of degrading it to "O".
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Resolve one column. `Err` carries the non-"O" candidates.
    pub fn resolve_column(&self, column: &[&str]) -> std::result::Result<NormalizedTag, Vec<String>> {
        let tagged: Vec<&str> = column.iter().copied().filter(|t| *t != NO_TAG).collect();

        match tagged.as_slice() {
            [] => return Ok(NormalizedTag::untagged()),
            [only] => {
                return Ok(NormalizedTag {
                    tag: only.to_string(),
                    is_begin: is_begin(only),
                })
            }
            _ => {}
        }

        if let Some(verb) = tagged.iter().find(|t| is_verb(t, &self.verb_tags)) {
            return Ok(NormalizedTag {
                tag: verb.to_string(),
                is_begin: false,
            });
        }

        if let Some(arg) = tagged.iter().rev().find(|t| is_argument(t)) {
            return Ok(NormalizedTag {
                tag: arg.to_string(),
                is_begin: is_begin(arg),
            });
        }

        Err(tagged.into_iter().map(str::to_string).collect())
    }

    /// Normalize every column of `frame`.
    ///
    /// # Errors
    ///
    /// [`Error::TagAmbiguity`] for the first unresolved column in strict
    /// mode. Otherwise ambiguities are returned in [`Normalization`].
    pub fn normalize(&self, frame: &TagFrame) -> Result<Normalization> {
        let mut out = Normalization::default();
        for (index, token) in frame.tokens().iter().enumerate() {
            match self.resolve_column(&frame.column(index)) {
                Ok(tag) => out.tags.push(tag),
                Err(candidates) => {
                    let ambiguity = TagAmbiguity {
                        index,
                        token: token.clone(),
                        candidates,
                    };
                    if self.strict {
                        return Err(ambiguity.into());
                    }
                    log::warn!(
                        "[TagNormalizer] no rule resolves {:?} {:?}; treating as untagged",
                        ambiguity.token,
                        ambiguity.candidates
                    );
                    out.ambiguities.push(ambiguity);
                    out.tags.push(NormalizedTag::untagged());
                }
            }
        }
        Ok(out)
    }
}

impl Default for TagNormalizer {
    fn default() -> Self {
        Self::new(["B-V", "I-V"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(column: &[&str]) -> std::result::Result<NormalizedTag, Vec<String>> {
        TagNormalizer::default().resolve_column(column)
    }

    fn tag(t: &str, begin: bool) -> NormalizedTag {
        NormalizedTag {
            tag: t.to_string(),
            is_begin: begin,
        }
    }

    #[test]
    fn single_candidate_wins() {
        assert_eq!(resolve(&["B-ARG0", "O"]), Ok(tag("B-ARG0", true)));
        assert_eq!(resolve(&["O", "I-ARG1"]), Ok(tag("I-ARG1", false)));
    }

    #[test]
    fn first_verb_wins_and_is_never_begin() {
        assert_eq!(resolve(&["I-V", "B-V"]), Ok(tag("I-V", false)));
        assert_eq!(resolve(&["B-ARG1", "B-V"]), Ok(tag("B-V", false)));
    }

    #[test]
    fn last_argument_wins() {
        assert_eq!(
            resolve(&["B-ARG1", "O", "B-ARGM-TMP"]),
            Ok(tag("B-ARGM-TMP", true))
        );
        assert_eq!(resolve(&["B-ARGM-LOC", "I-ARG2"]), Ok(tag("I-ARG2", false)));
    }

    #[test]
    fn all_o_is_untagged() {
        assert_eq!(resolve(&["O", "O"]), Ok(NormalizedTag::untagged()));
        assert_eq!(resolve(&[]), Ok(NormalizedTag::untagged()));
    }

    #[test]
    fn unresolvable_column_reports_candidates() {
        assert_eq!(
            resolve(&["B-X", "I-Y"]),
            Err(vec!["B-X".to_string(), "I-Y".to_string()])
        );
    }

    #[test]
    fn lenient_mode_degrades_and_records() {
        let frame = TagFrame::from_strs(
            &["Ana", "um", "ran"],
            &[&["B-ARG0", "B-X", "B-V"], &["O", "I-Y", "O"]],
        )
        .unwrap();
        let out = TagNormalizer::default().normalize(&frame).unwrap();
        assert_eq!(out.tags.len(), 3);
        assert_eq!(out.tags[1], NormalizedTag::untagged());
        assert_eq!(out.ambiguities.len(), 1);
        assert_eq!(out.ambiguities[0].token, "um");
    }

    #[test]
    fn strict_mode_fails() {
        let frame = TagFrame::from_strs(&["um"], &[&["B-X"], &["I-Y"]]).unwrap();
        let err = TagNormalizer::default()
            .strict(true)
            .normalize(&frame)
            .unwrap_err();
        assert!(matches!(err, Error::TagAmbiguity { ref token, .. } if token == "um"));
        assert!(err.is_recoverable());
    }
}
