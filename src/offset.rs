//! Token-to-character span projection.
//!
//! Taggers hand back token surfaces, not offsets. To place a token in the
//! document we search for its surface text forward from a cursor that only
//! ever advances:
//!
//! ```text
//! text:    "Ana met Ana at noon."
//!           0   4   8   12 15
//!
//! tokens:  Ana    met    Ana    at     noon
//! cursor:  0 -> 3 -> 7 -> 11 -> 14 -> 19
//! spans:   [0,3) [4,7) [8,11) [12,14) [15,19)
//!                        ^
//!                        second "Ana" found after the cursor, not at 0
//! ```
//!
//! All offsets are **character** offsets. The projector keeps the matching
//! byte cursor internally so each search is a plain `str::find` on the
//! remaining suffix.
//!
//! # Misses
//!
//! A surface that does not occur at or after the cursor (normalized quotes,
//! collapsed whitespace, ...) is reported as [`Error::SpanProjectionMiss`]
//! and the cursor stays where it was. Letting the cursor run on would shift
//! every later span in the document. What happens next is the caller's
//! decision, see [`MissPolicy`].
//!
//! # True offsets
//!
//! When a tagger does report offsets, [`SpanProjector::project_hinted`]
//! accepts them as long as they agree with the text and do not move the
//! cursor backwards, and falls back to searching otherwise.

use crate::{Error, Result};
use fabula_core::Span;
use serde::{Deserialize, Serialize};

/// What the pipeline does when a token cannot be located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissPolicy {
    /// Abort the current document with [`Error::SpanProjectionMiss`].
    #[default]
    Fail,
    /// Drop the token, count the miss, keep going.
    Skip,
}

/// Forward-only substring search over one document.
#[derive(Debug, Clone)]
pub struct SpanProjector<'t> {
    text: &'t str,
    byte_cursor: usize,
    char_cursor: usize,
    char_len: usize,
}

impl<'t> SpanProjector<'t> {
    /// Projector positioned at the start of `text`.
    #[must_use]
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            byte_cursor: 0,
            char_cursor: 0,
            char_len: text.chars().count(),
        }
    }

    /// The document being projected onto.
    #[must_use]
    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Current cursor, in characters.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.char_cursor
    }

    /// Locate `surface` at or after the cursor and advance past it.
    ///
    /// ```
    /// use fabula::offset::SpanProjector;
    ///
    /// let mut p = SpanProjector::new("café au café");
    /// let first = p.project("café").unwrap();
    /// let second = p.project("café").unwrap();
    /// assert_eq!((first.start, first.end), (0, 4));
    /// assert_eq!((second.start, second.end), (8, 12));
    /// ```
    pub fn project(&mut self, surface: &str) -> Result<Span> {
        let rest = &self.text[self.byte_cursor..];
        let Some(rel) = rest.find(surface) else {
            log::warn!(
                "[SpanProjector] {surface:?} not found at or after char {}",
                self.char_cursor
            );
            return Err(Error::SpanProjectionMiss {
                surface: surface.to_string(),
                cursor: self.char_cursor,
            });
        };
        let start = self.char_cursor + rest[..rel].chars().count();
        let end = start + surface.chars().count();
        self.byte_cursor += rel + surface.len();
        self.char_cursor = end;
        Ok(Span::new(start, end)?)
    }

    /// Use `hint` if it is consistent with the text and the cursor, else
    /// fall back to [`project`](Self::project).
    pub fn project_hinted(&mut self, surface: &str, hint: Option<Span>) -> Result<Span> {
        if let Some(span) = hint {
            if span.start >= self.char_cursor
                && span.end <= self.char_len
                && span.slice(self.text) == surface
            {
                let skipped = &self.text[self.byte_cursor..];
                let advance: usize = skipped
                    .chars()
                    .take(span.end - self.char_cursor)
                    .map(char::len_utf8)
                    .sum();
                self.byte_cursor += advance;
                self.char_cursor = span.end;
                return Ok(span);
            }
            log::debug!("[SpanProjector] ignoring inconsistent offset {span} for {surface:?}");
        }
        self.project(surface)
    }

    /// Project every surface in order. Stops at the first miss.
    pub fn project_all<S: AsRef<str>>(&mut self, surfaces: &[S]) -> Result<Vec<Span>> {
        surfaces.iter().map(|s| self.project(s.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_surface_resolves_to_later_occurrence() {
        let mut p = SpanProjector::new("Ana met Ana at noon.");
        let spans = p.project_all(&["Ana", "met", "Ana", "at", "noon"]).unwrap();
        let pairs: Vec<_> = spans.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(pairs, vec![(0, 3), (4, 7), (8, 11), (12, 14), (15, 19)]);
        assert_eq!(p.cursor(), 19);
    }

    #[test]
    fn miss_leaves_cursor_in_place() {
        let mut p = SpanProjector::new("one two three");
        p.project("two").unwrap();
        let err = p.project("one").unwrap_err();
        assert!(matches!(
            err,
            Error::SpanProjectionMiss { ref surface, cursor: 7 } if surface == "one"
        ));
        assert_eq!(p.cursor(), 7);
        assert_eq!(p.project("three").unwrap(), Span::new(8, 13).unwrap());
    }

    #[test]
    fn offsets_are_characters_not_bytes() {
        let mut p = SpanProjector::new("São Paulo é grande");
        assert_eq!(p.project("Paulo").unwrap(), Span::new(4, 9).unwrap());
        assert_eq!(p.project("é").unwrap(), Span::new(10, 11).unwrap());
        assert_eq!(p.project("grande").unwrap(), Span::new(12, 18).unwrap());
    }

    #[test]
    fn consistent_hint_is_taken_verbatim() {
        let text = "the cat and the dog";
        let mut p = SpanProjector::new(text);
        // A plain search would land on the first "the".
        let hinted = p
            .project_hinted("the", Some(Span::new(12, 15).unwrap()))
            .unwrap();
        assert_eq!(hinted, Span::new(12, 15).unwrap());
        assert_eq!(p.project("dog").unwrap(), Span::new(16, 19).unwrap());
    }

    #[test]
    fn inconsistent_hint_falls_back_to_search() {
        let mut p = SpanProjector::new("the cat");
        let span = p
            .project_hinted("cat", Some(Span::new(0, 3).unwrap()))
            .unwrap();
        assert_eq!(span, Span::new(4, 7).unwrap());

        let mut p = SpanProjector::new("the cat sat");
        p.project("sat").unwrap();
        // Hint behind the cursor is ignored, and the search then misses.
        assert!(p
            .project_hinted("cat", Some(Span::new(4, 7).unwrap()))
            .is_err());
    }

    #[test]
    fn miss_policy_defaults_to_fail() {
        assert_eq!(MissPolicy::default(), MissPolicy::Fail);
        let parsed: MissPolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(parsed, MissPolicy::Skip);
    }
}
