//! Spans, labels and the candidate records that flow between stages.
//!
//! # Offsets
//!
//! Every offset in this crate is a **character** offset (Unicode scalar
//! values), not a byte offset. Annotation tools downstream count characters,
//! so that is what spans store; converting to bytes happens only at the point
//! where a `&str` is sliced (see [`Span::slice`]).
//!
//! ```text
//! text:   "Maria visitou o Porto."
//!          0    5       13 16   21
//! span:   [16, 21) -> "Porto"
//! ```
//!
//! # Label families
//!
//! ```text
//! ┌──────────────┬─────────────────────────────────────────────┐
//! │ Category     │ semantic role of an SRL span (AGENT, TIME…) │
//! │ ActorType    │ NE type voted across tools (PER, ORG, LOC…) │
//! │ LexicalHead  │ Noun / Pronoun / UNDEF                      │
//! │ TimexType    │ DATE / TIME / DURATION / SET                │
//! └──────────────┴─────────────────────────────────────────────┘
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Span
// ============================================================================

/// Half-open character interval `[start, end)` into a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Character offset (start, inclusive)
    pub start: usize,
    /// Character offset (end, exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span, rejecting `start > end`.
    ///
    /// ```
    /// use fabula_core::Span;
    ///
    /// assert!(Span::new(2, 7).is_ok());
    /// assert!(Span::new(7, 2).is_err());
    /// ```
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Empty span at `offset`.
    #[must_use]
    pub const fn empty_at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Length in characters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for zero-length spans.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `offset` lies in the closed interval `[start, end]`.
    ///
    /// Closed on purpose: registry lookups in partial mode treat a query that
    /// starts exactly where a registered span ends as touching it.
    #[must_use]
    pub const fn contains_point(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// True if either endpoint of `query` falls within this span (closed).
    ///
    /// Not symmetric: a query strictly enclosing `self` does not touch it.
    #[must_use]
    pub const fn touches(&self, query: &Span) -> bool {
        self.contains_point(query.start) || self.contains_point(query.end)
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn cover(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Extract the covered characters from `text`.
    ///
    /// Offsets past the end of `text` are clamped, so the result is never
    /// longer than the text itself.
    ///
    /// ```
    /// use fabula_core::Span;
    ///
    /// let span = Span::new(6, 9).unwrap();
    /// assert_eq!(span.slice("Price €50 today"), "€50");
    /// ```
    #[must_use]
    pub fn slice(&self, text: &str) -> String {
        text.chars().skip(self.start).take(self.len()).collect()
    }

    /// Check that the span fits inside a text of `char_len` characters.
    pub fn check_bounds(&self, char_len: usize) -> Result<()> {
        if self.end > char_len {
            return Err(Error::invalid_input(format!(
                "span {self} exceeds text length {char_len}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Category (semantic role of an extracted span)
// ============================================================================

/// Semantic category of a span produced by the SRL grouping pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Doer of the event; also comitative modifiers
    Agent,
    /// Default role for core arguments
    Theme,
    /// Locative modifier
    Location,
    /// Temporal modifier
    Time,
    /// Manner modifier
    Manner,
    /// Cause modifier
    Cause,
    /// Purpose modifiers
    Purpose,
    /// Directional modifier
    Path,
    /// Modal and reciprocal modifiers
    Instrument,
    /// Goal modifier
    Goal,
    /// The predicate itself
    Event,
    /// Anything else
    Other,
}

impl Category {
    /// Upper-case label (`"AGENT"`, `"EVENT"`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Agent => "AGENT",
            Category::Theme => "THEME",
            Category::Location => "LOCATION",
            Category::Time => "TIME",
            Category::Manner => "MANNER",
            Category::Cause => "CAUSE",
            Category::Purpose => "PURPOSE",
            Category::Path => "PATH",
            Category::Instrument => "INSTRUMENT",
            Category::Goal => "GOAL",
            Category::Event => "EVENT",
            Category::Other => "OTHER",
        }
    }

    /// Lower-case role name as used on semantic role links (`"theme"`).
    #[must_use]
    pub fn role_name(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// True for the predicate category.
    #[must_use]
    pub const fn is_event(&self) -> bool {
        matches!(self, Category::Event)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ActorType (named-entity type of an actor)
// ============================================================================

/// Named-entity type of an actor, as voted across extraction tools.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorType {
    /// People, including fictional
    Person,
    /// Companies, agencies, institutions
    Organization,
    /// Places: countries, cities, facilities, geographic features
    Location,
    /// Objects, vehicles, products
    Object,
    /// Natural phenomena
    Natural,
    /// Generic fallback type
    Other,
    /// Absolute or relative date (not an actor type)
    Date,
    /// Time of day (not an actor type)
    Time,
    /// Label with no known mapping
    Unknown(String),
}

impl ActorType {
    /// Parse from a tool label.
    ///
    /// Handles the short forms used in narrative annotation (`Per`, `Org`),
    /// CoNLL (`PER`, `MISC`), OntoNotes (`PERSON`, `GPE`, `NORP`) and BIO
    /// prefixed variants (`B-PER`). Never fails: unmapped labels become
    /// [`ActorType::Unknown`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label
            .strip_prefix("B-")
            .or_else(|| label.strip_prefix("I-"))
            .unwrap_or(label);

        match label.to_uppercase().as_str() {
            "PER" | "PERSON" => ActorType::Person,
            "ORG" | "ORGANIZATION" => ActorType::Organization,
            "LOC" | "LOCATION" | "GPE" | "FAC" => ActorType::Location,
            "OBJ" | "OBJECT" | "PRODUCT" => ActorType::Object,
            "NAT" | "NATURAL" => ActorType::Natural,
            "OTHER" | "MISC" | "CARDINAL" | "EVENT" | "LANGUAGE" | "LAW" | "MONEY" | "NORP"
            | "ORDINAL" | "PERCENT" | "QUANTITY" | "WORK_OF_ART" => ActorType::Other,
            "DATE" => ActorType::Date,
            "TIME" => ActorType::Time,
            _ => ActorType::Unknown(label.to_string()),
        }
    }

    /// Short label (`Per`, `Org`, `Loc`, `Obj`, `Nat`, `Other`, ...).
    #[must_use]
    pub fn as_label(&self) -> &str {
        match self {
            ActorType::Person => "Per",
            ActorType::Organization => "Org",
            ActorType::Location => "Loc",
            ActorType::Object => "Obj",
            ActorType::Natural => "Nat",
            ActorType::Other => "Other",
            ActorType::Date => "Date",
            ActorType::Time => "Time",
            ActorType::Unknown(label) => label.as_str(),
        }
    }

    /// True for the types an actor may carry after reconciliation.
    ///
    /// Dates and times that leak out of NE taggers are rejected here.
    #[must_use]
    pub fn is_actor_type(&self) -> bool {
        matches!(
            self,
            ActorType::Person
                | ActorType::Organization
                | ActorType::Location
                | ActorType::Object
                | ActorType::Natural
                | ActorType::Other
        )
    }

    /// True for the generic [`ActorType::Other`].
    #[must_use]
    pub fn is_generic(&self) -> bool {
        matches!(self, ActorType::Other)
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl std::str::FromStr for ActorType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

// ============================================================================
// LexicalHead
// ============================================================================

/// Lexical head of an actor mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LexicalHead {
    /// Common or proper noun
    Noun,
    /// Pronoun
    Pronoun,
    /// Any other part of speech
    #[default]
    #[serde(rename = "UNDEF")]
    Undef,
}

impl LexicalHead {
    /// Map a part-of-speech label to a lexical head.
    ///
    /// Accepts Universal Dependencies tags (`NOUN`, `PROPN`, `PRON`) as well
    /// as already-normalized `Noun` / `Pronoun`.
    #[must_use]
    pub fn from_pos(pos: &str) -> Self {
        match pos {
            "NOUN" | "PROPN" | "Noun" => LexicalHead::Noun,
            "PRON" | "Pronoun" => LexicalHead::Pronoun,
            _ => LexicalHead::Undef,
        }
    }

    /// Label as written in annotations.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LexicalHead::Noun => "Noun",
            LexicalHead::Pronoun => "Pronoun",
            LexicalHead::Undef => "UNDEF",
        }
    }

    /// True unless `Undef`.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        !matches!(self, LexicalHead::Undef)
    }
}

impl fmt::Display for LexicalHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimexType
// ============================================================================

/// Type of a temporal expression (TIMEX3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimexType {
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Length of time
    Duration,
    /// Recurring time
    Set,
}

impl TimexType {
    /// Parse a TIMEX3 `type` attribute (case-insensitive).
    pub fn from_label(label: &str) -> Result<Self> {
        match label.to_uppercase().as_str() {
            "DATE" => Ok(TimexType::Date),
            "TIME" => Ok(TimexType::Time),
            "DURATION" => Ok(TimexType::Duration),
            "SET" => Ok(TimexType::Set),
            other => Err(Error::invalid_input(format!("unknown TIMEX3 type: {other}"))),
        }
    }

    /// Label as written in annotations.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TimexType::Date => "Date",
            TimexType::Time => "Time",
            TimexType::Duration => "Duration",
            TimexType::Set => "Set",
        }
    }
}

impl fmt::Display for TimexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Candidates
// ============================================================================

/// An actor as reported by one extraction tool (or as merged across tools).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorCandidate {
    /// Character span in the document
    pub span: Span,
    /// Lexical head reported for the span
    pub lexical_head: LexicalHead,
    /// NE type reported for the span
    pub actor_type: ActorType,
}

impl ActorCandidate {
    /// Create a candidate.
    #[must_use]
    pub fn new(span: Span, lexical_head: LexicalHead, actor_type: ActorType) -> Self {
        Self {
            span,
            lexical_head,
            actor_type,
        }
    }
}

/// A temporal expression reported by a time tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCandidate {
    /// Character span in the document
    pub span: Span,
    /// TIMEX3 type
    pub timex_type: TimexType,
    /// Normalized value (`2021-08-31`, `P2D`, ...)
    pub value: String,
}

/// A span produced by the SRL grouping pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSpan {
    /// Character span in the document
    pub span: Span,
    /// Semantic category
    pub category: Category,
    /// Space-joined token texts of the group
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_rejects_inverted_bounds() {
        assert_eq!(
            Span::new(5, 2),
            Err(Error::InvalidSpan { start: 5, end: 2 })
        );
        assert!(Span::new(3, 3).unwrap().is_empty());
    }

    #[test]
    fn span_touches_is_closed_on_both_ends() {
        let registered = Span::new(0, 5).unwrap();
        assert!(registered.touches(&Span::new(3, 8).unwrap()));
        assert!(registered.touches(&Span::new(5, 9).unwrap()));
        assert!(!registered.touches(&Span::new(6, 9).unwrap()));
        // Enclosing query: neither endpoint lies inside the registered span.
        let inner = Span::new(2, 3).unwrap();
        assert!(!inner.touches(&Span::new(0, 10).unwrap()));
    }

    #[test]
    fn span_cover_takes_extremes() {
        let a = Span::new(2, 7).unwrap();
        let b = Span::new(5, 10).unwrap();
        assert_eq!(a.cover(&b), Span::new(2, 10).unwrap());
        assert_eq!(b.cover(&a), Span::new(2, 10).unwrap());
    }

    #[test]
    fn span_slice_counts_chars() {
        let text = "café com o João";
        assert_eq!(Span::new(0, 4).unwrap().slice(text), "café");
        assert_eq!(Span::new(11, 15).unwrap().slice(text), "João");
        assert_eq!(Span::new(11, 40).unwrap().slice(text), "João");
    }

    #[test]
    fn span_bounds_check() {
        assert!(Span::new(0, 4).unwrap().check_bounds(4).is_ok());
        assert!(Span::new(0, 5).unwrap().check_bounds(4).is_err());
    }

    #[test]
    fn actor_type_from_label_variants() {
        assert_eq!(ActorType::from_label("Per"), ActorType::Person);
        assert_eq!(ActorType::from_label("B-ORG"), ActorType::Organization);
        assert_eq!(ActorType::from_label("GPE"), ActorType::Location);
        assert_eq!(ActorType::from_label("PRODUCT"), ActorType::Object);
        assert_eq!(ActorType::from_label("NORP"), ActorType::Other);
        assert_eq!(ActorType::from_label("DATE"), ActorType::Date);
        assert_eq!(
            ActorType::from_label("WEAPON"),
            ActorType::Unknown("WEAPON".to_string())
        );
    }

    #[test]
    fn actor_type_allow_list() {
        assert!(ActorType::Natural.is_actor_type());
        assert!(ActorType::Other.is_actor_type());
        assert!(!ActorType::Date.is_actor_type());
        assert!(!ActorType::Unknown("X".into()).is_actor_type());
    }

    #[test]
    fn lexical_head_from_pos() {
        assert_eq!(LexicalHead::from_pos("PROPN"), LexicalHead::Noun);
        assert_eq!(LexicalHead::from_pos("PRON"), LexicalHead::Pronoun);
        assert_eq!(LexicalHead::from_pos("VERB"), LexicalHead::Undef);
    }

    #[test]
    fn category_labels() {
        assert_eq!(Category::Purpose.to_string(), "PURPOSE");
        assert_eq!(Category::Theme.role_name(), "theme");
        assert!(Category::Event.is_event());
        let json = serde_json::to_string(&Category::Instrument).unwrap();
        assert_eq!(json, "\"INSTRUMENT\"");
    }

    #[test]
    fn timex_type_parse() {
        assert_eq!(TimexType::from_label("date").unwrap(), TimexType::Date);
        assert!(TimexType::from_label("century").is_err());
    }
}
