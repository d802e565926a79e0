//! # fabula
//!
//! Narrative extraction plumbing: turn the token-level output of external
//! taggers into one consistent, character-addressed set of actors, times,
//! events and the links between them.
//!
//! - **SRL grouping**: collapse multi-frame tag matrices, find events, group
//!   arguments, project to character spans ([`srl`])
//! - **Span projection**: forward-only token placement with explicit misses
//!   ([`offset`])
//! - **Reconciliation**: merge actor lists from several NER tools
//!   ([`Reconciler`])
//! - **Linking**: resolve coreference mentions and SRL arguments against the
//!   registry ([`KeyResolver`])
//!
//! The taggers themselves are not part of this crate; plug them in through
//! the traits in [`tagger`].
//!
//! ## Quick Start
//!
//! ```rust
//! use fabula::srl::{ActorGrouper, TagFrame};
//! use fabula::Category;
//!
//! let text = "Maria sold the house yesterday.";
//! let frame = TagFrame::from_strs(
//!     &["Maria", "sold", "the", "house", "yesterday", "."],
//!     &[&["B-ARG0", "B-V", "B-ARG1", "I-ARG1", "B-ARGM-TMP", "O"]],
//! )
//! .unwrap();
//!
//! let out = ActorGrouper::default().group_document(text, &[frame]).unwrap();
//! let spans = &out.sentences[0];
//! assert_eq!(spans[1].category, Category::Event);
//! assert_eq!(spans[1].text, "sold");
//! assert_eq!(spans[3].category, Category::Time);
//! ```
//!
//! ## Document Pipeline
//!
//! ```rust,ignore
//! use fabula::{Annotator, Language, Narrative};
//!
//! let annotator = Annotator::new()
//!     .with_actor_tagger(my_spacy)
//!     .with_actor_tagger(my_nltk)
//!     .with_srl_tagger(my_srl);
//!
//! let mut doc = Narrative::new(Language::English, text);
//! doc.extract_actors(&annotator, &[])?;             // T1..
//! doc.extract_events(&annotator, &[])?;             // E1..
//! doc.extract_semantic_role_links(&annotator, &[])?; // R1..
//! let registry = doc.into_registry();
//! ```
//!
//! ## Error Policy
//!
//! Configuration and contract errors (unknown tool, unsupported language,
//! malformed tagger output) abort the document. Data conditions the pipeline
//! can work around (an ambiguous tag column, a token that cannot be located
//! under the skip policy) degrade locally and are counted in [`Diagnostics`].

#![warn(missing_docs)]

pub mod chunk;
mod error;
pub mod lang;
pub mod narrative;
pub mod offset;
pub mod srl;
pub mod tagger;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use fabula::prelude::*;
    //!
    //! let doc = Narrative::new(Language::Portuguese, "A Maria vendeu a casa.");
    //! assert_eq!(doc.registry().actor_count(), 0);
    //! ```
    pub use crate::error::{Error, Result};
    pub use crate::lang::Language;
    pub use crate::narrative::{Diagnostics, Narrative, NarrativeConfig};
    pub use crate::srl::{ActorGrouper, SrlConfig, TagFrame};
    pub use crate::tagger::{ActorTagger, Annotator, CorefTagger, SrlTagger, Tagger, TimeTagger};
    pub use fabula_coalesce::{KeyResolver, MatchMode, Reconciler};
    pub use fabula_core::{Category, EntityId, ExtractedSpan, Registry, Span};
}

// Re-exports
pub use chunk::{chunk_actors, TokenAnnotation};
pub use error::{Error, Result};
pub use lang::Language;
pub use narrative::{Diagnostics, Narrative, NarrativeConfig};
pub use offset::{MissPolicy, SpanProjector};
pub use srl::{ActorGrouper, SrlConfig, SrlOutput, TagFrame};
pub use tagger::{
    ActorTagger, Annotator, Capability, CorefOutput, CorefTagger, SrlTagger, Tagger, TimeTagger,
};

pub use fabula_coalesce::{
    ActorDefaults, KeyResolver, MatchMode, Reconciler, Reconciliation, Resolved,
};
pub use fabula_core::{
    Actor, ActorCandidate, ActorType, Category, EntityId, EntityRef, Event, EventClass,
    ExtractedSpan, Factuality, Individuation, Involvement, LexicalHead, Polarity, Registry,
    Relation, RelationKind, Span, Tense, TemporalFunction, Time, TimeCandidate, TimexType,
};
