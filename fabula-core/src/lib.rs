//! # fabula-core
//!
//! Core types shared by the fabula crates.
//!
//! This crate provides:
//! - **Spans**: half-open character intervals into a document (`Span`)
//! - **Labels**: semantic role categories, actor types, lexical heads
//! - **Candidates**: what extraction stages produce before registration
//!   (`ActorCandidate`, `TimeCandidate`, `ExtractedSpan`)
//! - **Registry**: the per-document store of actors, times, events and the
//!   relations between them, keyed by stable ids (`T1`, `E1`, `R1`, ...)
//!
//! Everything here is plain data. The algorithms that produce and merge these
//! values live in `fabula` and `fabula-coalesce`.

#![warn(missing_docs)]

pub mod entity;
pub mod error;
pub mod registry;

pub use entity::{
    ActorCandidate, ActorType, Category, ExtractedSpan, LexicalHead, Span, TimeCandidate,
    TimexType,
};
pub use error::{Error, Result};
pub use registry::{
    Actor, EntityId, EntityRef, Event, EventClass, Factuality, Individuation, Involvement,
    Polarity, Registry, Relation, RelationKind, Tense, TemporalFunction, Time,
};
