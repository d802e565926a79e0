//! # fabula-coalesce
//!
//! Turning many partial views of the same entities into one registry.
//!
//! - [`Reconciler`]: merges actor lists produced independently by several
//!   extraction tools (each with its own tokenization) into one
//!   non-redundant, attribute-voted list.
//! - [`KeyResolver`]: finds the registry id for a span produced by a later
//!   stage (coreference, semantic roles), registering a new record when
//!   nothing matches.
//!
//! # Example
//!
//! ```
//! use fabula_coalesce::Reconciler;
//! use fabula_core::{ActorCandidate, ActorType, LexicalHead, Span};
//!
//! let tool_a = vec![ActorCandidate::new(
//!     Span::new(2, 7).unwrap(),
//!     LexicalHead::Noun,
//!     ActorType::Other,
//! )];
//! let tool_b = vec![ActorCandidate::new(
//!     Span::new(5, 10).unwrap(),
//!     LexicalHead::Noun,
//!     ActorType::Location,
//! )];
//!
//! let merged = Reconciler::new().reconcile(&[tool_a, tool_b]).unwrap();
//! assert_eq!(merged.entities.len(), 1);
//! assert_eq!(merged.entities[0].span, Span::new(2, 10).unwrap());
//! assert_eq!(merged.entities[0].actor_type, ActorType::Location);
//! ```

#![warn(missing_docs)]

pub mod reconcile;
pub mod resolver;

pub use reconcile::{Reconciler, Reconciliation};
pub use resolver::{ActorDefaults, KeyResolver, MatchMode, Resolved};
