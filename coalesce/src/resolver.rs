//! Registry key resolution.
//!
//! Later stages (coreference, semantic-role linking) produce spans that may or
//! may not correspond to a record the registry already holds. The resolver
//! answers "which id is this span?" and mints a new record when the answer is
//! "none".
//!
//! # Match modes
//!
//! ```text
//! registered:   [0 ─────── 5]
//! query exact:  [0 ─────── 5]        -> match
//! query exact:  [0 ──── 4]           -> no match (one char off)
//! query partial:      [3 ────── 8]   -> match (3 lies in [0, 5])
//! query partial:           [5 ── 9]  -> match (5 lies in [0, 5])
//! query partial:             [6 ─ 9] -> no match
//! ```
//!
//! In partial mode the first registered record (registration order) whose
//! closed interval contains either endpoint of the query wins.

use fabula_core::{
    Actor, ActorType, EntityId, Error, Event, LexicalHead, Registry, Result, Span,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a query span is compared to registered spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Spans must be identical.
    Exact,
    /// Either endpoint of the query falls within the registered span.
    Partial,
}

impl MatchMode {
    /// Does a record at `registered` answer `query`?
    #[must_use]
    pub fn matches(&self, registered: &Span, query: &Span) -> bool {
        match self {
            MatchMode::Exact => registered == query,
            MatchMode::Partial => registered.touches(query),
        }
    }
}

impl FromStr for MatchMode {
    type Err = Error;

    /// Parse `exact` / `partial`; anything else is a configuration error.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(MatchMode::Exact),
            "partial" => Ok(MatchMode::Partial),
            other => Err(Error::invalid_match_mode(other)),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Exact => f.write_str("exact"),
            MatchMode::Partial => f.write_str("partial"),
        }
    }
}

/// Attributes given to actors registered on a lookup miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorDefaults {
    /// Lexical head of the new actor
    pub lexical_head: LexicalHead,
    /// Type of the new actor
    pub actor_type: ActorType,
}

impl ActorDefaults {
    /// Defaults for coreference mentions: `Pronoun` / `Other`.
    #[must_use]
    pub fn pronoun() -> Self {
        Self {
            lexical_head: LexicalHead::Pronoun,
            actor_type: ActorType::Other,
        }
    }

    /// Defaults for semantic-role arguments: `Noun` / `Other`.
    #[must_use]
    pub fn noun() -> Self {
        Self {
            lexical_head: LexicalHead::Noun,
            actor_type: ActorType::Other,
        }
    }
}

impl Default for ActorDefaults {
    fn default() -> Self {
        Self::pronoun()
    }
}

/// Outcome of a find-or-register call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// Id of the matched or newly registered record
    pub id: EntityId,
    /// True if the record was registered by this call
    pub created: bool,
}

/// Looks up and registers entities by span.
#[derive(Debug, Clone, Default)]
pub struct KeyResolver;

impl KeyResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }

    /// First entry (iteration order) whose span answers `query` under `mode`.
    pub fn lookup<'a, I>(entries: I, query: &Span, mode: MatchMode) -> Option<EntityId>
    where
        I: IntoIterator<Item = (&'a EntityId, Span)>,
    {
        entries
            .into_iter()
            .find(|(_, span)| mode.matches(span, query))
            .map(|(id, _)| *id)
    }

    /// Find a registered actor.
    pub fn find_actor(&self, registry: &Registry, query: &Span, mode: MatchMode) -> Option<EntityId> {
        Self::lookup(registry.actor_spans(), query, mode)
    }

    /// Find a registered event.
    pub fn find_event(&self, registry: &Registry, query: &Span, mode: MatchMode) -> Option<EntityId> {
        Self::lookup(registry.event_spans(), query, mode)
    }

    /// Try each mode in order; register a new actor if none matches.
    ///
    /// `text` is the document text the new actor's surface is cut from.
    pub fn resolve_actor(
        &self,
        registry: &mut Registry,
        text: &str,
        query: Span,
        modes: &[MatchMode],
        defaults: &ActorDefaults,
    ) -> Resolved {
        let existing: &Registry = registry;
        if let Some(id) = modes
            .iter()
            .find_map(|mode| self.find_actor(existing, &query, *mode))
        {
            return Resolved { id, created: false };
        }
        let id = registry.add_actor(Actor::new(
            query.slice(text),
            query,
            defaults.lexical_head,
            defaults.actor_type.clone(),
        ));
        log::debug!("[KeyResolver] registered actor {id} for unmatched span {query}");
        Resolved { id, created: true }
    }

    /// Try each mode in order; register a new event if none matches.
    pub fn resolve_event(
        &self,
        registry: &mut Registry,
        text: &str,
        query: Span,
        modes: &[MatchMode],
    ) -> Resolved {
        let existing: &Registry = registry;
        if let Some(id) = modes
            .iter()
            .find_map(|mode| self.find_event(existing, &query, *mode))
        {
            return Resolved { id, created: false };
        }
        let id = registry.add_event(Event::new(query.slice(text), query));
        log::debug!("[KeyResolver] registered event {id} for unmatched span {query}");
        Resolved { id, created: true }
    }
}
