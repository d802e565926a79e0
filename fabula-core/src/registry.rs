//! Per-document entity registry.
//!
//! The registry owns every actor, time, event and relation discovered in one
//! document. Ids are minted here and nowhere else:
//!
//! ```text
//! actors + times   T1, T2, T3, ...   (one shared counter)
//! events           E1, E2, ...
//! relations        R1, R2, ...
//! ```
//!
//! Ids are strictly increasing per prefix and are never reused or reassigned.
//! Records are append-only; the registry is dropped with its document.

use crate::entity::{ActorType, Category, LexicalHead, Span, TimexType};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Ids
// ============================================================================

/// Stable id of a registry record (`T3`, `E1`, `R12`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EntityId {
    prefix: char,
    number: usize,
}

impl EntityId {
    /// Prefix for actors and times.
    pub const TERM: char = 'T';
    /// Prefix for events.
    pub const EVENT: char = 'E';
    /// Prefix for relations.
    pub const RELATION: char = 'R';

    fn new(prefix: char, number: usize) -> Self {
        Self { prefix, number }
    }

    /// Prefix character.
    #[must_use]
    pub const fn prefix(&self) -> char {
        self.prefix
    }

    /// Numeric part.
    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }

    /// Parse `T12` / `E3` / `R1`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let prefix = chars
            .next()
            .ok_or_else(|| Error::invalid_input("empty entity id"))?;
        if ![Self::TERM, Self::EVENT, Self::RELATION].contains(&prefix) {
            return Err(Error::invalid_input(format!("bad id prefix in {s:?}")));
        }
        let number = chars
            .as_str()
            .parse::<usize>()
            .map_err(|_| Error::invalid_input(format!("bad id number in {s:?}")))?;
        if number == 0 {
            return Err(Error::invalid_input(format!("ids start at 1: {s:?}")));
        }
        Ok(Self::new(prefix, number))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.number)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for EntityId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl std::str::FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ============================================================================
// Attribute enums (fixed defaults unless a tagger supplies a value)
// ============================================================================

/// Whether an actor is a set, a single individual, or a mass quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Individuation {
    /// A set of individuals
    Set,
    /// A single individual
    #[default]
    Individual,
    /// A mass quantity
    Mass,
}

/// How many entities take part in the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Involvement {
    /// `0`
    None,
    /// `1`
    #[default]
    One,
    /// `>1`
    Many,
    /// `All`
    All,
    /// `Und`
    Undetermined,
}

/// Role of a time expression within the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemporalFunction {
    /// No special function
    None,
    /// Anchored to the publication time
    #[default]
    PublicationTime,
}

/// Event class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventClass {
    /// Something that happens
    #[default]
    Occurrence,
    /// Start/end/continuation of another event
    Aspectual,
    /// Perception of another event
    Perception,
    /// Reporting of another event
    Reporting,
    /// Intensional action
    IAction,
    /// State
    State,
    /// Intensional state
    IState,
}

/// Event tense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tense {
    /// `Pres`
    #[default]
    Present,
    /// `Past`
    Past,
    /// `Fut`
    Future,
    /// No tense
    None,
}

/// Event polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Polarity {
    /// `Pos`
    #[default]
    Positive,
    /// `Neg`
    Negative,
}

/// Event factuality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Factuality {
    /// `Factual`
    #[default]
    Factual,
    /// `Non-Factual`
    NonFactual,
}

// ============================================================================
// Records
// ============================================================================

/// A participant of the narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Surface text (`text[span]`)
    pub text: String,
    /// Character span
    pub span: Span,
    /// Lexical head
    pub lexical_head: LexicalHead,
    /// NE type
    pub actor_type: ActorType,
    /// Individuation
    pub individuation: Individuation,
    /// Involvement
    pub involvement: Involvement,
}

impl Actor {
    /// Actor with default individuation and involvement.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        span: Span,
        lexical_head: LexicalHead,
        actor_type: ActorType,
    ) -> Self {
        Self {
            text: text.into(),
            span,
            lexical_head,
            actor_type,
            individuation: Individuation::default(),
            involvement: Involvement::default(),
        }
    }
}

/// A temporal expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    /// Surface text
    pub text: String,
    /// Character span
    pub span: Span,
    /// TIMEX3 type
    pub timex_type: TimexType,
    /// Normalized value
    pub value: String,
    /// Temporal function
    pub temporal_function: TemporalFunction,
}

impl Time {
    /// Time with the default temporal function.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        span: Span,
        timex_type: TimexType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            span,
            timex_type,
            value: value.into(),
            temporal_function: TemporalFunction::default(),
        }
    }
}

/// An event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Surface text
    pub text: String,
    /// Character span
    pub span: Span,
    /// Class
    pub class: EventClass,
    /// Tense
    pub tense: Tense,
    /// Polarity
    pub polarity: Polarity,
    /// Factuality
    pub factuality: Factuality,
}

impl Event {
    /// Event with default attributes.
    #[must_use]
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
            class: EventClass::default(),
            tense: Tense::default(),
            polarity: Polarity::default(),
            factuality: Factuality::default(),
        }
    }
}

/// Kind of a relation between two registered records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Two mentions of the same actor (coreference).
    ObjIdentity,
    /// An event and one of its arguments, with the argument's role.
    SemanticRole(Category),
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::ObjIdentity => f.write_str("objIdentity"),
            RelationKind::SemanticRole(role) => write!(f, "semrole:{}", role.role_name()),
        }
    }
}

/// A relation between two registered records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation id (`R<n>`)
    pub id: EntityId,
    /// Kind
    pub kind: RelationKind,
    /// First argument (the event, for semantic role links)
    pub arg1: EntityId,
    /// Second argument
    pub arg2: EntityId,
}

/// Borrowed view of any entity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef<'a> {
    /// An actor
    Actor(&'a Actor),
    /// A time
    Time(&'a Time),
    /// An event
    Event(&'a Event),
}

impl EntityRef<'_> {
    /// Span of the referenced record.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            EntityRef::Actor(a) => a.span,
            EntityRef::Time(t) => t.span,
            EntityRef::Event(e) => e.span,
        }
    }

    /// Surface text of the referenced record.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            EntityRef::Actor(a) => &a.text,
            EntityRef::Time(t) => &t.text,
            EntityRef::Event(e) => &e.text,
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// The per-document store of actors, times, events and relations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    next_term: usize,
    next_event: usize,
    next_relation: usize,
    actors: Vec<(EntityId, Actor)>,
    times: Vec<(EntityId, Time)>,
    events: Vec<(EntityId, Event)>,
    relations: Vec<Relation>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(counter: &mut usize, prefix: char) -> EntityId {
        *counter += 1;
        EntityId::new(prefix, *counter)
    }

    /// Register an actor and return its fresh `T<n>` id.
    pub fn add_actor(&mut self, actor: Actor) -> EntityId {
        let id = Self::mint(&mut self.next_term, EntityId::TERM);
        self.actors.push((id, actor));
        id
    }

    /// Register a time and return its fresh `T<n>` id.
    pub fn add_time(&mut self, time: Time) -> EntityId {
        let id = Self::mint(&mut self.next_term, EntityId::TERM);
        self.times.push((id, time));
        id
    }

    /// Register an event and return its fresh `E<n>` id.
    pub fn add_event(&mut self, event: Event) -> EntityId {
        let id = Self::mint(&mut self.next_event, EntityId::EVENT);
        self.events.push((id, event));
        id
    }

    /// Register a relation between two existing records.
    ///
    /// Both arguments must already resolve; dangling ids are rejected so the
    /// exported graph never references a missing record.
    pub fn add_relation(
        &mut self,
        kind: RelationKind,
        arg1: EntityId,
        arg2: EntityId,
    ) -> Result<EntityId> {
        for arg in [arg1, arg2] {
            if self.get(&arg).is_none() {
                return Err(Error::unknown_entity(arg.to_string()));
            }
        }
        let id = Self::mint(&mut self.next_relation, EntityId::RELATION);
        self.relations.push(Relation {
            id,
            kind,
            arg1,
            arg2,
        });
        Ok(id)
    }

    /// Look up any entity record by id.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<EntityRef<'_>> {
        match id.prefix() {
            EntityId::TERM => self
                .actor(id)
                .map(EntityRef::Actor)
                .or_else(|| self.time(id).map(EntityRef::Time)),
            EntityId::EVENT => self.event(id).map(EntityRef::Event),
            _ => None,
        }
    }

    /// Look up an actor by id.
    #[must_use]
    pub fn actor(&self, id: &EntityId) -> Option<&Actor> {
        self.actors.iter().find(|(k, _)| k == id).map(|(_, a)| a)
    }

    /// Look up a time by id.
    #[must_use]
    pub fn time(&self, id: &EntityId) -> Option<&Time> {
        self.times.iter().find(|(k, _)| k == id).map(|(_, t)| t)
    }

    /// Look up an event by id.
    #[must_use]
    pub fn event(&self, id: &EntityId) -> Option<&Event> {
        self.events.iter().find(|(k, _)| k == id).map(|(_, e)| e)
    }

    /// Look up a relation by id.
    #[must_use]
    pub fn relation(&self, id: &EntityId) -> Option<&Relation> {
        self.relations.iter().find(|r| &r.id == id)
    }

    /// Actors in registration order.
    pub fn actors(&self) -> impl Iterator<Item = (&EntityId, &Actor)> {
        self.actors.iter().map(|(id, a)| (id, a))
    }

    /// Times in registration order.
    pub fn times(&self) -> impl Iterator<Item = (&EntityId, &Time)> {
        self.times.iter().map(|(id, t)| (id, t))
    }

    /// Events in registration order.
    pub fn events(&self) -> impl Iterator<Item = (&EntityId, &Event)> {
        self.events.iter().map(|(id, e)| (id, e))
    }

    /// Relations in registration order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    /// `(id, span)` of every actor, in registration order.
    pub fn actor_spans(&self) -> impl Iterator<Item = (&EntityId, Span)> {
        self.actors.iter().map(|(id, a)| (id, a.span))
    }

    /// `(id, span)` of every event, in registration order.
    pub fn event_spans(&self) -> impl Iterator<Item = (&EntityId, Span)> {
        self.events.iter().map(|(id, e)| (id, e.span))
    }

    /// Number of actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Number of times.
    #[must_use]
    pub fn time_count(&self) -> usize {
        self.times.len()
    }

    /// Number of events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of relations.
    #[must_use]
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(start: usize, end: usize) -> Actor {
        Actor::new(
            "x",
            Span::new(start, end).unwrap(),
            LexicalHead::Noun,
            ActorType::Person,
        )
    }

    #[test]
    fn actors_and_times_share_the_term_counter() {
        let mut reg = Registry::new();
        let a = reg.add_actor(actor(0, 5));
        let t = reg.add_time(Time::new(
            "today",
            Span::new(10, 15).unwrap(),
            TimexType::Date,
            "2021-08-31",
        ));
        let b = reg.add_actor(actor(20, 25));
        assert_eq!(a.to_string(), "T1");
        assert_eq!(t.to_string(), "T2");
        assert_eq!(b.to_string(), "T3");
    }

    #[test]
    fn events_and_relations_have_their_own_counters() {
        let mut reg = Registry::new();
        let a = reg.add_actor(actor(0, 5));
        let e = reg.add_event(Event::new("said", Span::new(6, 10).unwrap()));
        assert_eq!(e.to_string(), "E1");
        let r = reg
            .add_relation(RelationKind::SemanticRole(Category::Agent), e, a)
            .unwrap();
        assert_eq!(r.to_string(), "R1");
        assert_eq!(reg.relation(&r).unwrap().arg1, e);
    }

    #[test]
    fn relation_to_unknown_id_is_rejected() {
        let mut reg = Registry::new();
        let a = reg.add_actor(actor(0, 5));
        let ghost = EntityId::parse("T9").unwrap();
        let err = reg
            .add_relation(RelationKind::ObjIdentity, a, ghost)
            .unwrap_err();
        assert_eq!(err, Error::UnknownEntity("T9".to_string()));
        assert_eq!(reg.relation_count(), 0);
    }

    #[test]
    fn get_resolves_every_kind() {
        let mut reg = Registry::new();
        let a = reg.add_actor(actor(0, 5));
        let t = reg.add_time(Time::new(
            "now",
            Span::new(6, 9).unwrap(),
            TimexType::Time,
            "PRESENT_REF",
        ));
        let e = reg.add_event(Event::new("ran", Span::new(10, 13).unwrap()));
        assert!(matches!(reg.get(&a), Some(EntityRef::Actor(_))));
        assert!(matches!(reg.get(&t), Some(EntityRef::Time(_))));
        assert_eq!(reg.get(&e).unwrap().text(), "ran");
    }

    #[test]
    fn entity_id_parse_and_display() {
        let id: EntityId = "E12".parse().unwrap();
        assert_eq!(id.prefix(), 'E');
        assert_eq!(id.number(), 12);
        assert_eq!(id.to_string(), "E12");
        assert!(EntityId::parse("X1").is_err());
        assert!(EntityId::parse("T").is_err());
        assert!(EntityId::parse("T0").is_err());
    }

    #[test]
    fn default_attributes() {
        let a = actor(0, 1);
        assert_eq!(a.individuation, Individuation::Individual);
        assert_eq!(a.involvement, Involvement::One);
        let e = Event::new("x", Span::empty_at(0));
        assert_eq!(e.class, EventClass::Occurrence);
        assert_eq!(e.tense, Tense::Present);
        assert_eq!(e.polarity, Polarity::Positive);
        assert_eq!(e.factuality, Factuality::Factual);
    }

    #[test]
    fn registry_serializes_ids_as_strings() {
        let mut reg = Registry::new();
        reg.add_actor(actor(0, 5));
        let json = serde_json::to_string(&reg).unwrap();
        assert!(json.contains("\"T1\""));
        let back: Registry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.actor_count(), 1);
    }
}
