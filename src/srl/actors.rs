//! Group tokens into actors and events.
//!
//! A small state machine walks the `(begin, event)` flags of a sentence:
//!
//! ```text
//!                 event                      event
//!   ┌──────┐  ───────────────►  ┌─────────┐ ◄──────── ┌─────────┐
//!   │ Idle │                    │ InEvent │           │ InActor │
//!   └──────┘  ◄───────────────  └─────────┘ ────────► └─────────┘
//!               neither flag                 begin
//! ```
//!
//! - event token: entering `InEvent` opens `event{n+1}`; staying repeats it
//! - begin token (not event): opens `actor{n+1}`
//! - plain token in `InActor`: repeats the actor
//! - plain token elsewhere: repeats the previous token's group
//!
//! Every token gets a group, and every group is a contiguous run.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentence-local group key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupId {
    /// `actor{n}`
    Actor(usize),
    /// `event{n}`
    Event(usize),
}

impl GroupId {
    /// True for event groups.
    pub fn is_event(&self) -> bool {
        matches!(self, GroupId::Event(_))
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::Actor(n) => write!(f, "actor{n}"),
            GroupId::Event(n) => write!(f, "event{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InActor,
    InEvent,
}

/// Assigns a [`GroupId`] to every token of a sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActorSegmenter;

impl ActorSegmenter {
    /// Create a segmenter.
    pub fn new() -> Self {
        Self
    }

    /// Walk `begins`/`events` (same length) and emit one group per token.
    pub fn segment(&self, begins: &[bool], events: &[bool]) -> Result<Vec<GroupId>> {
        if begins.len() != events.len() {
            return Err(Error::invalid_input(format!(
                "{} begin flags for {} event flags",
                begins.len(),
                events.len()
            )));
        }

        let mut state = State::Idle;
        let mut actors = 0;
        let mut event_count = 0;
        let mut groups: Vec<GroupId> = Vec::with_capacity(begins.len());

        for (&begin, &event) in begins.iter().zip(events) {
            let group = if event {
                if state != State::InEvent {
                    event_count += 1;
                }
                state = State::InEvent;
                GroupId::Event(event_count)
            } else if begin {
                actors += 1;
                state = State::InActor;
                GroupId::Actor(actors)
            } else if state == State::InActor {
                GroupId::Actor(actors)
            } else if let Some(&previous) = groups.last() {
                state = State::Idle;
                previous
            } else {
                actors += 1;
                state = State::InActor;
                GroupId::Actor(actors)
            };
            groups.push(group);
        }
        Ok(groups)
    }
}
