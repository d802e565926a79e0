//! Cross-tool actor reconciliation.
//!
//! Different tools tokenize differently, so the same actor often comes back
//! with different boundaries:
//!
//! ```text
//! text:     "o presidente de França"
//! tool A:      [presidente]              Noun  Other
//! tool B:      [presidente de França]    Noun  Per
//! tool C:                     [França]   Noun  Loc
//!
//! merged:      [presidente de França]    Noun  Per
//! ```
//!
//! # Algorithm (greedy sweep with expansion)
//!
//! 1. Keep one read cursor per source list.
//! 2. Seed a merged actor from the unconsumed candidate with the lowest start
//!    across all lists (ties go to the earlier list).
//! 3. Absorb the current candidate of every other list whose start lies at
//!    or before the merged end. If any absorbed candidate pushes the end
//!    further, scan again (now including the seeding list), until a full scan
//!    extends nothing.
//! 4. Vote: lexical head = most frequent non-`UNDEF` (none → discard);
//!    type = most frequent non-`Other` (none → `Other`). Ties go to the value
//!    observed first.
//! 5. Drop merged actors whose type is not an actor type (leaked dates etc.).
//!
//! Every list is consumed exactly once, so the sweep is `O(n · k)` for `n`
//! candidates across `k` lists. Cursors and accumulators are local to one
//! call.

use fabula_core::{ActorCandidate, ActorType, Error, Result};
use serde::{Deserialize, Serialize};

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Merged actors, ordered by span start.
    pub entities: Vec<ActorCandidate>,
    /// Merged actors discarded because every observed head was `UNDEF`.
    pub dropped_without_head: usize,
    /// Merged actors discarded because their voted type is not an actor type.
    pub dropped_by_type: usize,
}

/// Merges actor lists from several extraction tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Reconciler {
    actor_types_only: bool,
}

impl Reconciler {
    /// Create a reconciler with default settings.
    pub fn new() -> Self {
        Self {
            actor_types_only: true,
        }
    }

    /// Set whether merged actors with non-actor types (dates, times, unknown
    /// labels) are dropped.
    pub fn actor_types_only(mut self, enabled: bool) -> Self {
        self.actor_types_only = enabled;
        self
    }

    /// Merge `sources` (one list per tool, each sorted by span start).
    ///
    /// # Errors
    ///
    /// `InvalidInput` if no source is given (the caller picks the default
    /// tool set before calling) or if a list is not sorted by start.
    pub fn reconcile(&self, sources: &[Vec<ActorCandidate>]) -> Result<Reconciliation> {
        if sources.is_empty() {
            return Err(Error::invalid_input(
                "reconciliation needs at least one source list",
            ));
        }
        for (i, list) in sources.iter().enumerate() {
            if list.windows(2).any(|w| w[0].span.start > w[1].span.start) {
                return Err(Error::invalid_input(format!(
                    "source {i} is not sorted by span start"
                )));
            }
        }

        let mut cursors = vec![0usize; sources.len()];
        let mut out = Reconciliation::default();

        while let Some(seed) = lowest_pending(sources, &cursors) {
            let first = &sources[seed][cursors[seed]];
            cursors[seed] += 1;

            let mut span = first.span;
            let mut heads = vec![first.lexical_head];
            let mut types = vec![first.actor_type.clone()];

            let mut first_scan = true;
            loop {
                let mut extended = false;
                for (i, list) in sources.iter().enumerate() {
                    if first_scan && i == seed {
                        continue;
                    }
                    let Some(candidate) = list.get(cursors[i]) else {
                        continue;
                    };
                    if candidate.span.start <= span.end {
                        if candidate.span.end > span.end {
                            span.end = candidate.span.end;
                            extended = true;
                        }
                        heads.push(candidate.lexical_head);
                        types.push(candidate.actor_type.clone());
                        cursors[i] += 1;
                    }
                }
                first_scan = false;
                if !extended {
                    break;
                }
            }

            let Some(lexical_head) = vote(&heads, |h| h.is_defined()) else {
                log::debug!("[Reconciler] discarding {span}: no noun or pronoun head");
                out.dropped_without_head += 1;
                continue;
            };
            let actor_type = vote(&types, |t| !t.is_generic()).unwrap_or(ActorType::Other);

            if self.actor_types_only && !actor_type.is_actor_type() {
                log::debug!("[Reconciler] discarding {span}: type {actor_type} is not an actor type");
                out.dropped_by_type += 1;
                continue;
            }

            out.entities
                .push(ActorCandidate::new(span, lexical_head, actor_type));
        }

        Ok(out)
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the list whose current candidate starts first (earliest list on ties).
fn lowest_pending(sources: &[Vec<ActorCandidate>], cursors: &[usize]) -> Option<usize> {
    sources
        .iter()
        .enumerate()
        .filter_map(|(i, list)| list.get(cursors[i]).map(|c| (c.span.start, i)))
        .min()
        .map(|(_, i)| i)
}

/// Most frequent admissible value; ties go to the value observed first.
fn vote<T: PartialEq + Clone>(observed: &[T], admissible: impl Fn(&T) -> bool) -> Option<T> {
    let mut best: Option<(&T, usize)> = None;
    for (i, value) in observed.iter().enumerate() {
        if !admissible(value) || observed[..i].contains(value) {
            continue;
        }
        let count = observed.iter().filter(|o| *o == value).count();
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::{LexicalHead, Span};

    fn cand(start: usize, end: usize, head: LexicalHead, ty: ActorType) -> ActorCandidate {
        ActorCandidate::new(Span::new(start, end).unwrap(), head, ty)
    }

    fn noun(start: usize, end: usize, ty: ActorType) -> ActorCandidate {
        cand(start, end, LexicalHead::Noun, ty)
    }

    #[test]
    fn specific_type_beats_generic_other() {
        let a = vec![noun(2, 7, ActorType::Other)];
        let b = vec![noun(5, 10, ActorType::Location)];
        let merged = Reconciler::new().reconcile(&[a, b]).unwrap();
        assert_eq!(merged.entities, vec![noun(2, 10, ActorType::Location)]);
    }

    #[test]
    fn empty_source_set_is_rejected() {
        assert!(Reconciler::new().reconcile(&[]).is_err());
    }

    #[test]
    fn unsorted_source_is_rejected() {
        let a = vec![noun(10, 12, ActorType::Person), noun(0, 3, ActorType::Person)];
        let err = Reconciler::new().reconcile(&[a]).unwrap_err();
        assert!(err.to_string().contains("not sorted"));
    }

    #[test]
    fn disjoint_candidates_stay_separate() {
        let a = vec![noun(0, 4, ActorType::Person), noun(20, 25, ActorType::Organization)];
        let b = vec![noun(10, 15, ActorType::Location)];
        let merged = Reconciler::new().reconcile(&[a, b]).unwrap();
        let spans: Vec<_> = merged.entities.iter().map(|e| (e.span.start, e.span.end)).collect();
        assert_eq!(spans, vec![(0, 4), (10, 15), (20, 25)]);
    }

    #[test]
    fn extension_chains_through_later_candidates() {
        // a:[0,5)  b:[4,9)  c:[8,12) -> one actor [0,12)
        let a = vec![noun(0, 5, ActorType::Person)];
        let b = vec![noun(4, 9, ActorType::Person)];
        let c = vec![noun(8, 12, ActorType::Person)];
        let merged = Reconciler::new().reconcile(&[a, b, c]).unwrap();
        assert_eq!(merged.entities.len(), 1);
        assert_eq!(merged.entities[0].span, Span::new(0, 12).unwrap());
    }

    #[test]
    fn extension_rescans_the_seeding_list() {
        // Seed [0,3) from a; b extends to [0,8); a's next [6,8) now overlaps.
        let a = vec![noun(0, 3, ActorType::Person), noun(6, 8, ActorType::Person)];
        let b = vec![noun(2, 8, ActorType::Person)];
        let merged = Reconciler::new().reconcile(&[a, b]).unwrap();
        assert_eq!(merged.entities.len(), 1);
        assert_eq!(merged.entities[0].span, Span::new(0, 8).unwrap());
    }

    #[test]
    fn seeding_list_is_skipped_without_extension() {
        // Same list, overlapping candidates, no other list: both survive.
        let a = vec![noun(0, 5, ActorType::Person), noun(3, 5, ActorType::Person)];
        let merged = Reconciler::new().reconcile(&[a.clone()]).unwrap();
        assert_eq!(merged.entities, a);
    }

    #[test]
    fn tie_on_start_goes_to_first_list() {
        let a = vec![cand(0, 4, LexicalHead::Pronoun, ActorType::Person)];
        let b = vec![cand(0, 4, LexicalHead::Noun, ActorType::Organization)];
        let merged = Reconciler::new().reconcile(&[a, b]).unwrap();
        // One vote each: first observed (list a) wins both attributes.
        assert_eq!(merged.entities[0].lexical_head, LexicalHead::Pronoun);
        assert_eq!(merged.entities[0].actor_type, ActorType::Person);
    }

    #[test]
    fn all_undef_heads_discard_the_actor() {
        let a = vec![cand(0, 4, LexicalHead::Undef, ActorType::Person)];
        let b = vec![cand(1, 4, LexicalHead::Undef, ActorType::Person)];
        let merged = Reconciler::new().reconcile(&[a, b]).unwrap();
        assert!(merged.entities.is_empty());
        assert_eq!(merged.dropped_without_head, 1);
    }

    #[test]
    fn undef_is_outvoted_by_any_defined_head() {
        let a = vec![cand(0, 4, LexicalHead::Undef, ActorType::Person)];
        let b = vec![cand(0, 4, LexicalHead::Undef, ActorType::Person)];
        let c = vec![cand(0, 4, LexicalHead::Noun, ActorType::Person)];
        let merged = Reconciler::new().reconcile(&[a, b, c]).unwrap();
        assert_eq!(merged.entities[0].lexical_head, LexicalHead::Noun);
    }

    #[test]
    fn majority_type_wins() {
        let a = vec![noun(0, 4, ActorType::Organization)];
        let b = vec![noun(0, 4, ActorType::Person)];
        let c = vec![noun(0, 4, ActorType::Person)];
        let merged = Reconciler::new().reconcile(&[a, b, c]).unwrap();
        assert_eq!(merged.entities[0].actor_type, ActorType::Person);
    }

    #[test]
    fn all_other_stays_other() {
        let a = vec![noun(0, 4, ActorType::Other)];
        let b = vec![noun(0, 4, ActorType::Other)];
        let merged = Reconciler::new().reconcile(&[a, b]).unwrap();
        assert_eq!(merged.entities[0].actor_type, ActorType::Other);
    }

    #[test]
    fn dates_are_filtered_out() {
        let a = vec![noun(0, 10, ActorType::Date), noun(12, 15, ActorType::Person)];
        let merged = Reconciler::new().reconcile(&[a]).unwrap();
        assert_eq!(merged.entities.len(), 1);
        assert_eq!(merged.dropped_by_type, 1);

        let a = vec![noun(0, 10, ActorType::Date)];
        let kept = Reconciler::new()
            .actor_types_only(false)
            .reconcile(&[a])
            .unwrap();
        assert_eq!(kept.entities.len(), 1);
    }

    #[test]
    fn vote_prefers_first_observed_on_ties() {
        let values = ["b", "a", "a", "b", "c"];
        assert_eq!(vote(&values, |_| true), Some("b"));
        assert_eq!(vote(&values, |v| *v != "b"), Some("a"));
        assert_eq!(vote(&values, |_| false), None);
    }
}
