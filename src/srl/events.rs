//! Event detection over a normalized tag sequence.
//!
//! A verb token is always part of an event. Between two verbs up to
//! `threshold - 1` non-verb tokens are tolerated and absorbed into the same
//! event:
//!
//! ```text
//! threshold = 3
//!
//! tags:   B-ARG0  B-V   B-ARG1  I-ARG1  I-V   B-ARG2
//! event:    -      x      x       x      x      -
//!                  └──── one event (2 tokens between verbs) ┘
//! ```
//!
//! A modifier immediately followed by a verb (`will` in "will go") is pulled
//! into the event it introduces.

use super::normalize::NormalizedTag;
use super::tags::{is_modifier, is_verb};

/// Marks event tokens.
#[derive(Debug, Clone)]
pub struct EventSegmenter {
    verb_tags: Vec<String>,
    threshold: usize,
}

impl EventSegmenter {
    /// Segmenter with the given verb vocabulary and gap tolerance.
    pub fn new<S: Into<String>>(verb_tags: impl IntoIterator<Item = S>, threshold: usize) -> Self {
        Self {
            verb_tags: verb_tags.into_iter().map(Into::into).collect(),
            threshold,
        }
    }

    /// Gap tolerance.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// One flag per tag: true if the token belongs to an event.
    ///
    /// The lookahead window is clipped at the end of the sentence, so a
    /// verb near the end still extends an open event.
    pub fn segment(&self, tags: &[NormalizedTag]) -> Vec<bool> {
        let verb = |i: usize| is_verb(&tags[i].tag, &self.verb_tags);
        let n = tags.len();
        let mut flags = Vec::with_capacity(n);
        let mut continuing = false;
        let mut begun = false;

        for i in 0..n {
            if is_modifier(&tags[i].tag) && i + 1 < n && verb(i + 1) {
                flags.push(true);
                begun = true;
                continue;
            }

            let here = verb(i);
            flags.push(continuing || here);
            if here {
                begun = true;
            }

            let window_end = n.min(i.saturating_add(1).saturating_add(self.threshold));
            if begun && (i + 1..window_end).any(verb) {
                continuing = true;
            } else {
                continuing = false;
                begun = false;
            }
        }
        flags
    }
}

impl Default for EventSegmenter {
    fn default() -> Self {
        Self::new(["B-V", "I-V"], 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(raw: &[&str]) -> Vec<NormalizedTag> {
        raw.iter()
            .map(|t| NormalizedTag {
                tag: t.to_string(),
                is_begin: t.starts_with('B'),
            })
            .collect()
    }

    #[test]
    fn verb_after_argument() {
        let flags = EventSegmenter::default().segment(&tags(&["B-ARG0", "I-V"]));
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn short_gap_between_verbs_is_absorbed() {
        let seq = tags(&["B-ARG0", "B-V", "B-ARG1", "I-ARG1", "I-V", "B-ARG2"]);
        let flags = EventSegmenter::default().segment(&seq);
        assert_eq!(flags, vec![false, true, true, true, true, false]);
    }

    #[test]
    fn long_gap_splits_events() {
        let seq = tags(&["B-V", "B-ARG1", "I-ARG1", "I-ARG1", "B-V"]);
        let flags = EventSegmenter::default().segment(&seq);
        assert_eq!(flags, vec![true, false, false, false, true]);
    }

    #[test]
    fn threshold_one_tolerates_no_gap() {
        let seq = tags(&["B-V", "B-ARG1", "B-V"]);
        let flags = EventSegmenter::new(["B-V", "I-V"], 1).segment(&seq);
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn modifier_before_verb_joins_event() {
        let seq = tags(&["B-ARG0", "B-ARGM-MOD", "B-V", "B-ARG1"]);
        let flags = EventSegmenter::default().segment(&seq);
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn no_verbs_no_events() {
        let seq = tags(&["B-ARG0", "I-ARG0", "O"]);
        assert_eq!(EventSegmenter::default().segment(&seq), vec![false; 3]);
        assert!(EventSegmenter::default().segment(&[]).is_empty());
    }
}
