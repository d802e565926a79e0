//! BIO chunking of per-token NE annotations into actor candidates.
//!
//! NER taggers label tokens, not entities:
//!
//! ```text
//! token:   The   United  Nations  met   Lula  da    Silva
//! pos:     DET   PROPN   PROPN    VERB  PROPN PROPN PROPN
//! ne:      O     B-ORG   I-ORG    O     B-PER I-PER I-PER
//!
//! actors:        [United Nations]       [Lula da Silva]
//!                 Noun / Org             Noun / Per
//! ```
//!
//! A chunk opens on `B-*`, or on `I-*` whose type differs from the previous
//! token's (a tagger that skips the `B-`). `I-*` of the same type extends the
//! end offset; `O` closes the chunk.
//!
//! The chunk's lexical head is the first token POS that maps to a noun or a
//! pronoun, else `UNDEF`.

use fabula_core::{ActorCandidate, ActorType, LexicalHead, Span};
use serde::{Deserialize, Serialize};

/// One token as reported by an NER/POS tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAnnotation {
    /// Character span of the token
    pub span: Span,
    /// POS label (`NOUN`, `PROPN`, `PRON`, ...)
    pub pos: String,
    /// NE label in IOB form (`B-PER`, `I-ORG`, `O`)
    pub ne: String,
}

impl TokenAnnotation {
    /// Create an annotation.
    pub fn new(span: Span, pos: impl Into<String>, ne: impl Into<String>) -> Self {
        Self {
            span,
            pos: pos.into(),
            ne: ne.into(),
        }
    }
}

fn split_iob(label: &str) -> (char, &str) {
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(p @ ('B' | 'I')), Some('-' | '_')) => (p, &label[2..]),
        _ => ('O', ""),
    }
}

struct Open {
    start: usize,
    end: usize,
    head: LexicalHead,
    label: String,
}

impl Open {
    fn close(self) -> ActorCandidate {
        ActorCandidate::new(
            Span {
                start: self.start,
                end: self.end,
            },
            self.head,
            ActorType::from_label(&self.label),
        )
    }
}

/// Chunk one tool's token annotations into actor candidates, in text order.
///
/// ```
/// use fabula::chunk::{chunk_actors, TokenAnnotation};
/// use fabula_core::{ActorType, LexicalHead, Span};
///
/// let tokens = vec![
///     TokenAnnotation::new(Span::new(0, 4).unwrap(), "PROPN", "B-PER"),
///     TokenAnnotation::new(Span::new(5, 10).unwrap(), "PROPN", "I-PER"),
///     TokenAnnotation::new(Span::new(11, 15).unwrap(), "VERB", "O"),
/// ];
/// let actors = chunk_actors(&tokens);
/// assert_eq!(actors.len(), 1);
/// assert_eq!(actors[0].span, Span::new(0, 10).unwrap());
/// assert_eq!(actors[0].lexical_head, LexicalHead::Noun);
/// assert_eq!(actors[0].actor_type, ActorType::Person);
/// ```
#[must_use]
pub fn chunk_actors(tokens: &[TokenAnnotation]) -> Vec<ActorCandidate> {
    let mut actors = Vec::new();
    let mut open: Option<Open> = None;
    let mut previous_label = "";

    for token in tokens {
        let (prefix, label) = split_iob(&token.ne);
        let head = LexicalHead::from_pos(&token.pos);

        let starts_chunk = prefix == 'B' || (prefix == 'I' && label != previous_label);
        if starts_chunk {
            if let Some(done) = open.take() {
                actors.push(done.close());
            }
            open = Some(Open {
                start: token.span.start,
                end: token.span.end,
                head,
                label: label.to_string(),
            });
        } else if prefix == 'I' {
            if let Some(chunk) = open.as_mut() {
                chunk.end = token.span.end;
                if !chunk.head.is_defined() {
                    chunk.head = head;
                }
            }
        } else if let Some(done) = open.take() {
            actors.push(done.close());
        }

        previous_label = label;
    }

    if let Some(done) = open {
        actors.push(done.close());
    }
    actors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(start: usize, end: usize, pos: &str, ne: &str) -> TokenAnnotation {
        TokenAnnotation::new(Span::new(start, end).unwrap(), pos, ne)
    }

    #[test]
    fn adjacent_begins_split() {
        let tokens = vec![tok(0, 3, "PROPN", "B-PER"), tok(4, 9, "PROPN", "B-ORG")];
        let actors = chunk_actors(&tokens);
        assert_eq!(actors.len(), 2);
        assert_eq!(actors[1].actor_type, ActorType::Organization);
    }

    #[test]
    fn type_change_on_inside_opens_new_chunk() {
        let tokens = vec![
            tok(0, 5, "PROPN", "B-PER"),
            tok(6, 12, "PROPN", "I-LOC"),
            tok(13, 17, "PROPN", "I-LOC"),
        ];
        let actors = chunk_actors(&tokens);
        assert_eq!(actors.len(), 2);
        assert_eq!(actors[1].span, Span::new(6, 17).unwrap());
        assert_eq!(actors[1].actor_type, ActorType::Location);
    }

    #[test]
    fn inside_after_outside_opens_new_chunk() {
        let tokens = vec![tok(0, 3, "DET", "O"), tok(4, 9, "PROPN", "I-ORG")];
        let actors = chunk_actors(&tokens);
        assert_eq!(actors.len(), 1);
        assert_eq!(actors[0].span, Span::new(4, 9).unwrap());
    }

    #[test]
    fn head_comes_from_first_nominal_token() {
        let tokens = vec![
            tok(0, 3, "DET", "B-ORG"),
            tok(4, 8, "PRON", "I-ORG"),
            tok(9, 13, "NOUN", "I-ORG"),
        ];
        let actors = chunk_actors(&tokens);
        assert_eq!(actors[0].lexical_head, LexicalHead::Pronoun);

        let undef = chunk_actors(&[tok(0, 3, "ADJ", "B-MISC")]);
        assert_eq!(undef[0].lexical_head, LexicalHead::Undef);
        assert_eq!(undef[0].actor_type, ActorType::Other);
    }

    #[test]
    fn all_outside_yields_nothing() {
        assert!(chunk_actors(&[tok(0, 3, "NOUN", "O")]).is_empty());
        assert!(chunk_actors(&[]).is_empty());
    }
}
