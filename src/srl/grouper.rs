//! Turn tagged sentences into categorized character spans.

use super::actors::{ActorSegmenter, GroupId};
use super::events::EventSegmenter;
use super::normalize::TagNormalizer;
use super::tags::{modifier_subtype, TagFrame};
use super::SrlConfig;
use crate::offset::{MissPolicy, SpanProjector};
use crate::{Error, Result};
use fabula_core::{Category, ExtractedSpan, Span};

/// Semantic category of a modifier subtype (`TMP`, `LOC`, ...).
///
/// Unknown subtypes fall back to [`Category::Theme`].
#[must_use]
pub fn modifier_category(subtype: &str) -> Category {
    match subtype {
        "TMP" => Category::Time,
        "LOC" => Category::Location,
        "ADV" | "EXT" | "DIS" | "NEG" | "PRD" | "ADJ" => Category::Theme,
        "MNR" => Category::Manner,
        "CAU" => Category::Cause,
        "PNC" | "PRP" => Category::Purpose,
        "DIR" => Category::Path,
        "MOD" | "REC" => Category::Instrument,
        "COM" => Category::Agent,
        "GOL" => Category::Goal,
        other => {
            log::debug!("[ActorGrouper] unmapped modifier {other:?}, using THEME");
            Category::Theme
        }
    }
}

/// Recoverable conditions met while grouping a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SrlStats {
    /// Tag columns no rule resolved
    pub tag_ambiguities: usize,
    /// Tokens dropped because they were not found in the text
    pub projection_misses: usize,
    /// Sentences without any frame
    pub frameless_sentences: usize,
    /// Sentences dropped by strict tag normalization
    pub rejected_sentences: usize,
}

/// Grouped spans of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrlOutput {
    /// One list per sentence with at least one frame, in text order
    pub sentences: Vec<Vec<ExtractedSpan>>,
    /// What was degraded along the way
    pub stats: SrlStats,
}

impl SrlOutput {
    /// All spans, sentence by sentence.
    pub fn spans(&self) -> impl Iterator<Item = &ExtractedSpan> {
        self.sentences.iter().flatten()
    }

    /// Only the `EVENT` spans.
    pub fn events(&self) -> impl Iterator<Item = &ExtractedSpan> {
        self.spans().filter(|s| s.category.is_event())
    }
}

struct Member<'a> {
    surface: &'a str,
    tag: &'a str,
    span: Span,
}

/// Runs normalization, segmentation and projection over a document.
#[derive(Debug, Clone)]
pub struct ActorGrouper {
    config: SrlConfig,
    normalizer: TagNormalizer,
    events: EventSegmenter,
    actors: ActorSegmenter,
}

impl ActorGrouper {
    /// Build the pipeline from `config`.
    pub fn new(config: SrlConfig) -> Self {
        let normalizer =
            TagNormalizer::new(config.verb_tags.iter().cloned()).strict(config.strict_tags);
        let events = EventSegmenter::new(config.verb_tags.iter().cloned(), config.event_threshold);
        Self {
            config,
            normalizer,
            events,
            actors: ActorSegmenter::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SrlConfig {
        &self.config
    }

    /// Group every sentence of `text`.
    ///
    /// Frameless sentences are skipped. Under strict tags, a sentence with an
    /// unresolvable column is dropped whole and counted. Its tokens are still
    /// projected so the cursor stays in step with the text.
    pub fn group_document(&self, text: &str, frames: &[TagFrame]) -> Result<SrlOutput> {
        let mut projector = SpanProjector::new(text);
        let mut out = SrlOutput::default();
        for (i, frame) in frames.iter().enumerate() {
            if frame.is_frameless() {
                log::debug!("[ActorGrouper] sentence {i} has no frames, skipping");
                out.stats.frameless_sentences += 1;
                continue;
            }
            match self.group_sentence(frame, &mut projector, &mut out.stats) {
                Ok(spans) => out.sentences.push(spans),
                Err(Error::TagAmbiguity { token, candidates }) => {
                    log::warn!(
                        "[ActorGrouper] dropping sentence {i}: {token:?} has tags {candidates:?}"
                    );
                    out.stats.rejected_sentences += 1;
                    self.pass_over(frame, &mut projector, &mut out.stats)?;
                }
                Err(e) => return Err(e),
            }
        }
        log::info!(
            "[ActorGrouper] {} sentences, {} spans",
            out.sentences.len(),
            out.spans().count()
        );
        Ok(out)
    }

    /// Group one sentence, advancing `projector` past its tokens.
    ///
    /// Under strict tags this returns [`Error::TagAmbiguity`] before any
    /// token is projected.
    pub fn group_sentence(
        &self,
        frame: &TagFrame,
        projector: &mut SpanProjector<'_>,
        stats: &mut SrlStats,
    ) -> Result<Vec<ExtractedSpan>> {
        let pruned;
        let frame = if self.config.prune_untagged {
            pruned = frame.prune_untagged();
            &pruned
        } else {
            frame
        };

        let normalized = self.normalizer.normalize(frame)?;
        stats.tag_ambiguities += normalized.ambiguities.len();
        let tags = normalized.tags;

        let event_flags = self.events.segment(&tags);
        let begins: Vec<bool> = tags.iter().map(|t| t.is_begin).collect();
        let groups = self.actors.segment(&begins, &event_flags)?;

        let mut runs: Vec<(GroupId, Vec<Member<'_>>)> = Vec::new();
        for (i, surface) in frame.tokens().iter().enumerate() {
            let span = match projector.project_hinted(surface, frame.offset(i)) {
                Ok(span) => span,
                Err(e @ Error::SpanProjectionMiss { .. }) => match self.config.on_projection_miss {
                    MissPolicy::Fail => return Err(e),
                    MissPolicy::Skip => {
                        stats.projection_misses += 1;
                        continue;
                    }
                },
                Err(e) => return Err(e),
            };
            let member = Member {
                surface,
                tag: &tags[i].tag,
                span,
            };
            match runs.last_mut() {
                Some((group, members)) if *group == groups[i] => members.push(member),
                _ => runs.push((groups[i], vec![member])),
            }
        }

        Ok(runs
            .into_iter()
            .map(|(group, members)| Self::emit(group, &members))
            .collect())
    }

    /// Advance `projector` past a dropped sentence under the miss policy.
    fn pass_over(
        &self,
        frame: &TagFrame,
        projector: &mut SpanProjector<'_>,
        stats: &mut SrlStats,
    ) -> Result<()> {
        for (i, surface) in frame.tokens().iter().enumerate() {
            match projector.project_hinted(surface, frame.offset(i)) {
                Ok(_) => {}
                Err(e @ Error::SpanProjectionMiss { .. }) => match self.config.on_projection_miss {
                    MissPolicy::Fail => return Err(e),
                    MissPolicy::Skip => stats.projection_misses += 1,
                },
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn emit(group: GroupId, members: &[Member<'_>]) -> ExtractedSpan {
        let category = if group.is_event() {
            Category::Event
        } else {
            members
                .iter()
                .find_map(|m| modifier_subtype(m.tag))
                .map_or(Category::Theme, modifier_category)
        };
        let start = members.first().map_or(0, |m| m.span.start);
        let end = members.last().map_or(start, |m| m.span.end);
        ExtractedSpan {
            span: Span { start, end },
            category,
            text: members
                .iter()
                .map(|m| m.surface)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl Default for ActorGrouper {
    fn default() -> Self {
        Self::new(SrlConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tokens: &[&str], rows: &[&[&str]]) -> TagFrame {
        TagFrame::from_strs(tokens, rows).unwrap()
    }

    #[test]
    fn two_token_sentence() {
        let text = "Ana ran.";
        let f = frame(&["Ana", "ran"], &[&["B-ARG0", "I-V"], &["O", "B-V"]]);
        let out = ActorGrouper::default().group_document(text, &[f]).unwrap();
        let spans = &out.sentences[0];
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].category, Category::Theme);
        assert_eq!(spans[0].text, "Ana");
        assert_eq!(spans[1].category, Category::Event);
        assert_eq!(spans[1].span, Span::new(4, 7).unwrap());
    }

    #[test]
    fn modifier_groups_take_their_category() {
        let text = "Maria sold the house yesterday in Lisbon.";
        let f = frame(
            &["Maria", "sold", "the", "house", "yesterday", "in", "Lisbon", "."],
            &[&[
                "B-ARG0", "B-V", "B-ARG1", "I-ARG1", "B-ARGM-TMP", "B-ARGM-LOC", "I-ARGM-LOC", "O",
            ]],
        );
        let out = ActorGrouper::default().group_document(text, &[f]).unwrap();
        let got: Vec<_> = out.sentences[0]
            .iter()
            .map(|s| (s.text.as_str(), s.category, s.span.start, s.span.end))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Maria", Category::Theme, 0, 5),
                ("sold", Category::Event, 6, 10),
                ("the house", Category::Theme, 11, 20),
                ("yesterday", Category::Time, 21, 30),
                ("in Lisbon", Category::Location, 31, 40),
            ]
        );
    }

    #[test]
    fn cursor_carries_across_sentences() {
        let text = "Ana ran. Ana ran.";
        let f = frame(&["Ana", "ran"], &[&["B-ARG0", "B-V"]]);
        let out = ActorGrouper::default()
            .group_document(text, &[f.clone(), f])
            .unwrap();
        assert_eq!(out.sentences[1][0].span, Span::new(9, 12).unwrap());
    }

    #[test]
    fn strict_tags_drop_only_the_ambiguous_sentence() {
        let text = "Ana um ran. Ana ran.";
        let ambiguous = frame(
            &["Ana", "um", "ran"],
            &[&["B-ARG0", "B-C-X", "B-V"], &["O", "B-R-Y", "O"]],
        );
        let clean = frame(&["Ana", "ran"], &[&["B-ARG0", "B-V"]]);
        let grouper = ActorGrouper::new(SrlConfig::default().with_strict_tags(true));

        let out = grouper.group_document(text, &[ambiguous, clean]).unwrap();
        assert_eq!(out.stats.rejected_sentences, 1);
        assert_eq!(out.sentences.len(), 1);
        // The dropped sentence still moved the cursor: "Ana" is the second one.
        assert_eq!(out.sentences[0][0].span, Span::new(12, 15).unwrap());
        assert_eq!(out.sentences[0][1].span, Span::new(16, 19).unwrap());
    }

    #[test]
    fn huge_event_threshold_saturates() {
        let config = SrlConfig::from_json_str(r#"{"event_threshold": 18446744073709551615}"#)
            .unwrap()
            .with_prune_untagged(false);
        let grouper = ActorGrouper::new(config);
        assert_eq!(grouper.events.threshold(), usize::MAX);

        let f = frame(&["Ana", "ran", "and", "ran"], &[&["B-ARG0", "B-V", "O", "B-V"]]);
        let out = grouper
            .group_document("Ana ran and ran", &[f])
            .unwrap();
        assert_eq!(out.sentences[0][1].text, "ran and ran");
        assert_eq!(out.sentences[0][1].category, Category::Event);
    }

    #[test]
    fn frameless_sentences_are_skipped_and_counted() {
        let text = "Hi. Ana ran.";
        let empty = TagFrame::new(vec!["Hi".into(), ".".into()], vec![]).unwrap();
        let f = frame(&["Ana", "ran"], &[&["B-ARG0", "B-V"]]);
        let out = ActorGrouper::default()
            .group_document(text, &[empty, f])
            .unwrap();
        assert_eq!(out.sentences.len(), 1);
        assert_eq!(out.stats.frameless_sentences, 1);
    }

    #[test]
    fn projection_miss_fails_by_default() {
        let f = frame(&["Ana", "corre"], &[&["B-ARG0", "B-V"]]);
        let err = ActorGrouper::default()
            .group_document("Ana runs", &[f])
            .unwrap_err();
        assert!(matches!(err, Error::SpanProjectionMiss { .. }));
    }

    #[test]
    fn projection_miss_can_skip_the_token() {
        let config = SrlConfig::default().with_miss_policy(MissPolicy::Skip);
        let f = frame(&["“Ana”", "ran", "home"], &[&["B-ARG0", "B-V", "B-ARG1"]]);
        let out = ActorGrouper::new(config)
            .group_document("\"Ana\" ran home", &[f])
            .unwrap();
        assert_eq!(out.stats.projection_misses, 1);
        let texts: Vec<_> = out.sentences[0].iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["ran", "home"]);
    }

    #[test]
    fn unmapped_modifier_defaults_to_theme() {
        assert_eq!(modifier_category("XYZ"), Category::Theme);
        assert_eq!(modifier_category("COM"), Category::Agent);
        assert_eq!(modifier_category("REC"), Category::Instrument);
    }
}
