//! External tagger interfaces and tool dispatch.
//!
//! The taggers themselves (NER models, HeidelTime, an SRL model, a
//! coreference model) live outside this crate. Each capability is a trait:
//!
//! | Trait          | Produces                                  |
//! |----------------|-------------------------------------------|
//! | [`ActorTagger`] | per-token `(span, POS, NE IOB)` triples  |
//! | [`TimeTagger`]  | temporal expressions with TIMEX3 values  |
//! | [`SrlTagger`]   | one [`TagFrame`] per sentence            |
//! | [`CorefTagger`] | document tokens + token-index clusters   |
//!
//! An [`Annotator`] holds named implementations and picks the ones a caller
//! asks for. Requests fail closed: an unknown tool name is
//! [`Error::UnsupportedTool`], a tool that cannot handle the language is
//! [`Error::UnsupportedLanguage`].
//!
//! With no tools requested, actor extraction runs every registered actor
//! tagger (their outputs are reconciled); every other capability uses the
//! first registered tool. With several tools requested for a capability
//! other than actors, only the first is used.

use crate::chunk::{chunk_actors, TokenAnnotation};
use crate::lang::Language;
use crate::offset::{MissPolicy, SpanProjector};
use crate::srl::TagFrame;
use crate::{Error, Result};
use fabula_coalesce::{Reconciler, Reconciliation};
use fabula_core::{Span, TimeCandidate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Common surface of every external tagger.
pub trait Tagger: Send + Sync {
    /// Name the tool is requested by (`spacy`, `heideltime`, ...).
    fn name(&self) -> &str;

    /// Whether the tool handles `language`.
    fn supports(&self, language: Language) -> bool {
        let _ = language;
        true
    }
}

/// NER + POS tagger.
pub trait ActorTagger: Tagger {
    /// Tag every token of `text`.
    fn annotate_tokens(&self, text: &str, language: Language) -> Result<Vec<TokenAnnotation>>;
}

/// Temporal expression tagger.
pub trait TimeTagger: Tagger {
    /// Find temporal expressions, anchoring relative ones at `publication_time`.
    fn extract_times(
        &self,
        text: &str,
        language: Language,
        publication_time: Option<&str>,
    ) -> Result<Vec<TimeCandidate>>;
}

/// Semantic-role labeler.
pub trait SrlTagger: Tagger {
    /// One tag matrix per sentence, in text order.
    fn label_sentences(&self, text: &str, language: Language) -> Result<Vec<TagFrame>>;
}

/// Coreference resolver.
pub trait CorefTagger: Tagger {
    /// Tokens of the document and clusters over them.
    fn resolve(&self, text: &str, language: Language) -> Result<CorefOutput>;
}

/// Raw coreference output: clusters of inclusive token-index ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefOutput {
    /// Document tokens, in order
    pub tokens: Vec<String>,
    /// Each cluster lists mentions as `(first token, last token)`, inclusive
    pub clusters: Vec<Vec<(usize, usize)>>,
}

/// Coreference clusters in character offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharClusters {
    /// Mention spans per cluster, in the tagger's order
    pub clusters: Vec<Vec<Span>>,
    /// Tokens that could not be located (only under [`MissPolicy::Skip`])
    pub projection_misses: usize,
}

impl CorefOutput {
    /// Project tokens onto `text` once, then convert every mention.
    ///
    /// Under [`MissPolicy::Skip`] a mention whose first or last token could
    /// not be located is dropped from its cluster.
    pub fn char_clusters(&self, text: &str, policy: MissPolicy) -> Result<CharClusters> {
        let mut projector = SpanProjector::new(text);
        let mut misses = 0;
        let mut spans: Vec<Option<Span>> = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            match projector.project(token) {
                Ok(span) => spans.push(Some(span)),
                Err(e) if policy == MissPolicy::Fail => return Err(e),
                Err(_) => {
                    misses += 1;
                    spans.push(None);
                }
            }
        }

        let mut clusters = Vec::with_capacity(self.clusters.len());
        for cluster in &self.clusters {
            let mut mentions = Vec::with_capacity(cluster.len());
            for &(first, last) in cluster {
                if first > last || last >= spans.len() {
                    return Err(Error::invalid_input(format!(
                        "mention ({first}, {last}) out of range for {} tokens",
                        spans.len()
                    )));
                }
                if let (Some(a), Some(b)) = (spans[first], spans[last]) {
                    mentions.push(Span::new(a.start, b.end)?);
                }
            }
            clusters.push(mentions);
        }
        Ok(CharClusters {
            clusters,
            projection_misses: misses,
        })
    }
}

/// Capability a tool is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Actor extraction
    Actors,
    /// Time extraction
    Times,
    /// Semantic-role labeling
    SemanticRoles,
    /// Coreference resolution
    Coreference,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Actors => "actor",
            Capability::Times => "time",
            Capability::SemanticRoles => "semantic role",
            Capability::Coreference => "coreference",
        })
    }
}

/// Pick tools by name. No names: every tool if `all_by_default`, else the first.
fn select<'a, T: Tagger + ?Sized>(
    capability: Capability,
    registered: &'a [Arc<T>],
    requested: &[&str],
    language: Language,
    all_by_default: bool,
) -> Result<Vec<&'a T>> {
    let chosen: Vec<&T> = if requested.is_empty() {
        let take = if all_by_default { registered.len() } else { 1 };
        registered.iter().take(take).map(|t| t.as_ref()).collect()
    } else {
        requested
            .iter()
            .map(|name| {
                registered
                    .iter()
                    .find(|t| t.name() == *name)
                    .map(|t| t.as_ref())
                    .ok_or_else(|| {
                        Error::unsupported_tool(format!("{name} (no such {capability} tool)"))
                    })
            })
            .collect::<Result<_>>()?
    };

    if chosen.is_empty() {
        return Err(Error::unsupported_tool(format!(
            "no {capability} tool registered"
        )));
    }
    if let Some(tool) = chosen.iter().find(|t| !t.supports(language)) {
        return Err(Error::unsupported_language(format!(
            "{language} (not supported by {})",
            tool.name()
        )));
    }
    Ok(chosen)
}

/// Registry of named taggers, one list per capability.
#[derive(Clone, Default)]
pub struct Annotator {
    actor_taggers: Vec<Arc<dyn ActorTagger>>,
    time_taggers: Vec<Arc<dyn TimeTagger>>,
    srl_taggers: Vec<Arc<dyn SrlTagger>>,
    coref_taggers: Vec<Arc<dyn CorefTagger>>,
}

impl fmt::Debug for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |capability| self.tool_names(capability).join(", ");
        f.debug_struct("Annotator")
            .field("actor_taggers", &names(Capability::Actors))
            .field("time_taggers", &names(Capability::Times))
            .field("srl_taggers", &names(Capability::SemanticRoles))
            .field("coref_taggers", &names(Capability::Coreference))
            .finish()
    }
}

impl Annotator {
    /// Annotator with no tools.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor tagger.
    #[must_use]
    pub fn with_actor_tagger(mut self, tagger: impl ActorTagger + 'static) -> Self {
        self.actor_taggers.push(Arc::new(tagger));
        self
    }

    /// Register a time tagger.
    #[must_use]
    pub fn with_time_tagger(mut self, tagger: impl TimeTagger + 'static) -> Self {
        self.time_taggers.push(Arc::new(tagger));
        self
    }

    /// Register a semantic-role labeler.
    #[must_use]
    pub fn with_srl_tagger(mut self, tagger: impl SrlTagger + 'static) -> Self {
        self.srl_taggers.push(Arc::new(tagger));
        self
    }

    /// Register a coreference resolver.
    #[must_use]
    pub fn with_coref_tagger(mut self, tagger: impl CorefTagger + 'static) -> Self {
        self.coref_taggers.push(Arc::new(tagger));
        self
    }

    /// Names of the registered tools for `capability`, in registration order.
    pub fn tool_names(&self, capability: Capability) -> Vec<&str> {
        match capability {
            Capability::Actors => self.actor_taggers.iter().map(|t| t.name()).collect(),
            Capability::Times => self.time_taggers.iter().map(|t| t.name()).collect(),
            Capability::SemanticRoles => self.srl_taggers.iter().map(|t| t.name()).collect(),
            Capability::Coreference => self.coref_taggers.iter().map(|t| t.name()).collect(),
        }
    }

    /// Name of the tool a single-tool capability would run for `tools`.
    pub fn selected_tool(
        &self,
        capability: Capability,
        tools: &[&str],
        language: Language,
    ) -> Result<String> {
        let names: Vec<&str> = match capability {
            Capability::Actors => select(capability, &self.actor_taggers, tools, language, false)?
                .into_iter()
                .map(|t| t.name())
                .collect(),
            Capability::Times => select(capability, &self.time_taggers, tools, language, false)?
                .into_iter()
                .map(|t| t.name())
                .collect(),
            Capability::SemanticRoles => {
                select(capability, &self.srl_taggers, tools, language, false)?
                    .into_iter()
                    .map(|t| t.name())
                    .collect()
            }
            Capability::Coreference => {
                select(capability, &self.coref_taggers, tools, language, false)?
                    .into_iter()
                    .map(|t| t.name())
                    .collect()
            }
        };
        Ok(names[0].to_string())
    }

    /// Run the requested actor taggers, chunk their tokens and reconcile.
    pub fn extract_actors(
        &self,
        text: &str,
        language: Language,
        tools: &[&str],
        reconciler: &Reconciler,
    ) -> Result<Reconciliation> {
        let taggers = select(Capability::Actors, &self.actor_taggers, tools, language, true)?;
        let mut sources = Vec::with_capacity(taggers.len());
        for tagger in taggers {
            let tokens = tagger.annotate_tokens(text, language)?;
            let mut candidates = chunk_actors(&tokens);
            candidates.sort_by_key(|c| c.span.start);
            log::debug!(
                "[Annotator] {} produced {} actor candidates",
                tagger.name(),
                candidates.len()
            );
            sources.push(candidates);
        }
        Ok(reconciler.reconcile(&sources)?)
    }

    /// Run the first requested time tagger.
    pub fn extract_times(
        &self,
        text: &str,
        language: Language,
        publication_time: Option<&str>,
        tools: &[&str],
    ) -> Result<Vec<TimeCandidate>> {
        let tagger = select(Capability::Times, &self.time_taggers, tools, language, false)?[0];
        tagger.extract_times(text, language, publication_time)
    }

    /// Run the first requested semantic-role labeler.
    ///
    /// Returns the name of the tool that ran with its frames.
    pub fn label_sentences(
        &self,
        text: &str,
        language: Language,
        tools: &[&str],
    ) -> Result<(String, Vec<TagFrame>)> {
        let tagger = select(
            Capability::SemanticRoles,
            &self.srl_taggers,
            tools,
            language,
            false,
        )?[0];
        let frames = tagger.label_sentences(text, language)?;
        Ok((tagger.name().to_string(), frames))
    }

    /// Run the first requested coreference resolver.
    pub fn resolve_coreference(
        &self,
        text: &str,
        language: Language,
        tools: &[&str],
    ) -> Result<CorefOutput> {
        let tagger = select(
            Capability::Coreference,
            &self.coref_taggers,
            tools,
            language,
            false,
        )?[0];
        tagger.resolve(text, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::{ActorType, LexicalHead};

    struct FixedNer {
        name: &'static str,
        tokens: Vec<TokenAnnotation>,
        english_only: bool,
    }

    impl Tagger for FixedNer {
        fn name(&self) -> &str {
            self.name
        }

        fn supports(&self, language: Language) -> bool {
            !self.english_only || language == Language::English
        }
    }

    impl ActorTagger for FixedNer {
        fn annotate_tokens(&self, _: &str, _: Language) -> Result<Vec<TokenAnnotation>> {
            Ok(self.tokens.clone())
        }
    }

    fn tok(start: usize, end: usize, ne: &str) -> TokenAnnotation {
        TokenAnnotation::new(Span::new(start, end).unwrap(), "PROPN", ne)
    }

    fn annotator() -> Annotator {
        Annotator::new()
            .with_actor_tagger(FixedNer {
                name: "a",
                tokens: vec![tok(0, 5, "B-MISC")],
                english_only: false,
            })
            .with_actor_tagger(FixedNer {
                name: "b",
                tokens: vec![tok(0, 5, "B-PER")],
                english_only: true,
            })
    }

    #[test]
    fn all_actor_tools_by_default() {
        let merged = annotator()
            .extract_actors("Maria", Language::English, &[], &Reconciler::new())
            .unwrap();
        assert_eq!(merged.entities.len(), 1);
        assert_eq!(merged.entities[0].actor_type, ActorType::Person);
        assert_eq!(merged.entities[0].lexical_head, LexicalHead::Noun);
    }

    #[test]
    fn requested_subset_only() {
        let merged = annotator()
            .extract_actors("Maria", Language::Portuguese, &["a"], &Reconciler::new())
            .unwrap();
        assert_eq!(merged.entities[0].actor_type, ActorType::Other);
    }

    #[test]
    fn unknown_tool_fails_closed() {
        let err = annotator()
            .extract_actors("Maria", Language::English, &["stanza"], &Reconciler::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedTool(_)));
    }

    #[test]
    fn unsupported_language_fails_closed() {
        let err = annotator()
            .extract_actors("Maria", Language::Portuguese, &["b"], &Reconciler::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(_)));
    }

    #[test]
    fn tools_listed_in_registration_order() {
        let annotator = annotator();
        assert_eq!(annotator.tool_names(Capability::Actors), vec!["a", "b"]);
        assert!(annotator.tool_names(Capability::Times).is_empty());
        let debug = format!("{annotator:?}");
        assert!(debug.contains(r#"actor_taggers: "a, b""#));
    }

    #[test]
    fn missing_capability_is_unsupported_tool() {
        let err = annotator()
            .extract_times("today", Language::English, None, &[])
            .unwrap_err();
        assert!(err.to_string().contains("no time tool registered"));
    }

    #[test]
    fn coref_clusters_projected_to_chars() {
        let out = CorefOutput {
            tokens: ["Maria", "said", "she", "won"].map(String::from).to_vec(),
            clusters: vec![vec![(0, 0), (2, 2)]],
        };
        let chars = out
            .char_clusters("Maria said she won", MissPolicy::Fail)
            .unwrap();
        assert_eq!(
            chars.clusters,
            vec![vec![Span::new(0, 5).unwrap(), Span::new(11, 14).unwrap()]]
        );
    }

    #[test]
    fn coref_mention_out_of_range_is_invalid_input() {
        let out = CorefOutput {
            tokens: vec!["Maria".into()],
            clusters: vec![vec![(0, 3)]],
        };
        let err = out.char_clusters("Maria", MissPolicy::Fail).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
