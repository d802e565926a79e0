//! Document-level extraction context.
//!
//! A [`Narrative`] owns everything that lives for one document: the text,
//! the entity [`Registry`], the SRL cache and the [`Diagnostics`]. Nothing
//! is shared across documents; drop the narrative and start a new one.
//!
//! ```text
//!   Annotator (external taggers)
//!        │
//!        ▼
//!   extract_actors ──────────────► T1..Tn      (reconciled across tools)
//!   extract_times ───────────────► Tn+1..      (same T counter)
//!   extract_events ──────────────► E1..        (EVENT spans from SRL)
//!   extract_objectal_links ──────► R..  objIdentity(Tx, Ty)
//!   extract_semantic_role_links ─► R..  semrole(Ex, Ty)
//! ```
//!
//! Linking stages reuse registered entities where the spans agree and
//! register new ones where they don't, so calling them after the entity
//! extractors gives the most connected graph.

use crate::lang::Language;
use crate::srl::{ActorGrouper, SrlConfig, SrlOutput};
use crate::tagger::{Annotator, Capability};
use crate::{Error, Result};
use fabula_coalesce::{ActorDefaults, KeyResolver, MatchMode, Reconciler};
use fabula_core::{Actor, EntityId, Event, Registry, RelationKind, Span, Time};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Settings for one document's extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// SRL grouping pipeline
    pub srl: SrlConfig,
    /// Cross-tool actor reconciliation
    pub reconciler: Reconciler,
}

impl NarrativeConfig {
    /// Load from JSON; missing fields take their defaults.
    ///
    /// ```
    /// use fabula::NarrativeConfig;
    ///
    /// let config = NarrativeConfig::from_json_str(r#"{"srl": {"event_threshold": 2}}"#).unwrap();
    /// assert_eq!(config.srl.event_threshold, 2);
    /// assert!(config.srl.prune_untagged);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::parse(format!("narrative config: {e}")))
    }

    /// Replace the SRL settings.
    #[must_use]
    pub fn with_srl(mut self, srl: SrlConfig) -> Self {
        self.srl = srl;
        self
    }

    /// Replace the reconciler.
    #[must_use]
    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }
}

/// Recoverable conditions met while processing a document.
///
/// None of these abort a run; they are counted so that a drop in output
/// quality can be traced back to its cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// SRL tag columns no tie-break rule resolved
    pub tag_ambiguities: usize,
    /// Tokens that could not be located in the text (skip policy only)
    pub projection_misses: usize,
    /// Merged actors discarded for lack of a noun/pronoun head
    pub reconcile_dropped_without_head: usize,
    /// Merged actors discarded for a non-actor type
    pub reconcile_dropped_by_type: usize,
    /// SRL sentences without frames
    pub frameless_sentences: usize,
    /// SRL sentences dropped by strict tag normalization
    pub rejected_sentences: usize,
}

impl Diagnostics {
    /// Total number of degraded items.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tag_ambiguities
            + self.projection_misses
            + self.reconcile_dropped_without_head
            + self.reconcile_dropped_by_type
            + self.frameless_sentences
            + self.rejected_sentences
    }
}

/// One document and the entities extracted from it.
#[derive(Debug)]
pub struct Narrative {
    language: Language,
    text: String,
    char_len: usize,
    publication_time: Option<String>,
    config: NarrativeConfig,
    registry: Registry,
    diagnostics: Diagnostics,
    resolver: KeyResolver,
    srl_cache: HashMap<String, Arc<SrlOutput>>,
}

impl Narrative {
    /// Start a document.
    pub fn new(language: Language, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            language,
            char_len: text.chars().count(),
            text,
            publication_time: None,
            config: NarrativeConfig::default(),
            registry: Registry::new(),
            diagnostics: Diagnostics::default(),
            resolver: KeyResolver::new(),
            srl_cache: HashMap::new(),
        }
    }

    /// Start a document from a language code (`en`, `pt`).
    pub fn with_language_code(code: &str, text: impl Into<String>) -> Result<Self> {
        Ok(Self::new(Language::from_code(code)?, text))
    }

    /// Anchor for relative temporal expressions (`YYYY-MM-DD`).
    #[must_use]
    pub fn with_publication_time(mut self, publication_time: impl Into<String>) -> Self {
        self.publication_time = Some(publication_time.into());
        self
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: NarrativeConfig) -> Self {
        self.config = config;
        self
    }

    /// Document language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Publication time, if set.
    pub fn publication_time(&self) -> Option<&str> {
        self.publication_time.as_deref()
    }

    /// Entities and relations extracted so far.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Consume the narrative, keeping the registry.
    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Recoverable conditions counted so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Extract actors with `tools` (all actor tools if empty) and register
    /// the reconciled result.
    ///
    /// Nothing is registered unless every span lies within the text.
    pub fn extract_actors(&mut self, annotator: &Annotator, tools: &[&str]) -> Result<Vec<EntityId>> {
        let merged =
            annotator.extract_actors(&self.text, self.language, tools, &self.config.reconciler)?;
        for candidate in &merged.entities {
            candidate.span.check_bounds(self.char_len)?;
        }
        self.diagnostics.reconcile_dropped_without_head += merged.dropped_without_head;
        self.diagnostics.reconcile_dropped_by_type += merged.dropped_by_type;

        let mut ids = Vec::with_capacity(merged.entities.len());
        for candidate in merged.entities {
            ids.push(self.registry.add_actor(Actor::new(
                candidate.span.slice(&self.text),
                candidate.span,
                candidate.lexical_head,
                candidate.actor_type,
            )));
        }
        log::info!("[Narrative] registered {} actors", ids.len());
        Ok(ids)
    }

    /// Extract temporal expressions with the first of `tools`.
    pub fn extract_times(&mut self, annotator: &Annotator, tools: &[&str]) -> Result<Vec<EntityId>> {
        let times = annotator.extract_times(
            &self.text,
            self.language,
            self.publication_time.as_deref(),
            tools,
        )?;
        for time in &times {
            time.span.check_bounds(self.char_len)?;
        }
        let mut ids = Vec::with_capacity(times.len());
        for time in times {
            ids.push(self.registry.add_time(Time::new(
                time.span.slice(&self.text),
                time.span,
                time.timex_type,
                time.value,
            )));
        }
        log::info!("[Narrative] registered {} times", ids.len());
        Ok(ids)
    }

    /// Register every EVENT span found by the SRL pipeline.
    pub fn extract_events(&mut self, annotator: &Annotator, tools: &[&str]) -> Result<Vec<EntityId>> {
        let srl = self.srl(annotator, tools)?;
        let ids: Vec<EntityId> = srl
            .events()
            .map(|e| self.registry.add_event(Event::new(e.text.clone(), e.span)))
            .collect();
        log::info!("[Narrative] registered {} events", ids.len());
        Ok(ids)
    }

    /// Link consecutive mentions of each coreference cluster.
    ///
    /// Mentions are looked up by exact span; unmatched mentions become new
    /// `Pronoun`/`Other` actors.
    pub fn extract_objectal_links(
        &mut self,
        annotator: &Annotator,
        tools: &[&str],
    ) -> Result<Vec<EntityId>> {
        let output = annotator.resolve_coreference(&self.text, self.language, tools)?;
        let projected = output.char_clusters(&self.text, self.config.srl.on_projection_miss)?;
        self.diagnostics.projection_misses += projected.projection_misses;

        let defaults = ActorDefaults::pronoun();
        let mut links = Vec::new();
        for cluster in &projected.clusters {
            for pair in cluster.windows(2) {
                let arg1 = self.resolve_actor(pair[0], MatchMode::Exact, &defaults)?;
                let arg2 = self.resolve_actor(pair[1], MatchMode::Exact, &defaults)?;
                links.push(
                    self.registry
                        .add_relation(RelationKind::ObjIdentity, arg1, arg2)?,
                );
            }
        }
        log::info!("[Narrative] registered {} objectal links", links.len());
        Ok(links)
    }

    /// Link events to their neighbouring arguments, sentence by sentence.
    ///
    /// Events resolve by exact then partial span, arguments by partial span;
    /// anything unmatched is registered (`Noun`/`Other` for arguments). Each
    /// adjacent pair holding exactly one event yields a semantic-role link
    /// from the event to the argument, labelled with the argument's category.
    pub fn extract_semantic_role_links(
        &mut self,
        annotator: &Annotator,
        tools: &[&str],
    ) -> Result<Vec<EntityId>> {
        let srl = self.srl(annotator, tools)?;
        let defaults = ActorDefaults::noun();
        let mut links = Vec::new();

        for sentence in &srl.sentences {
            let mut keys = Vec::with_capacity(sentence.len());
            for span in sentence {
                let key = if span.category.is_event() {
                    self.resolver
                        .resolve_event(
                            &mut self.registry,
                            &self.text,
                            span.span,
                            &[MatchMode::Exact, MatchMode::Partial],
                        )
                        .id
                } else {
                    self.resolve_actor(span.span, MatchMode::Partial, &defaults)?
                };
                keys.push(key);
            }

            for (i, pair) in sentence.windows(2).enumerate() {
                let (event, argument) = match (pair[0].category.is_event(), pair[1].category.is_event()) {
                    (true, false) => (keys[i], i + 1),
                    (false, true) => (keys[i + 1], i),
                    _ => continue,
                };
                let role = sentence[argument].category;
                links.push(self.registry.add_relation(
                    RelationKind::SemanticRole(role),
                    event,
                    keys[argument],
                )?);
            }
        }
        log::info!("[Narrative] registered {} semantic role links", links.len());
        Ok(links)
    }

    fn resolve_actor(
        &mut self,
        span: Span,
        mode: MatchMode,
        defaults: &ActorDefaults,
    ) -> Result<EntityId> {
        span.check_bounds(self.char_len)?;
        Ok(self
            .resolver
            .resolve_actor(&mut self.registry, &self.text, span, &[mode], defaults)
            .id)
    }

    /// SRL output for the selected tool, computed once per document.
    fn srl(&mut self, annotator: &Annotator, tools: &[&str]) -> Result<Arc<SrlOutput>> {
        let tool = annotator.selected_tool(Capability::SemanticRoles, tools, self.language)?;
        if let Some(cached) = self.srl_cache.get(&tool) {
            log::debug!("[Narrative] reusing SRL output of {tool}");
            return Ok(Arc::clone(cached));
        }

        let (_, frames) = annotator.label_sentences(&self.text, self.language, &[tool.as_str()])?;
        let output = ActorGrouper::new(self.config.srl.clone()).group_document(&self.text, &frames)?;
        self.diagnostics.tag_ambiguities += output.stats.tag_ambiguities;
        self.diagnostics.projection_misses += output.stats.projection_misses;
        self.diagnostics.frameless_sentences += output.stats.frameless_sentences;
        self.diagnostics.rejected_sentences += output.stats.rejected_sentences;

        let output = Arc::new(output);
        self.srl_cache.insert(tool, Arc::clone(&output));
        Ok(output)
    }
}
