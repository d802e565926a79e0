//! Semantic-role grouping pipeline.
//!
//! ```text
//!   TagFrame (frames x tokens)
//!        │ prune untagged columns
//!        ▼
//!   TagNormalizer ──► one (tag, begin) per token
//!        │
//!        ├──► EventSegmenter ──► event flags
//!        ▼
//!   ActorSegmenter ──► actor{n} / event{n} per token
//!        │
//!        ▼
//!   SpanProjector ──► char spans
//!        │
//!        ▼
//!   ActorGrouper ──► ExtractedSpan per group (category + span + text)
//! ```
//!
//! Every stage except the projector is a pure function of its input. The
//! projector's cursor runs across all sentences of a document.

pub mod actors;
pub mod events;
pub mod grouper;
pub mod normalize;
pub mod tags;

pub use actors::{ActorSegmenter, GroupId};
pub use events::EventSegmenter;
pub use grouper::{modifier_category, ActorGrouper, SrlOutput, SrlStats};
pub use normalize::{NormalizedTag, Normalization, TagAmbiguity, TagNormalizer};
pub use tags::TagFrame;

use crate::offset::MissPolicy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Settings of the SRL grouping pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrlConfig {
    /// Tags that mark verb tokens
    pub verb_tags: Vec<String>,
    /// Gap tolerance between verbs of one event (`threshold - 1` tokens)
    pub event_threshold: usize,
    /// Drop tokens that are "O" in every frame before normalizing
    pub prune_untagged: bool,
    /// Abort the sentence on an unresolvable tag column
    pub strict_tags: bool,
    /// Behavior when a token cannot be located in the text
    pub on_projection_miss: MissPolicy,
}

impl Default for SrlConfig {
    fn default() -> Self {
        Self {
            verb_tags: vec!["B-V".into(), "I-V".into()],
            event_threshold: 3,
            prune_untagged: true,
            strict_tags: false,
            on_projection_miss: MissPolicy::Fail,
        }
    }
}

impl SrlConfig {
    /// Load from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::parse(format!("SRL config: {e}")))
    }

    /// Set the verb vocabulary.
    #[must_use]
    pub fn with_verb_tags(mut self, tags: Vec<String>) -> Self {
        self.verb_tags = tags;
        self
    }

    /// Set the event gap tolerance.
    #[must_use]
    pub fn with_event_threshold(mut self, threshold: usize) -> Self {
        self.event_threshold = threshold;
        self
    }

    /// Enable or disable untagged-column pruning.
    #[must_use]
    pub fn with_prune_untagged(mut self, prune: bool) -> Self {
        self.prune_untagged = prune;
        self
    }

    /// Enable or disable strict tag normalization.
    #[must_use]
    pub fn with_strict_tags(mut self, strict: bool) -> Self {
        self.strict_tags = strict;
        self
    }

    /// Set the projection miss policy.
    #[must_use]
    pub fn with_miss_policy(mut self, policy: MissPolicy) -> Self {
        self.on_projection_miss = policy;
        self
    }
}
