//! Topic categorization: message pairs → ordered semantic blocks.
//!
//! Two interchangeable implementations share the [`Categorizer`] contract:
//! - [`KeywordCategorizer`] scores each pair against fixed keyword lists,
//!   fully offline and deterministic.
//! - [`AiCategorizer`] asks a chat model for one label per pair.
//!
//! Both hand their assignments to [`assemble_blocks`], so block order, the
//! five-block cap, and id/metadata assignment never differ between them.
//! [`AnyCategorizer::from_config`] picks one from configuration.

mod ai;
mod blocks;
mod keywords;

use std::future::Future;

use chatblocks_shared::{
    AppConfig, MessagePair, OpenAiConfig, Result, SemanticBlock, ai_enabled, resolve_api_key,
};
use tracing::{debug, info};

pub use ai::AiCategorizer;
pub use blocks::{DISPLAY_ORDER, MAX_BLOCKS, assemble_blocks};
pub use keywords::{
    EVALUATION_ORDER, KeywordCategorizer, assign_category, categorize_pairs, keywords_for,
    score_pair,
};

// ---------------------------------------------------------------------------
// Categorizer contract
// ---------------------------------------------------------------------------

/// Assigns pairs to categories and groups them into blocks.
///
/// Implementations never return a partial block list: either every pair was
/// categorized (minus any dropped sixth category) or the call fails.
pub trait Categorizer: Send + Sync {
    /// Short name for logs and saved runs.
    fn name(&self) -> &'static str;

    /// Categorize `pairs` into at most [`MAX_BLOCKS`] non-empty blocks.
    fn categorize(
        &self,
        pairs: &[MessagePair],
    ) -> impl Future<Output = Result<Vec<SemanticBlock>>> + Send;
}

impl Categorizer for KeywordCategorizer {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn categorize(
        &self,
        pairs: &[MessagePair],
    ) -> impl Future<Output = Result<Vec<SemanticBlock>>> + Send {
        std::future::ready(Ok(categorize_pairs(pairs)))
    }
}

impl Categorizer for AiCategorizer {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn categorize(
        &self,
        pairs: &[MessagePair],
    ) -> impl Future<Output = Result<Vec<SemanticBlock>>> + Send {
        self.categorize_pairs(pairs)
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The categorizer chosen for a run.
#[derive(Debug)]
pub enum AnyCategorizer {
    Keyword(KeywordCategorizer),
    Ai(AiCategorizer),
}

impl AnyCategorizer {
    /// AI only when the switch is on and a key is present; keyword otherwise.
    pub fn select(use_ai: bool, api_key: Option<String>, openai: &OpenAiConfig) -> Result<Self> {
        match (use_ai, api_key) {
            (true, Some(key)) => {
                let categorizer = AiCategorizer::new(key, openai)?;
                info!(model = categorizer.model(), "using AI categorizer");
                Ok(Self::Ai(categorizer))
            }
            (use_ai, _) => {
                debug!(use_ai, "using keyword categorizer");
                Ok(Self::Keyword(KeywordCategorizer))
            }
        }
    }

    /// Select from the loaded config plus the `USE_AI` and API key env vars.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::select(ai_enabled(config), resolve_api_key(config), &config.openai)
    }
}

impl Categorizer for AnyCategorizer {
    fn name(&self) -> &'static str {
        match self {
            Self::Keyword(c) => c.name(),
            Self::Ai(c) => c.name(),
        }
    }

    fn categorize(
        &self,
        pairs: &[MessagePair],
    ) -> impl Future<Output = Result<Vec<SemanticBlock>>> + Send {
        async move {
            match self {
                Self::Keyword(c) => c.categorize(pairs).await,
                Self::Ai(c) => c.categorize(pairs).await,
            }
        }
    }
}
