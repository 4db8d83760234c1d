//! Local keyword-scoring categorizer.
//!
//! Each pair is scored against every non-general category over the
//! lower-cased `"<user> <assistant>"` text:
//! - `+1.0` per keyword found anywhere as a substring,
//! - `+0.5` more when that keyword is space-delimited (`" kw "`) or opens the
//!   text (`"kw "`).
//!
//! A keyword that closes the text without trailing whitespace gets no bonus.

use chatblocks_shared::{BlockCategory, MessagePair, SemanticBlock};

use crate::blocks::assemble_blocks;

/// Scoring order. Earlier categories win exact ties, so the narrower
/// price-point category sits ahead of general pricing strategy.
pub const EVALUATION_ORDER: [BlockCategory; 5] = [
    BlockCategory::StartingPricePoints,
    BlockCategory::PricingStrategy,
    BlockCategory::CompetitorAnalysis,
    BlockCategory::SalesTeam,
    BlockCategory::FreeTrial,
];

/// Keyword list for a category. `General` has none.
pub fn keywords_for(category: BlockCategory) -> &'static [&'static str] {
    match category {
        BlockCategory::PricingStrategy => &[
            "pricing strategy",
            "value-based pricing",
            "pricing model",
            "pricing models",
            "tiers",
            "tiered pricing",
            "plans",
            "plan structure",
            "pricing tiers",
            "monetization",
        ],
        BlockCategory::StartingPricePoints => &[
            "starting price",
            "starting prices",
            "price point",
            "price points",
            "$",
            "/month",
            "per month",
            "range from",
            "range between",
            "29/month",
            "99/month",
            "ltv:cac",
            "ltv:cac ratio",
        ],
        BlockCategory::CompetitorAnalysis => &[
            "competitor",
            "competition",
            "market",
            "similar",
            "analysis",
            "compare",
            "vs",
            "alternative",
            "benchmark",
        ],
        BlockCategory::SalesTeam => &[
            "sales",
            "hire",
            "team",
            "account executive",
            "sdr",
            "bdr",
            "rep",
            "quota",
            "commission",
        ],
        BlockCategory::FreeTrial => &["trial", "freemium", "free", "demo", "onboarding", "signup"],
        BlockCategory::General => &[],
    }
}

/// Score one pair against one category.
pub fn score_pair(pair: &MessagePair, category: BlockCategory) -> f64 {
    let keywords = keywords_for(category);
    if keywords.is_empty() {
        return 0.0;
    }

    let text = format!("{} {}", pair.user.content, pair.assistant.content).to_lowercase();
    score_text(&text, keywords)
}

fn score_text(text: &str, keywords: &[&str]) -> f64 {
    keywords
        .iter()
        .filter(|kw| text.contains(**kw))
        .map(|kw| if has_boundary(text, kw) { 1.5 } else { 1.0 })
        .sum()
}

/// Coarse word-boundary check: `" kw "` anywhere, or `"kw "` at the start.
fn has_boundary(text: &str, keyword: &str) -> bool {
    text.contains(&format!(" {keyword} ")) || text.starts_with(&format!("{keyword} "))
}

/// Pick the best-scoring category; `General` when nothing scores above zero.
///
/// Only a strictly greater score replaces the current best.
pub fn assign_category(pair: &MessagePair) -> BlockCategory {
    let mut best = BlockCategory::General;
    let mut best_score = 0.0;

    for category in EVALUATION_ORDER {
        let score = score_pair(pair, category);
        if score > best_score {
            best_score = score;
            best = category;
        }
    }

    best
}

/// Categorize pairs locally and assemble them into blocks.
pub fn categorize_pairs(pairs: &[MessagePair]) -> Vec<SemanticBlock> {
    assemble_blocks(
        pairs
            .iter()
            .map(|pair| (assign_category(pair), pair.clone())),
    )
}

/// Deterministic, offline [`Categorizer`](crate::Categorizer).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordCategorizer;
