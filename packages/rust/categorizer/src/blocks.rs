//! Block assembly shared by every categorizer.

use std::collections::HashMap;

use chatblocks_shared::{BlockCategory, MessagePair, SemanticBlock};
use tracing::warn;

/// Order blocks are emitted in.
pub const DISPLAY_ORDER: [BlockCategory; 6] = [
    BlockCategory::PricingStrategy,
    BlockCategory::StartingPricePoints,
    BlockCategory::CompetitorAnalysis,
    BlockCategory::FreeTrial,
    BlockCategory::SalesTeam,
    BlockCategory::General,
];

/// Most blocks a single run emits.
pub const MAX_BLOCKS: usize = 5;

/// Group `(category, pair)` assignments into ordered blocks.
///
/// Pairs keep their input order within each block. Empty categories are
/// skipped, and once [`MAX_BLOCKS`] blocks exist any remaining non-empty
/// category is dropped (logged at `warn`). Block ids are `block-0`,
/// `block-1`, ... in emission order.
pub fn assemble_blocks<I>(assignments: I) -> Vec<SemanticBlock>
where
    I: IntoIterator<Item = (BlockCategory, MessagePair)>,
{
    let mut groups: HashMap<BlockCategory, Vec<MessagePair>> = HashMap::new();
    for (category, pair) in assignments {
        groups.entry(category).or_default().push(pair);
    }

    let mut blocks = Vec::with_capacity(groups.len().min(MAX_BLOCKS));
    for category in DISPLAY_ORDER {
        let Some(messages) = groups.remove(&category) else {
            continue;
        };

        if blocks.len() >= MAX_BLOCKS {
            warn!(
                %category,
                pairs = messages.len(),
                "block limit reached, dropping category"
            );
            continue;
        }

        blocks.push(SemanticBlock::new(blocks.len(), category, messages));
    }

    blocks
}
