//! Case-insensitive block search.

use chatblocks_shared::SemanticBlock;

/// Whether `block` matches `query`.
///
/// A blank query matches everything. Otherwise the lower-cased query, taken
/// as-is including any surrounding spaces, must appear in the block title or
/// in any user or assistant message.
pub fn matches_search(block: &SemanticBlock, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }

    let needle = query.to_lowercase();
    let hit = |haystack: &str| haystack.to_lowercase().contains(&needle);

    hit(&block.title)
        || block
            .messages
            .iter()
            .any(|pair| hit(&pair.user.content) || hit(&pair.assistant.content))
}

/// Blocks matching `query`, in their original order.
pub fn filter_blocks<'a>(blocks: &'a [SemanticBlock], query: &str) -> Vec<&'a SemanticBlock> {
    blocks.iter().filter(|b| matches_search(b, query)).collect()
}
