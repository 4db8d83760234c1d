//! End-to-end `organize` pipeline: transcript → pairs → semantic blocks.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use chatblocks_categorizer::Categorizer;
use chatblocks_shared::{ChatBlocksError, Result, SemanticBlock};

/// Result of the `organize` pipeline.
#[derive(Debug, Clone)]
pub struct OrganizeResult {
    /// Blocks in display order.
    pub blocks: Vec<SemanticBlock>,
    /// Number of pairs the parser produced.
    pub pair_count: usize,
    /// Pairs that belonged to a category dropped by the block cap.
    pub dropped_pairs: usize,
    /// Name of the categorizer that produced `blocks`.
    pub categorizer: &'static str,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &OrganizeResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &OrganizeResult) {}
}

/// Run the full `organize` pipeline.
///
/// 1. Parse the transcript into pairs
/// 2. Fail with [`ChatBlocksError::NoPairsFound`] when nothing parsed
/// 3. Categorize pairs into blocks
#[instrument(skip_all, fields(input_len = text.len(), categorizer = categorizer.name()))]
pub async fn organize<C: Categorizer>(
    text: &str,
    categorizer: &C,
    progress: &dyn ProgressReporter,
) -> Result<OrganizeResult> {
    let start = Instant::now();

    // --- Phase 1: Parse ---
    progress.phase("Parsing conversation");
    let pairs = chatblocks_parser::parse_conversation(text)?;
    if pairs.is_empty() {
        return Err(ChatBlocksError::NoPairsFound);
    }

    // --- Phase 2: Categorize ---
    progress.phase("Categorizing messages");
    let blocks = categorizer.categorize(&pairs).await?;

    let kept: usize = blocks.iter().map(|b| b.messages.len()).sum();
    let dropped_pairs = pairs.len().saturating_sub(kept);
    if dropped_pairs > 0 {
        warn!(dropped_pairs, "some pairs are not shown in any block");
    }

    let result = OrganizeResult {
        blocks,
        pair_count: pairs.len(),
        dropped_pairs,
        categorizer: categorizer.name(),
        elapsed: start.elapsed(),
    };

    info!(
        pairs = result.pair_count,
        blocks = result.blocks.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "organize pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}
