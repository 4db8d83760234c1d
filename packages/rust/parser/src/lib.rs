//! Conversation parser: pasted transcript text → ordered [`MessagePair`]s.
//!
//! Parsing is a two-phase decision:
//! 1. Split on role-prefixed lines (`User:`, `Assistant:`, `Q:`, `A:`, ...).
//! 2. Only if that yields no pairs, pair up blank-line separated paragraphs
//!    instead.
//!
//! Both phases draw pair ids from one counter, so ids are always
//! `pair-0, pair-1, ...` in transcript order.

mod paragraphs;
mod prefixed;

use chatblocks_shared::{ChatBlocksError, MessagePair, Result};
use tracing::{debug, instrument};

/// Longest trimmed input accepted, in characters.
pub const MAX_INPUT_CHARS: usize = 100_000;

/// Parse raw conversation text into user/assistant pairs.
///
/// Whitespace-only input yields an empty list. Input whose trimmed form is
/// longer than [`MAX_INPUT_CHARS`] is rejected with
/// [`ChatBlocksError::InputTooLarge`] before any parsing happens.
#[instrument(skip_all, fields(len = text.len()))]
pub fn parse_conversation(text: &str) -> Result<Vec<MessagePair>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let len = trimmed.chars().count();
    if len > MAX_INPUT_CHARS {
        return Err(ChatBlocksError::InputTooLarge {
            len,
            max: MAX_INPUT_CHARS,
        });
    }

    let normalized = normalize_line_endings(trimmed);
    let mut sink = PairSink::default();

    prefixed::split_by_prefixes(&normalized, &mut sink);
    if sink.is_empty() {
        debug!("prefix split found no pairs, falling back to blank-line pairing");
        paragraphs::split_by_blank_lines(&normalized, &mut sink);
    }

    debug!(pairs = sink.len(), "conversation parsed");
    Ok(sink.into_pairs())
}

/// Fold `\r\n` and lone `\r` into `\n`.
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// PairSink
// ---------------------------------------------------------------------------

/// Collects emitted pairs and owns the shared id counter.
#[derive(Debug, Default)]
pub(crate) struct PairSink {
    next_id: usize,
    pairs: Vec<MessagePair>,
}

impl PairSink {
    pub(crate) fn emit(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.pairs.push(MessagePair::new(self.next_id, user, assistant));
        self.next_id += 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub(crate) fn into_pairs(self) -> Vec<MessagePair> {
        self.pairs
    }
}
