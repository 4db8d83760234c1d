//! Fallback strategy: alternate blank-line separated paragraphs as user/assistant.

use std::sync::LazyLock;

use regex::Regex;

use crate::PairSink;

/// Two or more consecutive newlines.
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("blank run regex"));

/// Pair paragraphs 0/1, 2/3, ... An odd trailing paragraph is emitted with an
/// empty assistant side.
pub(crate) fn split_by_blank_lines(normalized: &str, sink: &mut PairSink) {
    let paragraphs: Vec<&str> = BLANK_RUN_RE
        .split(normalized)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    for chunk in paragraphs.chunks(2) {
        let user = chunk[0];
        let assistant = chunk.get(1).copied().unwrap_or_default();
        sink.emit(user, assistant);
    }
}
