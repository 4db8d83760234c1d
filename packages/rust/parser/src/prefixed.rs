//! Primary strategy: split on lines that open with a role prefix.
//!
//! A prefixed line starts a new segment; anything else stays attached to the
//! segment above it. Segments are then folded into pairs with a pending
//! user/assistant buffer.

use std::mem;
use std::sync::LazyLock;

use regex::Regex;

use crate::PairSink;

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// `User:`, `Human:`, `Q:`, `Question:` (ASCII or fullwidth colon).
static USER_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:User|Human|Q|Question)\s*[:：]\s*").expect("user prefix regex")
});

/// `Assistant:`, `AI:`, `Bot:`, `A:` (ASCII or fullwidth colon).
static ASSISTANT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Assistant|AI|Bot|A)\s*[:：]\s*").expect("assistant prefix regex")
});

/// Either role, used to find segment boundaries.
static ANY_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:User|Human|Q|Question|Assistant|AI|Bot|A)\s*[:：]")
        .expect("role prefix regex")
});

/// How a trimmed segment opens.
enum Segment<'a> {
    User(String),
    Assistant(String),
    Plain(&'a str),
}

impl<'a> Segment<'a> {
    fn classify(line: &'a str) -> Self {
        if USER_PREFIX_RE.is_match(line) {
            Self::User(strip_prefix(&USER_PREFIX_RE, line))
        } else if ASSISTANT_PREFIX_RE.is_match(line) {
            Self::Assistant(strip_prefix(&ASSISTANT_PREFIX_RE, line))
        } else {
            Self::Plain(line)
        }
    }
}

fn strip_prefix(re: &Regex, line: &str) -> String {
    re.replace(line, "").trim().to_string()
}

/// Cut normalized text into segments, each starting at a role-prefixed line.
///
/// The first line always opens the first segment, prefixed or not.
fn split_segments(normalized: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for (i, line) in normalized.split('\n').enumerate() {
        if i == 0 {
            current.push_str(line);
        } else if ANY_PREFIX_RE.is_match(line) {
            segments.push(mem::replace(&mut current, line.to_string()));
        } else {
            current.push('\n');
            current.push_str(line);
        }
    }
    segments.push(current);

    segments
}

/// Fold prefixed segments into pairs.
///
/// Emits nothing when no segment carries a role prefix, so unprefixed text is
/// left to the blank-line fallback.
pub(crate) fn split_by_prefixes(normalized: &str, sink: &mut PairSink) {
    let segments = split_segments(normalized);
    let classified: Vec<Segment<'_>> = segments
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(Segment::classify)
        .collect();

    if classified.iter().all(|s| matches!(s, Segment::Plain(_))) {
        return;
    }

    let mut user = String::new();
    let mut assistant = String::new();

    for segment in classified {
        match segment {
            Segment::User(text) => {
                // A user turn with no answer yet is closed by the next question.
                if !user.is_empty() {
                    sink.emit(mem::take(&mut user), mem::take(&mut assistant));
                }
                user = text;
            }
            Segment::Assistant(text) => {
                assistant = text;
                if !user.is_empty() {
                    sink.emit(mem::take(&mut user), mem::take(&mut assistant));
                }
            }
            Segment::Plain(text) => {
                if user.is_empty() {
                    user = text.to_string();
                } else if assistant.is_empty() {
                    assistant = text.to_string();
                } else {
                    assistant.push('\n');
                    assistant.push_str(text);
                }
            }
        }
    }

    if !user.is_empty() {
        sink.emit(user, assistant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatblocks_shared::MessagePair;

    fn run(text: &str) -> Vec<MessagePair> {
        let mut sink = PairSink::default();
        split_by_prefixes(text, &mut sink);
        sink.into_pairs()
    }

    fn contents(pairs: &[MessagePair]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|p| (p.user.content.clone(), p.assistant.content.clone()))
            .collect()
    }

    fn pair(u: &str, a: &str) -> (String, String) {
        (u.to_string(), a.to_string())
    }

    #[test]
    fn segments_start_at_prefixed_lines() {
        let segments = split_segments("User: hi\nmore\nAssistant: yo\nAI: again");
        assert_eq!(segments, vec!["User: hi\nmore", "Assistant: yo", "AI: again"]);
    }

    #[test]
    fn prefix_must_open_the_line() {
        let segments = split_segments("User: hi\n  Assistant: indented\nsaid User: inline");
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn multi_turn_with_continuation_lines() {
        let pairs = run(
            "User: Hi\nAssistant: Hello\nUser: Pricing?\nAssistant: Tiered.\nMore detail.\n\nEven more.",
        );
        assert_eq!(
            contents(&pairs),
            vec![
                pair("Hi", "Hello"),
                pair("Pricing?", "Tiered.\nMore detail.\n\nEven more."),
            ]
        );
    }

    #[test]
    fn all_prefix_spellings_recognized() {
        let pairs = run("Human: a\nAI: b\nQuestion: c\nBot: d\nQ: e\nA: f\nUser: g\nAssistant: h");
        assert_eq!(
            contents(&pairs),
            vec![pair("a", "b"), pair("c", "d"), pair("e", "f"), pair("g", "h")]
        );
    }

    #[test]
    fn prefixes_are_case_insensitive_and_accept_fullwidth_colon() {
        let pairs = run("user：hi there\nASSISTANT ： hello\nq: x\nbOt:y");
        assert_eq!(contents(&pairs), vec![pair("hi there", "hello"), pair("x", "y")]);
    }

    #[test]
    fn consecutive_user_lines_emit_unanswered_pair() {
        let pairs = run("User: one\nUser: two\nAssistant: reply");
        assert_eq!(contents(&pairs), vec![pair("one", ""), pair("two", "reply")]);
    }

    #[test]
    fn trailing_user_without_answer_still_emitted() {
        let pairs = run("User: a\nAssistant: b\nUser: c");
        assert_eq!(contents(&pairs), vec![pair("a", "b"), pair("c", "")]);
    }

    #[test]
    fn leading_assistant_turn_never_becomes_a_pair() {
        let pairs = run("Assistant: welcome\nUser: q\nAssistant: r");
        assert_eq!(contents(&pairs), vec![pair("q", "r")]);

        // Prefixed but unanswerable: nothing here, the caller falls back.
        assert!(run("Assistant: only me").is_empty());
    }

    #[test]
    fn leading_unprefixed_text_becomes_a_user_turn() {
        let pairs = run("Some intro\nUser: q\nAssistant: r");
        assert_eq!(contents(&pairs), vec![pair("Some intro", ""), pair("q", "r")]);
    }

    #[test]
    fn empty_prefixed_user_line_is_not_pending() {
        let pairs = run("User:\nAssistant: orphan\nUser: real\nAssistant: answer");
        assert_eq!(contents(&pairs), vec![pair("real", "answer")]);
    }

    #[test]
    fn words_that_merely_start_like_prefixes_are_plain() {
        assert!(run("Assume nothing\nQuick note\nAim high").is_empty());
    }

    #[test]
    fn no_prefixes_emits_nothing() {
        assert!(run("just text\n\nmore text").is_empty());
    }
}
