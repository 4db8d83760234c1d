//! Property tests for the conversation parser.

use chatblocks_parser::{MAX_INPUT_CHARS, parse_conversation};
use chatblocks_shared::ChatBlocksError;
use proptest::prelude::*;

fn sentence() -> impl Strategy<Value = String> {
    "[a-z]{1,10}( [a-z]{1,10}){0,5}[.?]?"
}

proptest! {
    #[test]
    fn prefixed_transcript_roundtrips(turns in prop::collection::vec((sentence(), sentence()), 1..8)) {
        let text: String = turns
            .iter()
            .map(|(u, a)| format!("User: {u}\nAssistant: {a}\n"))
            .collect();

        let pairs = parse_conversation(&text).unwrap();

        prop_assert_eq!(pairs.len(), turns.len());
        for (i, (pair, (u, a))) in pairs.iter().zip(&turns).enumerate() {
            prop_assert_eq!(&pair.user.content, u);
            prop_assert_eq!(&pair.assistant.content, a);
            prop_assert_eq!(&pair.id, &format!("pair-{i}"));
        }
    }

    #[test]
    fn whitespace_only_parses_to_nothing(text in "[ \t\r\n]{0,64}") {
        prop_assert!(parse_conversation(&text).unwrap().is_empty());
    }

    #[test]
    fn paragraphs_pair_up_in_order(paras in prop::collection::vec(sentence(), 1..9)) {
        let text = paras.join("\n\n");
        let pairs = parse_conversation(&text).unwrap();

        prop_assert_eq!(pairs.len(), paras.len().div_ceil(2));
        let flattened: Vec<&str> = pairs
            .iter()
            .flat_map(|p| [p.user.content.as_str(), p.assistant.content.as_str()])
            .filter(|s| !s.is_empty())
            .collect();
        let expected: Vec<&str> = paras.iter().map(String::as_str).collect();
        prop_assert_eq!(flattened, expected);
    }

    #[test]
    fn no_pair_has_empty_user_content(turns in prop::collection::vec(
        prop_oneof![
            sentence().prop_map(|s| format!("User: {s}")),
            sentence().prop_map(|s| format!("Assistant: {s}")),
            sentence(),
        ],
        1..12,
    )) {
        let text = turns.join("\n");
        for pair in parse_conversation(&text).unwrap() {
            prop_assert!(!pair.user.content.is_empty());
        }
    }
}

#[test]
fn oversized_input_fails_regardless_of_content() {
    for filler in ["x", "User: hi\n", "\u{3042}"] {
        let text = filler.repeat(MAX_INPUT_CHARS / filler.chars().count() + 1);
        assert!(matches!(
            parse_conversation(&text),
            Err(ChatBlocksError::InputTooLarge { .. })
        ));
    }
}
