//! Language-model categorizer.
//!
//! Sends every pair in one OpenAI-compatible chat-completions request and asks
//! for a JSON array of category labels, one per pair index. Labels outside the
//! six known categories fall back to `general`; block assembly is identical to
//! the keyword categorizer.
//!
//! There is no retry and no request timeout here. Callers that need bounded
//! latency wrap the call themselves.

use std::fmt;
use std::sync::LazyLock;

use chatblocks_shared::{
    BlockCategory, ChatBlocksError, MessagePair, OpenAiConfig, Result, SemanticBlock,
};
use regex::Regex;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::blocks::assemble_blocks;

/// User-Agent string for completion requests.
const USER_AGENT: &str = concat!("chatblocks/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body carried into an error message.
const ERROR_BODY_PREVIEW: usize = 200;

const SYSTEM_PROMPT: &str = "You categorize conversation message pairs into one of these categories: \
pricing_strategy, starting_price_points, competitor_analysis, sales_team, free_trial, general. \
Respond with a JSON array of category names, one per pair, in order. \
Example: [\"pricing_strategy\",\"starting_price_points\",\"competitor_analysis\"]";

/// Markdown code fences (```` ```json ```` / ```` ``` ````) wrapped around the JSON.
static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json?\s*|\s*```").expect("code fence regex"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// AiCategorizer
// ---------------------------------------------------------------------------

/// [`Categorizer`](crate::Categorizer) that delegates labelling to a chat model.
pub struct AiCategorizer {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    temperature: f32,
}

impl fmt::Debug for AiCategorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiCategorizer")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl AiCategorizer {
    /// Build a categorizer for the endpoint and model in `config`.
    pub fn new(api_key: impl Into<String>, config: &OpenAiConfig) -> Result<Self> {
        let endpoint = config.completions_url()?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ChatBlocksError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Model id sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model for one label per pair and assemble blocks from them.
    #[instrument(skip_all, fields(pairs = pairs.len(), model = %self.model))]
    pub async fn categorize_pairs(&self, pairs: &[MessagePair]) -> Result<Vec<SemanticBlock>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let content = self.complete(&build_prompt(pairs)).await?;
        let labels = parse_labels(&content)?;
        if labels.len() != pairs.len() {
            warn!(
                expected = pairs.len(),
                got = labels.len(),
                "label count mismatch, unlabelled pairs go to general"
            );
        }

        let blocks = assemble_blocks(
            pairs
                .iter()
                .enumerate()
                .map(|(i, pair)| (coerce_label(labels.get(i)), pair.clone())),
        );

        info!(blocks = blocks.len(), "pairs categorized by model");
        Ok(blocks)
    }

    /// Send one chat-completions request and return the reply text.
    async fn complete(&self, user_content: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: self.temperature,
        };

        debug!(endpoint = %self.endpoint, "sending completion request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatBlocksError::UpstreamUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            return Err(ChatBlocksError::UpstreamUnavailable(format!(
                "API error {status}: {preview}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            ChatBlocksError::MalformedResponse(format!("invalid completion body: {e}"))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ChatBlocksError::MalformedResponse("no response from AI".into()))
    }
}

// ---------------------------------------------------------------------------
// Prompt and reply helpers
// ---------------------------------------------------------------------------

/// `[i] User: ...\nAssistant: ...` blocks separated by blank lines.
fn build_prompt(pairs: &[MessagePair]) -> String {
    pairs
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "[{i}] User: {}\nAssistant: {}",
                p.user.content, p.assistant.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Strip code fences and decode the label list. A bare value counts as a
/// one-element list.
fn parse_labels(content: &str) -> Result<Vec<Value>> {
    let cleaned = CODE_FENCE_RE.replace_all(content, "");
    let value: Value = serde_json::from_str(cleaned.trim()).map_err(|e| {
        ChatBlocksError::MalformedResponse(format!("invalid AI response format: {e}"))
    })?;

    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

/// Known label → category; anything else (or nothing) → `General`.
fn coerce_label(label: Option<&Value>) -> BlockCategory {
    label
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or(BlockCategory::General)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> OpenAiConfig {
        OpenAiConfig {
            base_url: server.uri(),
            ..OpenAiConfig::default()
        }
    }

    fn completion(content: &str) -> Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    fn sample_pairs() -> Vec<MessagePair> {
        vec![
            MessagePair::new(0, "How should we price?", "Value-based."),
            MessagePair::new(1, "Who else sells this?", "Acme."),
            MessagePair::new(2, "Thanks!", "Anytime."),
        ]
    }

    async fn mount_reply(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[test]
    fn prompt_lists_pairs_by_index() {
        let prompt = build_prompt(&sample_pairs()[..2]);
        assert_eq!(
            prompt,
            "[0] User: How should we price?\nAssistant: Value-based.\n\n[1] User: Who else sells this?\nAssistant: Acme."
        );
    }

    #[test]
    fn labels_parse_from_fenced_json() {
        let labels = parse_labels("```json\n[\"general\", \"free_trial\"]\n```").unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(coerce_label(labels.get(1)), BlockCategory::FreeTrial);
    }

    #[test]
    fn bare_label_is_a_single_element_list() {
        let labels = parse_labels("\"sales_team\"").unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(coerce_label(labels.first()), BlockCategory::SalesTeam);
    }

    #[test]
    fn unparseable_labels_are_malformed() {
        let err = parse_labels("pricing_strategy, general").unwrap_err();
        assert!(matches!(err, ChatBlocksError::MalformedResponse(_)));
    }

    #[test]
    fn unknown_and_missing_labels_coerce_to_general() {
        assert_eq!(coerce_label(Some(&serde_json::json!("billing"))), BlockCategory::General);
        assert_eq!(coerce_label(Some(&serde_json::json!(3))), BlockCategory::General);
        assert_eq!(coerce_label(None), BlockCategory::General);
    }

    #[test]
    fn debug_output_hides_api_key() {
        let categorizer = AiCategorizer::new("sk-secret", &OpenAiConfig::default()).unwrap();
        assert!(!format!("{categorizer:?}").contains("sk-secret"));
    }

    #[tokio::test]
    async fn labels_from_model_drive_block_assembly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(serde_json::json!({ "model": "gpt-4o-mini" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r#"["pricing_strategy","competitor_analysis","not_a_category"]"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let categorizer = AiCategorizer::new("sk-test", &config_for(&server)).unwrap();
        let blocks = categorizer.categorize_pairs(&sample_pairs()).await.unwrap();

        let order: Vec<BlockCategory> = blocks.iter().map(|b| b.category).collect();
        assert_eq!(
            order,
            vec![
                BlockCategory::PricingStrategy,
                BlockCategory::CompetitorAnalysis,
                BlockCategory::General,
            ]
        );
        assert_eq!(blocks[2].messages[0].id, "pair-2");
        assert_eq!(blocks[2].id, "block-2");
    }

    #[tokio::test]
    async fn short_label_list_puts_rest_in_general() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            ResponseTemplate::new(200).set_body_json(completion(r#"["free_trial"]"#)),
        )
        .await;

        let categorizer = AiCategorizer::new("k", &config_for(&server)).unwrap();
        let blocks = categorizer.categorize_pairs(&sample_pairs()).await.unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].category, BlockCategory::FreeTrial);
        assert_eq!(blocks[1].category, BlockCategory::General);
        assert_eq!(blocks[1].messages.len(), 2);
    }

    #[tokio::test]
    async fn http_error_is_upstream_unavailable() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            ResponseTemplate::new(500).set_body_string("boom"),
        )
        .await;

        let categorizer = AiCategorizer::new("k", &config_for(&server)).unwrap();
        let err = categorizer.categorize_pairs(&sample_pairs()).await.unwrap_err();
        assert!(matches!(err, ChatBlocksError::UpstreamUnavailable(ref m) if m.contains("boom")));
    }

    #[tokio::test]
    async fn empty_content_is_malformed() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            ResponseTemplate::new(200).set_body_json(completion("   ")),
        )
        .await;

        let categorizer = AiCategorizer::new("k", &config_for(&server)).unwrap();
        let err = categorizer.categorize_pairs(&sample_pairs()).await.unwrap_err();
        assert!(matches!(err, ChatBlocksError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn missing_choices_is_malformed() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
        )
        .await;

        let categorizer = AiCategorizer::new("k", &config_for(&server)).unwrap();
        let err = categorizer.categorize_pairs(&sample_pairs()).await.unwrap_err();
        assert!(matches!(err, ChatBlocksError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn prose_reply_is_malformed() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            ResponseTemplate::new(200).set_body_json(completion("Sure! Here are the categories.")),
        )
        .await;

        let categorizer = AiCategorizer::new("k", &config_for(&server)).unwrap();
        let err = categorizer.categorize_pairs(&sample_pairs()).await.unwrap_err();
        assert!(matches!(err, ChatBlocksError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_upstream_unavailable() {
        let config = OpenAiConfig {
            base_url: "http://127.0.0.1:1".into(),
            ..OpenAiConfig::default()
        };
        let categorizer = AiCategorizer::new("k", &config).unwrap();
        let err = categorizer.categorize_pairs(&sample_pairs()).await.unwrap_err();
        assert!(matches!(err, ChatBlocksError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_input_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let categorizer = AiCategorizer::new("k", &config_for(&server)).unwrap();
        assert!(categorizer.categorize_pairs(&[]).await.unwrap().is_empty());
    }
}
