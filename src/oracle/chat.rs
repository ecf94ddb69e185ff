//! OpenAI-compatible chat client answering every oracle contract.
//!
//! Classification and extraction calls ask for a small JSON object and parse
//! it leniently; generation calls return the message text as-is.

use super::{
    EdgeOracle, GenerationOracle, LanguagePair, MemoryOracle, OracleError, OracleResult,
    SegmentationOracle, TranslationRequest,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Where and how to reach one chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatEndpoint {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_completion_tokens: u32,
}

pub struct ChatOracle {
    client: Client,
    endpoint: ChatEndpoint,
}

impl ChatOracle {
    pub fn new(endpoint: ChatEndpoint) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    async fn complete(&self, prompt: String, json_answer: bool) -> OracleResult<String> {
        let mut body = json!({
            "model": self.endpoint.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_completion_tokens": self.endpoint.max_completion_tokens,
        });
        if json_answer {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let url = format!("{}/chat/completions", self.endpoint.base_url.trim_end_matches('/'));
        let mut request = self.client.post(url).json(&body);
        if let Some(key) = self.endpoint.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                OracleError::Unavailable(e.to_string())
            } else {
                OracleError::InvocationFailed(e.to_string())
            }
        })?;
        let response = response
            .error_for_status()
            .map_err(|e| OracleError::InvocationFailed(e.to_string()))?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(e.to_string()))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| OracleError::Parse("missing choices[0].message.content".to_string()))
    }
}

#[async_trait]
impl SegmentationOracle for ChatOracle {
    async fn continues_unit(&self, unit_text: &str, next_sentence: &str) -> OracleResult<bool> {
        let prompt = format!(
            "Decide whether the next sentence continues the same discourse unit as the text.\n\
             Text: {unit_text}\nNext sentence: {next_sentence}\n\
             Answer with JSON: {{\"decision\": true|false}}"
        );
        parse_decision(&self.complete(prompt, true).await?)
    }
}

#[async_trait]
impl EdgeOracle for ChatOracle {
    async fn depends_on(&self, earlier: &str, later: &str) -> OracleResult<bool> {
        let prompt = format!(
            "Decide whether understanding discourse 2 requires discourse 1.\n\
             Discourse 1: {earlier}\nDiscourse 2: {later}\n\
             Answer with JSON: {{\"decision\": true|false}}"
        );
        parse_decision(&self.complete(prompt, true).await?)
    }
}

#[async_trait]
impl MemoryOracle for ChatOracle {
    async fn entity_mapping(
        &self,
        source_text: &str,
        target_text: &str,
        languages: &LanguagePair,
    ) -> OracleResult<BTreeMap<String, String>> {
        let prompt = format!(
            "List the named entities and key terms of the {} text with their {} rendering \
             in the translation.\nSource: {source_text}\nTranslation: {target_text}\n\
             Answer with JSON: {{\"entity_map\": [{{\"source_term\": \"...\", \"target_term\": \"...\"}}]}}",
            languages.source, languages.target
        );
        parse_entity_map(&self.complete(prompt, true).await?)
    }

    async fn discourse_connective(
        &self,
        source_text: &str,
        target_text: &str,
        languages: &LanguagePair,
    ) -> OracleResult<Option<String>> {
        let prompt = format!(
            "Give the {} discourse connective that best links the translation to what follows, \
             or null.\nSource: {source_text}\nTranslation: {target_text}\n\
             Answer with JSON: {{\"connective\": \"...\" | null}}",
            languages.target
        );
        parse_connective(&self.complete(prompt, true).await?)
    }

    async fn context_summary(
        &self,
        source_text: &str,
        target_text: &str,
        languages: &LanguagePair,
    ) -> OracleResult<String> {
        let prompt = format!(
            "Summarize the passage in one {} sentence.\nSource: {source_text}\n\
             Translation: {target_text}\nAnswer with JSON: {{\"summary\": \"...\"}}",
            languages.target
        );
        parse_summary(&self.complete(prompt, true).await?)
    }
}

#[async_trait]
impl GenerationOracle for ChatOracle {
    async fn translate(&self, request: &TranslationRequest<'_>) -> OracleResult<String> {
        let mut prompt = format!(
            "Translate the following {} text into {}. Reply with the translation only.\n",
            request.languages.source, request.languages.target
        );
        if !request.memory.is_empty() {
            prompt.push_str(&format!("Context from earlier passages: {}\n", request.memory));
        }
        if let Some(terms) = request.terminology {
            prompt.push_str(&format!("Terminology: {terms}\n"));
        }
        if let Some(snippets) = request.retrieval {
            prompt.push_str(&format!("Reference material: {snippets}\n"));
        }
        prompt.push_str(&format!("Text: {}", request.source_text));
        self.complete(prompt, false).await
    }
}

/// Extract a JSON object from model output.
///
/// Candidates, in order: the whole text, the body of the first fenced
/// block, the span from the first `{` to the last `}`.
fn extract_json(text: &str) -> Option<Value> {
    let text = text.trim();
    let braced = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&text[start..=end]),
        _ => None,
    };
    std::iter::once(text)
        .chain(fenced_block(text))
        .chain(braced)
        .find_map(|candidate| {
            serde_json::from_str::<Value>(candidate.trim())
                .ok()
                .filter(Value::is_object)
        })
}

/// Body of the first ``` block, skipping its info string (e.g. `json`).
fn fenced_block(text: &str) -> Option<&str> {
    let after = &text[text.find("```")? + 3..];
    let body = &after[after.find('\n').map_or(0, |i| i + 1)..];
    body.find("```").map(|end| &body[..end])
}

fn parse_as<T: for<'de> Deserialize<'de>>(text: &str) -> OracleResult<T> {
    let value = extract_json(text).ok_or_else(|| {
        let preview: String = text.chars().take(200).collect();
        OracleError::Parse(format!("no JSON object in response: {preview}"))
    })?;
    serde_json::from_value(value).map_err(|e| OracleError::Parse(e.to_string()))
}

#[derive(Deserialize)]
struct DecisionAnswer {
    decision: bool,
}

#[derive(Deserialize)]
struct Entity {
    source_term: String,
    target_term: String,
}

#[derive(Deserialize)]
struct EntityMapAnswer {
    #[serde(default)]
    entity_map: Vec<Entity>,
}

#[derive(Deserialize)]
struct ConnectiveAnswer {
    #[serde(default)]
    connective: Option<String>,
}

#[derive(Deserialize)]
struct SummaryAnswer {
    #[serde(default)]
    summary: String,
}

fn parse_decision(text: &str) -> OracleResult<bool> {
    parse_as::<DecisionAnswer>(text).map(|a| a.decision)
}

fn parse_entity_map(text: &str) -> OracleResult<BTreeMap<String, String>> {
    let answer: EntityMapAnswer = parse_as(text)?;
    Ok(answer
        .entity_map
        .into_iter()
        .map(|e| (e.source_term.trim().to_string(), e.target_term.trim().to_string()))
        .filter(|(s, t)| !s.is_empty() && !t.is_empty())
        .collect())
}

fn parse_connective(text: &str) -> OracleResult<Option<String>> {
    let answer: ConnectiveAnswer = parse_as(text)?;
    Ok(answer
        .connective
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty()))
}

fn parse_summary(text: &str) -> OracleResult<String> {
    parse_as::<SummaryAnswer>(text).map(|a| a.summary.trim().to_string())
}
