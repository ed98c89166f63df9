//! OpenAI adapter (classification + free-form chat completion).
//!
//! Two thin clients over the OpenAI HTTP API. Failures are logged with
//! the offending prompt escaped for log safety, then surfaced to the
//! caller; recovery is the caller's concern.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::error;

use ftb_core::formatting::escape_for_log;
use ftb_core::ports::{ClassifierPort, CompletionPort};
use ftb_core::{errors::Error, Result};

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/completions";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Chat model used for the free-form `/gpt` command.
const CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Delimiter the fine-tuned classifier was trained with; appended to
/// every prompt and used as the stop sequence.
const PROMPT_DELIMITER: &str = "\n\n###\n\n";
const STOP_SEQUENCE: &str = "###";

/// Token budget for a classification answer: a handful of short labels.
const CLASSIFY_MAX_TOKENS: u32 = 10;

#[derive(Clone, Debug)]
pub struct OpenAiClient {
    api_key: String,
    classifier_model: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, classifier_model: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client build");
        Self {
            api_key: api_key.into(),
            classifier_model: classifier_model.into(),
            http,
        }
    }

    async fn post_json(&self, url: &str, body: Value) -> Result<Value> {
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::External(format!("openai request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "openai call failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        resp.json()
            .await
            .map_err(|e| Error::External(format!("openai json error: {e}")))
    }
}

#[async_trait]
impl ClassifierPort for OpenAiClient {
    /// Classify a snippet with the fine-tuned model. The answer is raw
    /// label text; callers match labels by substring.
    async fn classify(&self, text: &str) -> Result<String> {
        let body = json!({
            "model": self.classifier_model,
            "prompt": format!("{text}{PROMPT_DELIMITER}"),
            "temperature": 0,
            "max_tokens": CLASSIFY_MAX_TOKENS,
            "top_p": 1,
            "frequency_penalty": 0,
            "presence_penalty": 0,
            "stop": [STOP_SEQUENCE],
        });

        let result = self
            .post_json(COMPLETIONS_URL, body)
            .await
            .and_then(|v| completion_text(&v));

        if let Err(e) = &result {
            error!(prompt = %escape_for_log(text), "classification failed: {e}");
        }
        result
    }
}

#[async_trait]
impl CompletionPort for OpenAiClient {
    /// Send a free-form prompt as a single user turn.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": CHAT_MODEL,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let result = self
            .post_json(CHAT_COMPLETIONS_URL, body)
            .await
            .and_then(|v| chat_text(&v));

        if let Err(e) = &result {
            error!(prompt = %escape_for_log(prompt), "completion failed: {e}");
        }
        result
    }
}

/// First completion's text from a completions response.
fn completion_text(v: &Value) -> Result<String> {
    v.pointer("/choices/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            Error::External("openai completion response missing choices[0].text".to_string())
        })
}

/// First choice's message content from a chat-completions response.
fn chat_text(v: &Value) -> Result<String> {
    v.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            Error::External(
                "openai chat response missing choices[0].message.content".to_string(),
            )
        })
}
