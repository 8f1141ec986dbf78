//! LLM node: chat-completions call with a mock fallback.
//!
//! Talks to an OpenAI-compatible endpoint configured through the process
//! environment (`OPENAI_BASE_URL`, `OPENAI_API_KEY`). Any failure — missing
//! key, transport error, non-2xx status, malformed body — substitutes a
//! clearly-marked mock response with zero usage and never fails the
//! workflow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::{number, output, text};
use crate::error::Result;
use crate::node::Node;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// External chat-completion call with mock fallback.
#[derive(Debug)]
pub struct LlmNode {
    id: String,
    client: reqwest::Client,
}

impl LlmNode {
    pub fn new(id: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            id: id.to_string(),
            client,
        }
    }

    async fn request_completion(
        &self,
        model: &str,
        prompt: &str,
        temperature: f64,
        max_tokens: u64,
    ) -> std::result::Result<(String, ChatUsage), String> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| "OPENAI_API_KEY environment variable not set".to_string())?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

        let body = ChatCompletionRequest {
            model,
            messages: vec![ChatCompletionMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens,
        };

        tracing::info!(node = %self.id, model, url = %url, "calling chat completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("service returned error status: {e}"))?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid response body: {e}"))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "response contained no choices".to_string())?;

        Ok((
            choice.message.content.unwrap_or_default(),
            completion.usage.unwrap_or_default(),
        ))
    }

    fn mock_output(model: &str) -> Map<String, Value> {
        output(json!({
            "text": format!(
                "[MOCK LLM RESPONSE] Based on the search results, here is the solution for your '{model}' query.\n\n(Real API call failed, this is a simulation.)"
            ),
            "usage": {"prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0},
            "model": model,
        }))
    }
}

#[async_trait]
impl Node for LlmNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, inputs: Map<String, Value>) -> Result<Map<String, Value>> {
        let model = text(&inputs, "model", DEFAULT_MODEL).to_string();
        let prompt = text(&inputs, "prompt", "").to_string();
        let temperature = number(&inputs, "temperature", 0.7);
        let max_tokens = number(&inputs, "max_tokens", 1000.0) as u64;

        match self
            .request_completion(&model, &prompt, temperature, max_tokens)
            .await
        {
            Ok((completion_text, usage)) => {
                tracing::info!(node = %self.id, total_tokens = usage.total_tokens, "completion received");
                Ok(output(json!({
                    "text": completion_text,
                    "usage": {
                        "prompt_tokens": usage.prompt_tokens,
                        "completion_tokens": usage.completion_tokens,
                        "total_tokens": usage.total_tokens,
                    },
                    "model": model,
                })))
            }
            Err(err) => {
                tracing::warn!(node = %self.id, error = %err, "LLM call failed, substituting mock response");
                Ok(Self::mock_output(&model))
            }
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage<'a>>,
    temperature: f64,
    max_tokens: u64,
}

#[derive(Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}
