//! Cliente del modelo de respuesta (API de mensajes de Anthropic).
//!
//! Una única operación: enviar el mensaje de grounding y devolver el texto
//! de la respuesta junto con los tokens consumidos. Las respuestas son
//! deterministas (temperature 0) porque el servicio responde sobre
//! documentos concretos, no conversación abierta.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::models::{Answer, TokenUsage};
use crate::prompt::GroundingMessage;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANSWER_TEMPERATURE: f32 = 0.0;

/// Abstracción del modelo de respuesta, para poder sustituirlo por un
/// doble en los tests.
#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, message: &GroundingMessage) -> Result<Answer>;
}

pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: &'a [GroundingMessage],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: UsageBlock,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageBlock {
    input_tokens: u64,
    output_tokens: u64,
}

impl AnthropicClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }
}

/// Primer bloque de texto de la respuesta, si lo hay.
fn first_text(content: Vec<ContentBlock>) -> Option<String> {
    content
        .into_iter()
        .find(|block| block.content_type == "text")
        .and_then(|block| block.text)
}

#[async_trait]
impl Answerer for AnthropicClient {
    async fn answer(&self, message: &GroundingMessage) -> Result<Answer> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: ANSWER_TEMPERATURE,
            messages: std::slice::from_ref(message),
        };

        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::UpstreamUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(RagError::UpstreamUnavailable(format!(
                "Anthropic API returned {status}: {detail}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| RagError::UpstreamUnavailable(format!("invalid response body: {e}")))?;

        let usage = TokenUsage::new(parsed.usage.input_tokens, parsed.usage.output_tokens);
        let text = first_text(parsed.content).ok_or_else(|| {
            RagError::UpstreamUnavailable("response contained no text block".to_string())
        })?;

        Ok(Answer { text, usage })
    }
}
