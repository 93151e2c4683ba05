// OpenAI-compatible chat-completions engine.
//
// Works against any endpoint speaking the /chat/completions dialect
// (OpenAI, vLLM, LiteLLM proxies). The retrieval side is expected to live
// behind that endpoint; this adapter shapes the request with intent and
// keyword cues extracted from the question.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::AnswerEngine;
use crate::config::EngineConfig;
use crate::pipeline::{build_prompt, QuestionMetadata};
use crate::types::{PipelineError, PipelineResult};

pub struct OpenAiEngine {
    client: Client,
    base_url: String,
    api_key: String,
    temperature: f32,
}

// Request types

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

// Response types

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl AnswerEngine for OpenAiEngine {
    async fn generate(
        &self,
        question: &str,
        document_ids: &[String],
        model: &str,
    ) -> PipelineResult<String> {
        let metadata = QuestionMetadata::extract(question);
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: build_prompt(&metadata, document_ids),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: question.to_string(),
                },
            ],
            temperature: Some(self.temperature),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Engine(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::Engine(format!("reading response failed: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(PipelineError::Engine(format!("{status}: {message}")));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| PipelineError::Engine(format!("malformed response: {e}")))?;
        let answer = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        if answer.is_empty() {
            return Err(PipelineError::Engine("engine returned an empty answer".to_string()));
        }
        Ok(answer)
    }
}
