use crate::llm::{LlmError, TextGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// Finish reasons Gemini uses when it refuses to produce text
const BLOCKED_FINISH_REASONS: [&str; 4] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize, Debug)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiProvider {
    pub fn new(
        client: reqwest::Client,
        api_url: Option<&str>,
        api_key: &str,
        model: &str,
        temperature: f32,
    ) -> Self {
        let base = api_url.unwrap_or(DEFAULT_API_URL).trim_end_matches('/');
        Self {
            client,
            endpoint: format!("{}/models/{}:generateContent", base, model),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Turns a non-success response into a typed failure, preferring the RPC status string.
pub fn classify_api_error(http_status: u16, body: &str) -> LlmError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return LlmError::from_status(http_status, body.to_string());
    };

    let message = envelope.error.message;
    match envelope.error.status.as_str() {
        "NOT_FOUND" => LlmError::NotFound(message),
        "PERMISSION_DENIED" | "UNAUTHENTICATED" => LlmError::PermissionDenied(message),
        "INVALID_ARGUMENT" | "FAILED_PRECONDITION" => LlmError::InvalidArgument(message),
        "RESOURCE_EXHAUSTED" => LlmError::ResourceExhausted(message),
        _ => LlmError::from_status(http_status, message),
    }
}

/// Pulls the generated text out of a successful response body.
pub fn parse_response(body: &str) -> Result<String, LlmError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::ResponseError(format!("Failed to parse Gemini response: {}", e)))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::ContentBlocked(format!("prompt blocked ({})", reason)));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(LlmError::ResponseError("No candidates in response".to_string()));
    };

    let text: String = candidate
        .content
        .unwrap_or_default()
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        if let Some(reason) = candidate.finish_reason {
            if BLOCKED_FINISH_REASONS.contains(&reason.as_str()) {
                return Err(LlmError::ContentBlocked(format!("response blocked ({})", reason)));
            }
        }
    }

    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!("Sending request to Gemini model {}", self.model);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Gemini API responded with status code: {}", status);
            return Err(classify_api_error(status.as_u16(), &body));
        }

        parse_response(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
