use crate::llm::{LlmError, TextGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

/// OpenAI-compatible chat completions endpoint.
pub struct RemoteLlmProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct PromptRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct PromptResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl RemoteLlmProvider {
    pub fn new(
        client: reqwest::Client,
        api_url: String,
        api_key: &str,
        model: &str,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            api_url,
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        }
    }
}

fn classify_status(status: u16, body: String) -> LlmError {
    if body.contains("content_filter") || body.contains("content_policy") {
        return LlmError::ContentBlocked(body);
    }
    LlmError::from_status(status, body)
}

fn parse_response(body: &str) -> Result<String, LlmError> {
    let prompt_response: PromptResponse =
        serde_json::from_str(body).map_err(|e| LlmError::ResponseError(e.to_string()))?;

    let Some(choice) = prompt_response.choices.into_iter().next() else {
        return Err(LlmError::ResponseError("No choices in response".to_string()));
    };

    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(LlmError::ContentBlocked(
            "completion stopped by content filter".to_string(),
        ));
    }

    Ok(choice.message.content.unwrap_or_default())
}

#[async_trait]
impl TextGenerator for RemoteLlmProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = PromptRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: 2000,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("API responded with status code: {}", status);
            return Err(classify_status(status.as_u16(), body));
        }

        parse_response(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_choice() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "SELECT 1"}, "finish_reason": "stop"}]
        });
        assert_eq!(parse_response(&body.to_string()).unwrap(), "SELECT 1");
    }

    #[test]
    fn test_parse_content_filter() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": null}, "finish_reason": "content_filter"}]
        });
        assert!(matches!(parse_response(&body.to_string()), Err(LlmError::ContentBlocked(_))));
    }

    #[test]
    fn test_parse_no_choices() {
        let body = serde_json::json!({"choices": []});
        assert!(matches!(parse_response(&body.to_string()), Err(LlmError::ResponseError(_))));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(classify_status(404, "no such model".into()), LlmError::NotFound(_)));
        assert!(matches!(classify_status(401, "bad key".into()), LlmError::PermissionDenied(_)));
        assert!(matches!(classify_status(429, "slow down".into()), LlmError::ResourceExhausted(_)));
        assert!(matches!(
            classify_status(400, r#"{"error":{"code":"content_filter"}}"#.into()),
            LlmError::ContentBlocked(_)
        ));
    }
}
