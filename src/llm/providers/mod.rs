pub mod gemini;
pub mod remote;

use crate::config::LlmConfig;
use crate::llm::{GeneratorFactory, LlmError, TextGenerator};
use std::sync::Arc;
use std::time::Duration;

/// Builds provider clients for each candidate model of the configured backend.
pub struct ProviderFactory {
    backend: Backend,
    client: reqwest::Client,
    api_key: String,
    api_url: Option<String>,
    candidates: Vec<String>,
    temperature: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Backend {
    Gemini,
    Remote,
}

impl ProviderFactory {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let backend = match config.backend.as_str() {
            "gemini" => Backend::Gemini,
            "remote" => Backend::Remote,
            _ => {
                return Err(LlmError::ConfigError(format!(
                    "Unsupported LLM backend: {}",
                    config.backend
                )))
            }
        };

        if backend == Backend::Remote && config.api_url.is_none() {
            return Err(LlmError::ConfigError(
                "API URL is required for remote LLM provider".to_string(),
            ));
        }

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                LlmError::ConfigError(format!(
                    "{} not found in environment variables. Please set your API key.",
                    config.api_key_env
                ))
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        Ok(Self {
            backend,
            client,
            api_key,
            api_url: config.api_url.clone(),
            candidates: config.candidate_models.clone(),
            temperature: config.temperature,
        })
    }
}

impl GeneratorFactory for ProviderFactory {
    fn candidate_models(&self) -> Vec<String> {
        self.candidates.clone()
    }

    fn connect(&self, model: &str) -> Result<Arc<dyn TextGenerator>, LlmError> {
        let generator: Arc<dyn TextGenerator> = match self.backend {
            Backend::Gemini => Arc::new(gemini::GeminiProvider::new(
                self.client.clone(),
                self.api_url.as_deref(),
                &self.api_key,
                model,
                self.temperature,
            )),
            Backend::Remote => {
                let api_url = self.api_url.clone().ok_or_else(|| {
                    LlmError::ConfigError("API URL is required for remote LLM provider".to_string())
                })?;
                Arc::new(remote::RemoteLlmProvider::new(
                    self.client.clone(),
                    api_url,
                    &self.api_key,
                    model,
                    self.temperature,
                ))
            }
        };

        Ok(generator)
    }
}
