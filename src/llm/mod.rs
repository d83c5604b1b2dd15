pub mod prompt;
pub mod providers;

use crate::config::LlmConfig;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    #[error("content blocked: {0}")]
    ContentBlocked(String),
    #[error("LLM connection error: {0}")]
    ConnectionError(String),
    #[error("LLM response error: {0}")]
    ResponseError(String),
    #[error("LLM configuration error: {0}")]
    ConfigError(String),
    #[error("{0}")]
    NoModelAvailable(String),
}

impl LlmError {
    /// Maps a plain HTTP status onto the typed failures.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            404 => LlmError::NotFound(message),
            401 | 403 => LlmError::PermissionDenied(message),
            400 => LlmError::InvalidArgument(message),
            429 => LlmError::ResourceExhausted(message),
            _ => LlmError::ResponseError(format!("status {}: {}", status, message)),
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::ConnectionError(format!("request timed out: {}", e))
        } else if e.is_decode() {
            LlmError::ResponseError(e.to_string())
        } else {
            LlmError::ConnectionError(e.to_string())
        }
    }
}

/// A hosted model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

/// Source of candidate models for startup selection.
pub trait GeneratorFactory: Send + Sync {
    fn candidate_models(&self) -> Vec<String>;

    fn connect(&self, model: &str) -> Result<Arc<dyn TextGenerator>, LlmError>;
}

/// Tries each candidate in order and keeps the first one that answers the probe.
pub async fn select_model(
    factory: &dyn GeneratorFactory,
    probe_prompt: &str,
) -> Result<Arc<dyn TextGenerator>, LlmError> {
    let candidates = factory.candidate_models();
    if candidates.is_empty() {
        return Err(LlmError::NoModelAvailable(
            "No candidate models configured".to_string(),
        ));
    }

    for model in &candidates {
        let generator = match factory.connect(model) {
            Ok(generator) => generator,
            Err(e) => {
                warn!("Could not create client for {}: {}", model, e);
                continue;
            }
        };

        match generator.generate(probe_prompt).await {
            Ok(_) => {
                info!("Successfully connected to {}", model);
                return Ok(generator);
            }
            Err(LlmError::NotFound(msg)) => {
                debug!("Model {} not found: {}", model, msg);
            }
            Err(LlmError::PermissionDenied(msg)) => {
                error!("Permission denied for {}: {}", model, msg);
            }
            Err(e) => {
                warn!("Error with {}: {}", model, e);
            }
        }
    }

    Err(LlmError::NoModelAvailable(format!(
        "No available models found among {} candidates. Please check your API key and try again.",
        candidates.len()
    )))
}

/// Snapshot of the model connection, safe to hand to the UI.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelStatus {
    Uninitialized,
    Connected { model: String },
    Unavailable { reason: String },
}

impl ModelStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ModelStatus::Connected { .. })
    }
}

enum ModelState {
    Uninitialized,
    Connected(Arc<dyn TextGenerator>),
    Unavailable(String),
}

/// Holds the selected generator for the lifetime of the process.
///
/// Selection runs once, lazily. A failed selection stays failed until
/// [`LlmManager::reconnect`] is called.
pub struct LlmManager {
    config: LlmConfig,
    factory: Option<Arc<dyn GeneratorFactory>>,
    state: RwLock<ModelState>,
    connect_lock: Mutex<()>,
}

impl LlmManager {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            config: config.clone(),
            factory: None,
            state: RwLock::new(ModelState::Uninitialized),
            connect_lock: Mutex::new(()),
        }
    }

    pub fn with_factory(config: &LlmConfig, factory: Arc<dyn GeneratorFactory>) -> Self {
        Self {
            factory: Some(factory),
            ..Self::new(config)
        }
    }

    fn resolve_factory(&self) -> Result<Arc<dyn GeneratorFactory>, LlmError> {
        match &self.factory {
            Some(factory) => Ok(Arc::clone(factory)),
            None => Ok(Arc::new(providers::ProviderFactory::from_config(&self.config)?)),
        }
    }

    // Callers must hold `connect_lock`
    async fn connect_locked(&self) -> ModelStatus {
        let selected = match self.resolve_factory() {
            Ok(factory) => select_model(factory.as_ref(), &self.config.probe_prompt).await,
            Err(e) => Err(e),
        };

        let mut state = self.state.write().await;
        *state = match selected {
            Ok(generator) => ModelState::Connected(generator),
            Err(e) => {
                error!("Model initialization failed: {}", e);
                ModelState::Unavailable(e.to_string())
            }
        };

        Self::snapshot(&state)
    }

    /// Runs model selection again, replacing whatever was cached.
    pub async fn reconnect(&self) -> ModelStatus {
        let _guard = self.connect_lock.lock().await;
        info!("Connecting to {} backend", self.config.backend);
        self.connect_locked().await
    }

    /// Returns the cached generator, selecting one on first use.
    pub async fn generator(&self) -> Result<Arc<dyn TextGenerator>, LlmError> {
        if matches!(*self.state.read().await, ModelState::Uninitialized) {
            let _guard = self.connect_lock.lock().await;
            // Another caller may have finished selection while we waited
            if matches!(*self.state.read().await, ModelState::Uninitialized) {
                self.connect_locked().await;
            }
        }

        match &*self.state.read().await {
            ModelState::Connected(generator) => Ok(Arc::clone(generator)),
            ModelState::Unavailable(reason) => Err(LlmError::NoModelAvailable(reason.clone())),
            ModelState::Uninitialized => Err(LlmError::NoModelAvailable(
                "model not initialized".to_string(),
            )),
        }
    }

    pub async fn status(&self) -> ModelStatus {
        Self::snapshot(&*self.state.read().await)
    }

    fn snapshot(state: &ModelState) -> ModelStatus {
        match state {
            ModelState::Uninitialized => ModelStatus::Uninitialized,
            ModelState::Connected(generator) => ModelStatus::Connected {
                model: generator.model_name().to_string(),
            },
            ModelState::Unavailable(reason) => ModelStatus::Unavailable {
                reason: reason.clone(),
            },
        }
    }
}
