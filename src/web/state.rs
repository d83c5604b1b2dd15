use crate::config::AppConfig;
use crate::convert::QueryConverter;
use crate::llm::LlmManager;
use crate::session::SessionStore;
use crate::web::templates::init_templates;
use minijinja::Environment;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub template_env: Environment<'static>,
    pub llm_manager: LlmManager,
    pub converter: QueryConverter,
    pub sessions: SessionStore,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, llm_manager: LlmManager) -> Self {
        let converter = QueryConverter::new(&config.conversion);
        let sessions = SessionStore::new(&config.session);

        Self {
            config,
            template_env: init_templates(),
            llm_manager,
            converter,
            sessions,
            startup_time: chrono::Utc::now(),
        }
    }
}
