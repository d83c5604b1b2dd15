use crate::config::ConversionConfig;
use crate::llm::prompt::build_prompt;
use crate::llm::{LlmError, TextGenerator};
use crate::sql::{clean_sql_query, validate_sql};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Questions mentioning any of these are refused before reaching the model.
pub const SENSITIVE_KEYWORDS: [&str; 5] = ["password", "credit_card", "ssn", "social security", "pin"];

/// A cleaned query that passed validation.
///
/// Only [`QueryConverter::convert`] creates these, which is what lets history
/// entries rely on never holding rejected output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedQuery {
    sql: String,
    model: String,
}

impl ConvertedQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Model that produced the query.
    pub fn model(&self) -> &str {
        &self.model
    }

    #[cfg(test)]
    pub(crate) fn for_tests(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            model: "mock-model".to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Query contains potentially sensitive keywords")]
    SensitiveKeyword,
    #[error("Query too long (max {max} characters)")]
    QueryTooLong { max: usize },
    #[error("AI model not initialized: {0}")]
    ModelUnavailable(String),
    #[error("Validation Error: {0}")]
    Validation(String),
    #[error("Prompt blocked for safety reasons")]
    ContentBlocked,
    #[error("Invalid prompt - {0}")]
    InvalidPrompt(String),
    #[error("API key rejected - {0}")]
    PermissionDenied(String),
    #[error("API quota exceeded - {0}")]
    QuotaExceeded(String),
    #[error("Error generating SQL query: {0}")]
    Generation(String),
}

impl ConversionError {
    /// Stable tag the UI switches on.
    pub fn category(&self) -> &'static str {
        match self {
            ConversionError::SensitiveKeyword => "sensitive_keyword",
            ConversionError::QueryTooLong { .. } => "query_too_long",
            ConversionError::ModelUnavailable(_) => "model_unavailable",
            ConversionError::Validation(_) => "validation",
            ConversionError::ContentBlocked => "content_blocked",
            ConversionError::InvalidPrompt(_) => "invalid_prompt",
            ConversionError::PermissionDenied(_) => "permission_denied",
            ConversionError::QuotaExceeded(_) => "quota_exceeded",
            ConversionError::Generation(_) => "generation",
        }
    }

    /// True when the question never left the process.
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            ConversionError::SensitiveKeyword | ConversionError::QueryTooLong { .. }
        )
    }
}

fn mentions_policy(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("policy") || lower.contains("safety")
}

impl From<LlmError> for ConversionError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::ContentBlocked(_) => ConversionError::ContentBlocked,
            LlmError::InvalidArgument(msg) if mentions_policy(&msg) => ConversionError::ContentBlocked,
            LlmError::InvalidArgument(msg) => ConversionError::InvalidPrompt(msg),
            LlmError::PermissionDenied(msg) => ConversionError::PermissionDenied(msg),
            LlmError::ResourceExhausted(msg) => ConversionError::QuotaExceeded(msg),
            LlmError::NoModelAvailable(msg) => ConversionError::ModelUnavailable(msg),
            other => {
                let msg = other.to_string();
                if mentions_policy(&msg) {
                    ConversionError::ContentBlocked
                } else {
                    ConversionError::Generation(msg)
                }
            }
        }
    }
}

pub struct QueryConverter {
    max_question_length: usize,
}

impl QueryConverter {
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            max_question_length: config.max_question_length,
        }
    }

    pub fn max_question_length(&self) -> usize {
        self.max_question_length
    }

    /// Checks run before anything is sent to the model.
    pub fn screen(&self, question: &str) -> Result<(), ConversionError> {
        let lower = question.to_lowercase();
        if SENSITIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return Err(ConversionError::SensitiveKeyword);
        }

        if question.chars().count() > self.max_question_length {
            return Err(ConversionError::QueryTooLong {
                max: self.max_question_length,
            });
        }

        Ok(())
    }

    /// Converts one question. The generator is called at most once and never retried.
    pub async fn convert(
        &self,
        question: &str,
        generator: &dyn TextGenerator,
    ) -> Result<ConvertedQuery, ConversionError> {
        if let Err(e) = self.screen(question) {
            info!("Question rejected before generation: {}", e.category());
            return Err(e);
        }

        let prompt = build_prompt(question);
        debug!("Prepared prompt for question: {}", question);

        let raw = generator.generate(&prompt).await.map_err(|e| {
            warn!("Generation failed on {}: {}", generator.model_name(), e);
            ConversionError::from(e)
        })?;
        debug!("Raw model output: {}", raw);

        let sql = clean_sql_query(&raw);
        let validation = validate_sql(&sql);
        if !validation.accepted {
            info!("Generated SQL rejected: {}", validation.reason);
            return Err(ConversionError::Validation(validation.reason));
        }

        info!("Generated SQL accepted from {}", generator.model_name());
        Ok(ConvertedQuery {
            sql,
            model: generator.model_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::llm::tests::MockGenerator;

    fn converter() -> QueryConverter {
        QueryConverter::new(&AppConfig::default().conversion)
    }

    #[tokio::test]
    async fn test_sensitive_keywords_skip_generation() {
        let generator = MockGenerator::replying("SELECT 1");
        for question in [
            "Show every PASSWORD",
            "list credit_card numbers",
            "find ssn of employees",
            "Social Security numbers please",
            "what is the pin for the vault",
            // Substring match also catches ordinary words
            "list shipping addresses",
        ] {
            let err = converter().convert(question, &generator).await.unwrap_err();
            assert_eq!(err, ConversionError::SensitiveKeyword, "{}", question);
        }
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_long_question_skips_generation() {
        let generator = MockGenerator::replying("SELECT 1");
        let question = "a".repeat(2001);

        let err = converter().convert(&question, &generator).await.unwrap_err();
        assert_eq!(err, ConversionError::QueryTooLong { max: 2000 });
        assert!(err.to_string().contains("2000"));
        assert!(err.is_input_rejection());
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_length_limit_counts_characters() {
        let generator = MockGenerator::replying("SELECT 1");
        let question = "é".repeat(2000);
        assert!(converter().convert(&question, &generator).await.is_ok());
    }

    #[tokio::test]
    async fn test_fenced_output_is_cleaned_and_accepted() {
        let generator = MockGenerator::replying("```sql\nSELECT * FROM employees;\n```");
        let query = converter()
            .convert("Show all employees", &generator)
            .await
            .unwrap();
        assert_eq!(query.sql(), "SELECT * FROM employees;");
        assert_eq!(query.model(), "mock-model");
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_dangerous_output_is_a_validation_failure() {
        let generator = MockGenerator::replying("Query: DROP TABLE employees");
        let err = converter()
            .convert("Remove the employees table", &generator)
            .await
            .unwrap_err();
        assert_eq!(err.category(), "validation");
        assert!(!err.is_input_rejection());

        let generator = MockGenerator::replying("SELECT 1; DROP TABLE employees");
        let err = converter().convert("anything", &generator).await.unwrap_err();
        assert_eq!(
            err,
            ConversionError::Validation("Multiple queries not allowed".to_string())
        );

        let generator = MockGenerator::replying("UPDATE employees SET salary = 0; ");
        assert!(converter().convert("anything", &generator).await.is_ok());

        let generator = MockGenerator::replying("delete from jobs where job_title = 'alter ego'");
        let err = converter().convert("anything", &generator).await.unwrap_err();
        assert_eq!(
            err,
            ConversionError::Validation("Potentially dangerous operation detected".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_output_is_rejected() {
        let generator = MockGenerator::replying("```\n```");
        let err = converter().convert("anything", &generator).await.unwrap_err();
        assert_eq!(err, ConversionError::Validation("Empty query".to_string()));
    }

    #[tokio::test]
    async fn test_generator_failures_are_categorised() {
        let cases: [(fn(String) -> LlmError, &str); 7] = [
            (LlmError::ContentBlocked, "content_blocked"),
            (LlmError::InvalidArgument, "invalid_prompt"),
            (LlmError::PermissionDenied, "permission_denied"),
            (LlmError::ResourceExhausted, "quota_exceeded"),
            (LlmError::ConnectionError, "generation"),
            (LlmError::NotFound, "generation"),
            (LlmError::NoModelAvailable, "model_unavailable"),
        ];

        for (make, category) in cases {
            let generator = MockGenerator::failing(make);
            let err = converter().convert("Show jobs", &generator).await.unwrap_err();
            assert_eq!(err.category(), category);
        }
    }

    #[test]
    fn test_policy_wording_counts_as_block() {
        let err = ConversionError::from(LlmError::ResponseError(
            "response violated the Safety settings".to_string(),
        ));
        assert_eq!(err, ConversionError::ContentBlocked);

        let err = ConversionError::from(LlmError::InvalidArgument(
            "content policy violation".to_string(),
        ));
        assert_eq!(err, ConversionError::ContentBlocked);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ConversionError::SensitiveKeyword.to_string(),
            "Query contains potentially sensitive keywords"
        );
        assert_eq!(
            ConversionError::QuotaExceeded("limit".into()).to_string(),
            "API quota exceeded - limit"
        );
        assert_eq!(
            ConversionError::Validation("Empty query".into()).to_string(),
            "Validation Error: Empty query"
        );
    }
}
