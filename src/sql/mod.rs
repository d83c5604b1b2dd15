pub mod cleaner;
pub mod validator;

pub use cleaner::clean_sql_query;
pub use validator::{validate_sql, ValidationResult};
