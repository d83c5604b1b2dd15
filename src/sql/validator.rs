// Plain substring matching on the lower-cased text: a column such as `alter_date`
// is rejected too.
pub const ALLOWED_STATEMENTS: [&str; 4] = ["select", "insert", "update", "delete"];
pub const DANGEROUS_KEYWORDS: [&str; 3] = ["drop", "truncate", "alter"];

pub const EMPTY_QUERY: &str = "Empty query";
pub const BAD_STATEMENT: &str = "Query must start with SELECT, INSERT, UPDATE, or DELETE";
pub const MULTIPLE_QUERIES: &str = "Multiple queries not allowed";
pub const DANGEROUS_OPERATION: &str = "Potentially dangerous operation detected";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub accepted: bool,
    pub reason: String,
}

impl ValidationResult {
    fn accept() -> Self {
        Self {
            accepted: true,
            reason: String::new(),
        }
    }

    fn reject(reason: &str) -> Self {
        Self {
            accepted: false,
            reason: reason.to_string(),
        }
    }
}

pub fn validate_sql(query: &str) -> ValidationResult {
    if query.is_empty() {
        return ValidationResult::reject(EMPTY_QUERY);
    }

    let query = query.to_lowercase();
    let query = query.trim();

    if !ALLOWED_STATEMENTS.iter().any(|s| query.starts_with(s)) {
        return ValidationResult::reject(BAD_STATEMENT);
    }
    // A single trailing semicolon is fine
    if query.strip_suffix(';').unwrap_or(query).contains(';') {
        return ValidationResult::reject(MULTIPLE_QUERIES);
    }
    if DANGEROUS_KEYWORDS.iter().any(|k| query.contains(k)) {
        return ValidationResult::reject(DANGEROUS_OPERATION);
    }

    ValidationResult::accept()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(query: &str) -> String {
        validate_sql(query).reason
    }

    #[test]
    fn test_accepts_plain_select() {
        assert_eq!(validate_sql("select 1"), ValidationResult::accept());
    }

    #[test]
    fn test_accepts_each_allowed_statement() {
        assert!(validate_sql("SELECT * FROM employees").accepted);
        assert!(validate_sql("INSERT INTO jobs VALUES (1, 'dev', 1, 2)").accepted);
        assert!(validate_sql("Update products SET price = 2").accepted);
        assert!(validate_sql("delete from orders where status = 'void'").accepted);
    }

    #[test]
    fn test_trailing_semicolon_allowed() {
        assert!(validate_sql("select * from t;").accepted);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(validate_sql(""), ValidationResult::reject(EMPTY_QUERY));
    }

    #[test]
    fn test_whitespace_only_fails_statement_check() {
        assert_eq!(reason("   "), BAD_STATEMENT);
    }

    #[test]
    fn test_interior_semicolon_rejected() {
        assert_eq!(reason("select 1; select 2"), MULTIPLE_QUERIES);
        assert_eq!(reason("select 1;;"), MULTIPLE_QUERIES);
    }

    #[test]
    fn test_statement_check_runs_before_denylist() {
        assert!(!validate_sql("drop table x").accepted);
        assert_eq!(reason("DROP TABLE employees"), BAD_STATEMENT);
        assert_eq!(reason("with x as (select 1) select * from x"), BAD_STATEMENT);
    }

    #[test]
    fn test_semicolon_check_runs_before_denylist() {
        assert_eq!(reason("select 1; drop table employees"), MULTIPLE_QUERIES);
    }

    #[test]
    fn test_denylisted_substrings() {
        assert_eq!(reason("select * from t where x = 'DROP'"), DANGEROUS_OPERATION);
        assert_eq!(reason("delete from t; truncate"), MULTIPLE_QUERIES);
        assert_eq!(reason("update t set truncated = 1"), DANGEROUS_OPERATION);
        // Column names containing a listed word are rejected too
        assert_eq!(reason("select alter_date from audit"), DANGEROUS_OPERATION);
    }

    #[test]
    fn test_prefix_match_is_not_word_based() {
        assert!(validate_sql("selection_id").accepted);
    }
}
