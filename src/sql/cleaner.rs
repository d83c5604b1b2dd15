use regex::Regex;
use std::sync::LazyLock;

const FENCE: &str = "```";

/// Checked in order, only the first match is removed.
pub const LABEL_PREFIXES: [&str; 4] = ["SQL Query:", "SQL:", "Query:", "Answer:"];

// An opening fence carrying a language tag on its own line, e.g. "```postgresql\n"
static TAGGED_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+\-]+[ \t]*\r?\n").expect("valid fence pattern"));

fn strip_opening_fence(text: &str) -> &str {
    if let Some(m) = TAGGED_FENCE.find(text) {
        return &text[m.end()..];
    }
    if let Some(rest) = text.strip_prefix("```sql") {
        return rest;
    }
    text.strip_prefix(FENCE).unwrap_or(text)
}

/// Cleans raw model output down to the bare query.
pub fn clean_sql_query(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let without_open = strip_opening_fence(raw);
    let without_fences = without_open.strip_suffix(FENCE).unwrap_or(without_open);

    let trimmed = without_fences.trim();
    for prefix in LABEL_PREFIXES {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return rest.trim().to_string();
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_sql_query(""), "");
    }

    #[test]
    fn test_clean_input_unchanged() {
        assert_eq!(clean_sql_query("SELECT * FROM jobs"), "SELECT * FROM jobs");
        assert_eq!(clean_sql_query("  SELECT 1;\n"), "SELECT 1;");
    }

    #[test]
    fn test_sql_fence_removed() {
        assert_eq!(
            clean_sql_query("```sql\nSELECT * FROM employees;\n```"),
            "SELECT * FROM employees;"
        );
    }

    #[test]
    fn test_bare_fence_removed() {
        assert_eq!(clean_sql_query("```\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn test_other_language_tag_removed() {
        assert_eq!(
            clean_sql_query("```postgresql\nSELECT city FROM locations\n```"),
            "SELECT city FROM locations"
        );
    }

    #[test]
    fn test_tag_sharing_sql_prefix() {
        assert_eq!(clean_sql_query("```sqlite\nSELECT 1\n```"), "SELECT 1");
        assert_eq!(clean_sql_query("```sql SELECT 1```"), "SELECT 1");
    }

    #[test]
    fn test_inline_fence_keeps_statement() {
        assert_eq!(clean_sql_query("```SELECT 1```"), "SELECT 1");
    }

    #[test]
    fn test_fence_must_lead() {
        // Leading whitespace means the fence is not at the start
        assert_eq!(clean_sql_query(" ```sql\nSELECT 1\n```"), "```sql\nSELECT 1");
    }

    #[test]
    fn test_label_prefixes() {
        assert_eq!(clean_sql_query("SQL Query: SELECT 1"), "SELECT 1");
        assert_eq!(clean_sql_query("SQL: SELECT 1"), "SELECT 1");
        assert_eq!(clean_sql_query("Query: DROP TABLE employees"), "DROP TABLE employees");
        assert_eq!(clean_sql_query("  Answer:\nSELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_only_one_label_stripped() {
        assert_eq!(clean_sql_query("SQL: SQL: select 1"), "SQL: select 1");
        assert_eq!(clean_sql_query("SQL Query: Answer: select 1"), "Answer: select 1");
    }

    #[test]
    fn test_fence_and_label_together() {
        assert_eq!(clean_sql_query("```sql\nSQL: SELECT 1;\n```"), "SELECT 1;");
    }

    #[test]
    fn test_closing_fence_before_trailing_newline_is_kept() {
        // Only a fence at the very end is stripped, the validator then refuses the leftover
        let cleaned = clean_sql_query("```sql\nSELECT 1;\n```\n");
        assert_eq!(cleaned, "SELECT 1;\n```");

        let result = crate::sql::validate_sql(&cleaned);
        assert!(!result.accepted);
        assert_eq!(result.reason, crate::sql::validator::MULTIPLE_QUERIES);
    }

    #[test]
    fn test_idempotent_on_clean_output() {
        let once = clean_sql_query("```sql\nSELECT * FROM orders WHERE status = 'pending'\n```");
        assert_eq!(clean_sql_query(&once), once);
    }
}
