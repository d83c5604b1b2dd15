use serde::Serialize;

/// Fixed schema every question is answered against.
pub const SCHEMA_DESCRIPTION: &str = "\
1. **employees** table: employee_id (PK), first_name, last_name, email, phone, hire_date, job_id (FK), salary, department_id (FK)
2. **departments** table: department_id (PK), department_name, manager_id (FK), location_id (FK)
3. **jobs** table: job_id (PK), job_title, min_salary, max_salary
4. **locations** table: location_id (PK), street_address, postal_code, city, state_province, country_id
5. **customers** table: customer_id (PK), first_name, last_name, email, phone, address, city, state, country
6. **orders** table: order_id (PK), customer_id (FK), order_date, total_amount, status
7. **products** table: product_id (PK), product_name, category, price, stock_quantity
8. **order_items** table: order_item_id (PK), order_id (FK), product_id (FK), quantity, unit_price";

/// Short table summary shown next to the converter.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub const SCHEMA_TABLES: [TableSummary; 8] = [
    TableSummary {
        name: "employees",
        columns: &["employee_id", "first_name", "last_name", "email", "phone", "hire_date", "job_id", "salary", "department_id"],
    },
    TableSummary {
        name: "departments",
        columns: &["department_id", "department_name", "manager_id", "location_id"],
    },
    TableSummary {
        name: "jobs",
        columns: &["job_id", "job_title", "min_salary", "max_salary"],
    },
    TableSummary {
        name: "locations",
        columns: &["location_id", "street_address", "postal_code", "city", "state_province", "country_id"],
    },
    TableSummary {
        name: "customers",
        columns: &["customer_id", "first_name", "last_name", "email", "phone", "address", "city", "state", "country"],
    },
    TableSummary {
        name: "orders",
        columns: &["order_id", "customer_id", "order_date", "total_amount", "status"],
    },
    TableSummary {
        name: "products",
        columns: &["product_id", "product_name", "category", "price", "stock_quantity"],
    },
    TableSummary {
        name: "order_items",
        columns: &["order_item_id", "order_id", "product_id", "quantity", "unit_price"],
    },
];

pub const EXAMPLE_QUESTIONS: [&str; 5] = [
    "Show me all employees in the Sales department",
    "Who are the top 5 highest paid employees?",
    "List customers with pending orders",
    "Find orders over $1000 from last month",
    "Show products with low stock (less than 10 items)",
];

/// Builds the full prompt for one question.
pub fn build_prompt(question: &str) -> String {
    format!(
        r#"
You are an expert in converting English questions to SQL query!
The SQL database has the following tables and columns:

**Database Schema:**
{}

**Instructions:**
- Convert the following English question to a proper SQL query
- Use appropriate JOINs when querying multiple tables
- Include proper WHERE clauses for filtering
- Use ORDER BY and LIMIT when appropriate
- Ensure the query is syntactically correct
- Return ONLY the SQL query without explanations
- Never include DROP, TRUNCATE, or other destructive operations

**Question:** {}

**SQL Query:**
"#,
        SCHEMA_DESCRIPTION, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_schema_and_question() {
        let prompt = build_prompt("Who earns the most?");
        assert!(prompt.contains(SCHEMA_DESCRIPTION));
        assert!(prompt.contains("**Question:** Who earns the most?"));
        assert!(prompt.contains("Return ONLY the SQL query"));
        assert!(prompt.contains("Never include DROP, TRUNCATE"));
        assert!(prompt.trim_end().ends_with("**SQL Query:**"));
    }

    #[test]
    fn test_question_is_verbatim() {
        let question = "  List {braces} and `ticks`\nacross lines  ";
        assert!(build_prompt(question).contains(question));
    }

    #[test]
    fn test_table_summary_matches_description() {
        for table in &SCHEMA_TABLES {
            assert!(SCHEMA_DESCRIPTION.contains(&format!("**{}** table", table.name)));
            for column in table.columns {
                assert!(SCHEMA_DESCRIPTION.contains(column), "{} missing", column);
            }
        }
    }
}
