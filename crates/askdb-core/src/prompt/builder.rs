use std::fmt;

use crate::schema::SchemaMap;

const HEADER: &str = r#"
You are an expert in converting complex English questions to SQL queries and handling data insertion and update requests!
The SQL database has the following structure:

"#;

const EXAMPLES: &str = r#"
Here are some examples to guide you:

Example 1 - How many registered users are there?
SQL: SELECT COUNT(*) FROM USERS;

Example 2 - List all product names with their prices.
SQL: SELECT name, price FROM PRODUCTS;

Example 3 - What's the total revenue from all orders?
SQL: SELECT SUM(total_price) FROM ORDERS;

Example 4 - Who are the top 5 customers by total spending?
SQL: SELECT u.username, SUM(o.total_price) AS total_spent
     FROM USERS u
     JOIN ORDERS o ON u.user_id = o.user_id
     GROUP BY u.user_id
     ORDER BY total_spent DESC
     LIMIT 5;

Example 5 - Which products are out of stock?
SQL: SELECT name FROM PRODUCTS WHERE stock_quantity = 0;

Example 6 - What's the average order value?
SQL: SELECT AVG(total_price) FROM ORDERS;

Example 7 - Add new user (name: John Doe, email: john@example.com)
SQL: INSERT INTO USERS (username, email) VALUES ('John Doe', 'john@example.com');

Example 8 - Add new product for John Doe (name: Laptop, price: 999.99, description: High-performance laptop, stock_quantity: 10)
SQL: 
INSERT INTO PRODUCTS (name, price, description, stock_quantity, user_id)
SELECT 'Laptop', 999.99, 'High-performance laptop', 10, user_id
FROM USERS
WHERE username = 'John Doe';

Example 9 - Update John Doe's email to newemail@example.com
SQL: UPDATE USERS SET email = 'newemail@example.com' WHERE username = 'John Doe';

Example 10 - Update the price of Laptop to 1099.99
SQL: UPDATE PRODUCTS SET price = 1099.99 WHERE name = 'Laptop';

"#;

const OUTPUT_POLICY: &str = "Please convert the following question, insertion, or update request into a SQL query based on these tables and examples. For insertion or update requests, generate the appropriate INSERT or UPDATE statement. The SQL code should not have triple backticks (```) at the beginning or end, and should not include the word 'sql' in the output.\n";

/// Instruction text sent ahead of every question for one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
}

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The full model input for `question`.
    pub fn with_question(&self, question: &str) -> String {
        let mut input = String::with_capacity(self.text.len() + question.len());
        input.push_str(&self.text);
        input.push_str(question);
        input
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One `"<table> table columns: a, b\n"` line per table, in map order.
pub fn render_schema(schema: &SchemaMap) -> String {
    schema
        .iter()
        .map(|(table, columns)| format!("{} table columns: {}\n", table, columns.join(", ")))
        .collect()
}

pub fn build_prompt(schema: &SchemaMap) -> Prompt {
    let schema_section = render_schema(schema);

    let mut text =
        String::with_capacity(HEADER.len() + schema_section.len() + EXAMPLES.len() + OUTPUT_POLICY.len());
    text.push_str(HEADER);
    text.push_str(&schema_section);
    text.push_str(EXAMPLES);
    text.push_str(OUTPUT_POLICY);

    Prompt { text }
}

/// Prompt used when no schema could be read for a database.
pub fn default_prompt() -> Prompt {
    build_prompt(&SchemaMap::new())
}
