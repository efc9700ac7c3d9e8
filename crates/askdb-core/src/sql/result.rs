use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

pub const MUTATION_MESSAGE: &str = "Data operation successful";

/// Column name to value, in select-list order.
pub type Row = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlResult {
    Mutation { message: String, affected_rows: u64 },
    Rows(Vec<Row>),
}

impl SqlResult {
    pub fn mutation(affected_rows: u64) -> Self {
        SqlResult::Mutation {
            message: MUTATION_MESSAGE.to_string(),
            affected_rows,
        }
    }
}
