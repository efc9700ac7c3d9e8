use indexmap::IndexMap;

pub mod reader;

/// Table name to column names, both in the order the database reports them.
pub type SchemaMap = IndexMap<String, Vec<String>>;
