//! SQL transpiler for the schema-change AST.
//!
//! Converts [`Operation`](crate::ast::Operation) values into PostgreSQL
//! statements. One operation may expand to several statements (an indexed
//! `add_column`, an `alter_column` touching type and nullability).

pub mod ddl;


/// Trait for converting AST nodes to SQL.
pub trait ToSql {
    /// Statements in execution order, without trailing semicolons.
    fn to_statements(&self) -> Vec<String>;

    /// All statements joined into a script fragment.
    fn to_sql(&self) -> String {
        self.to_statements().join(";\n")
    }
}

const RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "both", "case", "cast",
    "check", "collate", "column", "constraint", "create", "current_date", "current_user",
    "default", "desc", "distinct", "do", "else", "end", "except", "false", "for", "foreign",
    "from", "grant", "group", "having", "in", "into", "is", "join", "leading", "limit", "not",
    "null", "offset", "on", "only", "or", "order", "primary", "references", "select", "table",
    "then", "to", "true", "union", "unique", "user", "using", "when", "where", "with",
];

/// Quote an identifier when PostgreSQL would not accept it bare.
pub fn escape_identifier(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if plain && !RESERVED.contains(&name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
