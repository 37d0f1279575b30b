use serde::Serialize;
use std::fmt;

/// Column types used by the migration chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    BigInteger,
    Float,
    /// `VARCHAR(n)`
    String(u32),
    Text,
    Boolean,
    Json,
}

impl ColumnType {
    /// PostgreSQL type name.
    pub fn sql_name(&self) -> String {
        match self {
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::String(len) => format!("VARCHAR({})", len),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Json => "JSON".to_string(),
        }
    }

    /// Auto-incrementing variant used for integer primary keys.
    pub fn serial_name(&self) -> Option<&'static str> {
        match self {
            ColumnType::Integer => Some("SERIAL"),
            ColumnType::BigInteger => Some("BIGSERIAL"),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::BigInteger | ColumnType::Float
        )
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::String(_) | ColumnType::Text)
    }

    /// Whether PostgreSQL converts `self` to `target` in `ALTER COLUMN ... TYPE`
    /// without an explicit `USING` clause.
    pub fn casts_implicitly_to(&self, target: &ColumnType) -> bool {
        if self == target {
            return true;
        }
        match (self, target) {
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            // Anything has an assignment cast to text types.
            (_, b) if b.is_textual() => true,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

/// A `server_default` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(String),
    /// SQL expression pasted verbatim, e.g. `now()`.
    Expr(String),
}

impl DefaultValue {
    /// Render as a SQL literal.
    pub fn to_literal(&self) -> String {
        match self {
            DefaultValue::Bool(true) => "true".to_string(),
            DefaultValue::Bool(false) => "false".to_string(),
            DefaultValue::Int(n) => n.to_string(),
            DefaultValue::Str(s) => format!("'{}'", s.replace('\'', "''")),
            DefaultValue::Expr(e) => e.clone(),
        }
    }
}

impl From<bool> for DefaultValue {
    fn from(v: bool) -> Self {
        DefaultValue::Bool(v)
    }
}

impl From<i64> for DefaultValue {
    fn from(v: i64) -> Self {
        DefaultValue::Int(v)
    }
}

impl From<i32> for DefaultValue {
    fn from(v: i32) -> Self {
        DefaultValue::Int(v.into())
    }
}

impl From<&str> for DefaultValue {
    fn from(v: &str) -> Self {
        DefaultValue::Str(v.to_string())
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: ColumnType,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub primary_key: bool,
}

impl ColumnDef {
    /// New nullable column without default.
    pub fn new(name: impl Into<String>, sql_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: true,
            server_default: None,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn server_default(mut self, val: impl Into<DefaultValue>) -> Self {
        self.server_default = Some(val.into());
        self
    }
}
