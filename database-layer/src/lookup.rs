// Table references, identifier quoting and single-column lookups
use crate::error::{DatabaseError, DatabaseResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Quote a SQL identifier with double quotes, doubling embedded quotes.
///
/// Empty identifiers and identifiers containing NUL are rejected.
pub fn quote_ident(ident: &str) -> DatabaseResult<String> {
    if ident.is_empty() || ident.contains('\0') {
        return Err(DatabaseError::InvalidIdentifier(ident.to_string()));
    }
    Ok(format!("\"{}\"", ident.replace('"', "\"\"")))
}

/// A table, optionally schema-qualified
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
}

impl TableRef {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            table: table.into(),
        }
    }

    /// Accepts `table` or `schema.table`
    pub fn parse(name: &str) -> Self {
        match name.split_once('.') {
            Some((schema, table)) if !schema.is_empty() && !table.is_empty() => {
                Self::qualified(schema, table)
            }
            _ => Self::new(name),
        }
    }

    /// The reference as a quoted SQL fragment
    pub fn to_sql(&self) -> DatabaseResult<String> {
        let table = quote_ident(&self.table)?;
        match &self.schema {
            Some(schema) => Ok(format!("{}.{}", quote_ident(schema)?, table)),
            None => Ok(table),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.table),
            None => write!(f, "{}", self.table),
        }
    }
}

/// Restriction appended to a lookup to skip one record, typically the one being edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Exclusion {
    /// A raw SQL condition, appended as `AND (clause)`.
    ///
    /// The clause is trusted input and is never escaped.
    Clause(String),
    /// Appended as `AND "field" <> $n`
    FieldValue { field: String, value: Value },
}

impl Exclusion {
    pub fn field_value(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// `SELECT ... FROM table WHERE column = value [AND exclusion]`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLookup {
    pub table: TableRef,
    pub column: String,
    pub value: Value,
    pub exclude: Option<Exclusion>,
}

impl ColumnLookup {
    pub fn new(table: TableRef, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            table,
            column: column.into(),
            value: value.into(),
            exclude: None,
        }
    }

    #[must_use]
    pub fn excluding(mut self, exclusion: Exclusion) -> Self {
        self.exclude = Some(exclusion);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users").unwrap(), "\"users\"");
        assert_eq!(quote_ident("we\"ird").unwrap(), "\"we\"\"ird\"");
        assert!(quote_ident("").is_err());
        assert!(quote_ident("bad\0name").is_err());
    }

    #[test]
    fn test_table_ref_sql() {
        assert_eq!(TableRef::new("users").to_sql().unwrap(), "\"users\"");
        assert_eq!(
            TableRef::qualified("auth", "users").to_sql().unwrap(),
            "\"auth\".\"users\""
        );
    }

    #[test]
    fn test_table_ref_parse() {
        assert_eq!(TableRef::parse("auth.users"), TableRef::qualified("auth", "users"));
        assert_eq!(TableRef::parse("users"), TableRef::new("users"));
        assert_eq!(TableRef::parse(".users"), TableRef::new(".users"));
        assert_eq!(TableRef::parse("auth.users").to_string(), "auth.users");
    }

    #[test]
    fn test_exclusion_deserializes_both_shapes() {
        let clause: Exclusion = serde_json::from_value(json!("id <> 5")).unwrap();
        assert_eq!(clause, Exclusion::Clause("id <> 5".to_string()));

        let pair: Exclusion =
            serde_json::from_value(json!({"field": "id", "value": 5})).unwrap();
        assert_eq!(pair, Exclusion::field_value("id", 5));
    }
}
