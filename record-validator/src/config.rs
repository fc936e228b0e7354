// Options for the record existence check
use crate::error::{Result, ValidatorError};
use config_engine::DEFAULT_CONNECTION;
use database_layer::{ColumnLookup, Exclusion, TableRef};
use serde::Deserialize;
use serde_json::Value;

/// Raw options as they appear in configuration.
///
/// ```toml
/// [validators.unique_email]
/// table = "users"
/// field = "email"
/// exclude = { field = "id", value = 42 }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordExistsOptions {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub exclude: Option<Exclusion>,
    #[serde(default)]
    pub connection: Option<String>,
}

/// Validated, immutable check configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ExistsCheckConfig {
    table: TableRef,
    field: String,
    exclude: Option<Exclusion>,
    connection: String,
}

impl ExistsCheckConfig {
    pub fn builder() -> ExistsCheckConfigBuilder {
        ExistsCheckConfigBuilder::default()
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn exclude(&self) -> Option<&Exclusion> {
        self.exclude.as_ref()
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub(crate) fn lookup(&self, value: &Value) -> ColumnLookup {
        let lookup = ColumnLookup::new(self.table.clone(), self.field.clone(), value.clone());
        match &self.exclude {
            Some(exclusion) => lookup.excluding(exclusion.clone()),
            None => lookup,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<RecordExistsOptions> for ExistsCheckConfig {
    type Error = ValidatorError;

    fn try_from(options: RecordExistsOptions) -> Result<Self> {
        let table = match (non_empty(options.schema), non_empty(options.table)) {
            (Some(schema), Some(table)) => TableRef::qualified(schema, table),
            (None, Some(table)) => TableRef::parse(&table),
            // A lone schema carries the qualified name, e.g. `auth.users`
            (Some(schema), None) => TableRef::parse(&schema),
            (None, None) => return Err(ValidatorError::MissingTable),
        };
        let field = non_empty(options.field).ok_or(ValidatorError::MissingField)?;

        Ok(Self {
            table,
            field,
            exclude: options.exclude,
            connection: non_empty(options.connection)
                .unwrap_or_else(|| DEFAULT_CONNECTION.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExistsCheckConfigBuilder {
    options: RecordExistsOptions,
}

impl ExistsCheckConfigBuilder {
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.options.table = Some(table.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.options.schema = Some(schema.into());
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.options.field = Some(field.into());
        self
    }

    pub fn exclude(mut self, exclusion: Exclusion) -> Self {
        self.options.exclude = Some(exclusion);
        self
    }

    pub fn connection(mut self, connection: impl Into<String>) -> Self {
        self.options.connection = Some(connection.into());
        self
    }

    pub fn build(self) -> Result<ExistsCheckConfig> {
        ExistsCheckConfig::try_from(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_table_and_schema() {
        let err = ExistsCheckConfig::builder().field("email").build().unwrap_err();
        assert_eq!(err.to_string(), "Table or Schema option missing!");
    }

    #[test]
    fn test_missing_field() {
        let err = ExistsCheckConfig::builder().table("users").build().unwrap_err();
        assert_eq!(err.to_string(), "Field option missing!");
    }

    #[test]
    fn test_schema_and_table_combine() {
        let config = ExistsCheckConfig::builder()
            .schema("auth")
            .table("users")
            .field("email")
            .build()
            .unwrap();
        assert_eq!(config.table(), &TableRef::qualified("auth", "users"));
        assert_eq!(config.connection(), DEFAULT_CONNECTION);
    }

    #[test]
    fn test_lone_schema_is_qualified_name() {
        let config = ExistsCheckConfig::builder()
            .schema("auth.users")
            .field("email")
            .build()
            .unwrap();
        assert_eq!(config.table(), &TableRef::qualified("auth", "users"));
    }

    #[test]
    fn test_options_deserialize_with_exclusion_pair() {
        let options: RecordExistsOptions = serde_json::from_value(json!({
            "table": "users",
            "field": "email",
            "exclude": {"field": "id", "value": 42},
            "connection": "reporting"
        }))
        .unwrap();

        let config = ExistsCheckConfig::try_from(options).unwrap();
        assert_eq!(config.exclude(), Some(&Exclusion::field_value("id", 42)));
        assert_eq!(config.connection(), "reporting");
    }

    #[test]
    fn test_options_deserialize_with_clause() {
        let options: RecordExistsOptions = serde_json::from_value(json!({
            "table": "users",
            "field": "email",
            "exclude": "id <> 42"
        }))
        .unwrap();
        assert_eq!(options.exclude, Some(Exclusion::Clause("id <> 42".into())));
    }
}
