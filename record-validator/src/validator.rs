// Field validators backed by the query gateway
use crate::config::ExistsCheckConfig;
use crate::error::Result;
use async_trait::async_trait;
use database_layer::{row::scalar_text, QueryGateway};
use error_common::{codes, log_error, ErrorCategory};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub const ERROR_NO_RECORD_FOUND: &str = "noRecordFound";

/// Stable code logged alongside a message key
pub fn error_code(key: &str) -> Option<&'static str> {
    match key {
        ERROR_NO_RECORD_FOUND => Some(codes::validation::NO_RECORD_FOUND),
        _ => None,
    }
}

/// Placeholder replaced by the validated value in message templates
pub const VALUE_PLACEHOLDER: &str = "%value%";

/// Pluggable field validator contract
#[async_trait]
pub trait Validator: Send {
    /// Validate `value`. Failure reasons are available from [`Validator::messages`]
    /// until the next call.
    async fn is_valid(&mut self, value: &Value) -> Result<bool>;

    /// Error key to rendered message for the last failed validation
    fn messages(&self) -> &BTreeMap<String, String>;

    /// The value seen by the last call
    fn value(&self) -> Option<&Value>;
}

/// Passes when at least one record has the value in the configured field
pub struct RecordExists {
    gateway: Arc<dyn QueryGateway>,
    config: ExistsCheckConfig,
    templates: BTreeMap<String, String>,
    messages: BTreeMap<String, String>,
    value: Option<Value>,
}

impl RecordExists {
    pub fn new(gateway: Arc<dyn QueryGateway>, config: ExistsCheckConfig) -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(
            ERROR_NO_RECORD_FOUND.to_string(),
            "No record matching the input was found".to_string(),
        );

        Self {
            gateway,
            config,
            templates,
            messages: BTreeMap::new(),
            value: None,
        }
    }

    /// Override the template for an error key
    #[must_use]
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template.into());
        self
    }

    pub fn config(&self) -> &ExistsCheckConfig {
        &self.config
    }

    fn error(&mut self, key: &str) {
        debug!(
            error_key = key,
            error_code = error_code(key).unwrap_or_default(),
            error_category = %ErrorCategory::Validation,
            "Validation failed"
        );
        let template = self.templates.get(key).map_or(key, String::as_str);
        let shown = self.value.as_ref().and_then(scalar_text).unwrap_or_default();
        self.messages
            .insert(key.to_string(), template.replace(VALUE_PLACEHOLDER, &shown));
    }
}

#[async_trait]
impl Validator for RecordExists {
    async fn is_valid(&mut self, value: &Value) -> Result<bool> {
        self.messages.clear();
        self.value = Some(value.clone());

        let lookup = self.config.lookup(value);
        let count = self
            .gateway
            .count(self.config.connection(), &lookup)
            .await
            .map_err(|e| {
                log_error("record existence lookup", &e);
                e
            })?;

        debug!(
            table = %self.config.table(),
            field = %self.config.field(),
            count,
            "Record existence checked"
        );

        if count == 0 {
            self.error(ERROR_NO_RECORD_FOUND);
            return Ok(false);
        }
        Ok(true)
    }

    fn messages(&self) -> &BTreeMap<String, String> {
        &self.messages
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database_layer::{Exclusion, InMemoryQueryGateway, Row, TableRef};
    use serde_json::json;

    fn gateway() -> Arc<InMemoryQueryGateway> {
        Arc::new(InMemoryQueryGateway::new().with_rows(
            "default",
            &TableRef::new("users"),
            [
                Row::new().with("id", 1).with("email", "alice@example.com"),
                Row::new().with("id", 2).with("email", "bob@example.com"),
            ],
        ))
    }

    fn validator(gateway: Arc<InMemoryQueryGateway>) -> RecordExists {
        let config = ExistsCheckConfig::builder()
            .table("users")
            .field("email")
            .build()
            .unwrap();
        RecordExists::new(gateway, config)
    }

    #[tokio::test]
    async fn test_existing_value_is_valid() {
        let mut validator = validator(gateway());
        assert!(validator.is_valid(&json!("alice@example.com")).await.unwrap());
        assert!(validator.messages().is_empty());
        assert_eq!(validator.value(), Some(&json!("alice@example.com")));
    }

    #[tokio::test]
    async fn test_missing_value_reports_no_record_found() {
        let mut validator = validator(gateway());
        assert!(!validator.is_valid(&json!("carol@example.com")).await.unwrap());
        assert_eq!(
            validator.messages().get(ERROR_NO_RECORD_FOUND).map(String::as_str),
            Some("No record matching the input was found")
        );
    }

    #[test]
    fn test_message_keys_map_to_validation_codes() {
        assert_eq!(error_code(ERROR_NO_RECORD_FOUND), Some("VALIDATION_3001"));
        assert_eq!(error_code("somethingElse"), None);
    }

    #[tokio::test]
    async fn test_messages_reset_between_calls() {
        let mut validator = validator(gateway());
        assert!(!validator.is_valid(&json!("carol@example.com")).await.unwrap());
        assert!(validator.is_valid(&json!("bob@example.com")).await.unwrap());
        assert!(validator.messages().is_empty());
    }

    #[tokio::test]
    async fn test_exclusion_hides_the_record_being_edited() {
        let config = ExistsCheckConfig::builder()
            .table("users")
            .field("email")
            .exclude(Exclusion::field_value("id", 1))
            .build()
            .unwrap();
        let mut validator = RecordExists::new(gateway(), config);

        assert!(!validator.is_valid(&json!("alice@example.com")).await.unwrap());
        assert!(validator.is_valid(&json!("bob@example.com")).await.unwrap());
    }

    #[tokio::test]
    async fn test_custom_message_interpolates_value() {
        let mut validator = validator(gateway())
            .with_message(ERROR_NO_RECORD_FOUND, "No user with email %value%");
        validator.is_valid(&json!("carol@example.com")).await.unwrap();
        assert_eq!(
            validator.messages().get(ERROR_NO_RECORD_FOUND).map(String::as_str),
            Some("No user with email carol@example.com")
        );
    }

    #[tokio::test]
    async fn test_data_access_errors_propagate() {
        let config = ExistsCheckConfig::builder()
            .table("users")
            .field("email")
            .exclude(Exclusion::Clause("id <> 1".into()))
            .build()
            .unwrap();
        let mut validator = RecordExists::new(gateway(), config);

        let err = validator.is_valid(&json!("alice@example.com")).await.unwrap_err();
        assert!(matches!(err, crate::ValidatorError::Database(_)));
    }
}
