// In-memory query gateway for tests and local tooling
use crate::error::{DatabaseError, DatabaseResult};
use crate::lookup::{ColumnLookup, Exclusion, TableRef};
use crate::query::QueryGateway;
use crate::row::{scalar_text, sql_eq, Row};
use crate::treatment::{CredentialTreatment, CREDENTIAL_MATCH_COLUMN};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

type TreatmentFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A [`QueryGateway`] backed by rows held in memory.
///
/// Comparisons follow SQL null semantics. Raw exclusion clauses cannot be
/// evaluated and fail with [`DatabaseError::Unsupported`]. Treatment templates
/// other than a bare `?` must be registered with
/// [`InMemoryQueryGateway::with_treatment`].
#[derive(Default)]
pub struct InMemoryQueryGateway {
    tables: DashMap<(String, TableRef), Vec<Row>>,
    treatments: DashMap<String, TreatmentFn>,
    queries: AtomicUsize,
}

impl InMemoryQueryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_row(&self, connection: &str, table: &TableRef, row: Row) {
        self.tables
            .entry((connection.to_string(), table.clone()))
            .or_default()
            .push(row);
    }

    #[must_use]
    pub fn with_rows(
        self,
        connection: &str,
        table: &TableRef,
        rows: impl IntoIterator<Item = Row>,
    ) -> Self {
        for row in rows {
            self.insert_row(connection, table, row);
        }
        self
    }

    /// Register how a treatment template transforms a credential
    #[must_use]
    pub fn with_treatment<F>(self, template: impl Into<String>, treat: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.treatments.insert(template.into(), Arc::new(treat));
        self
    }

    /// Number of gateway calls served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn matching_rows(&self, connection: &str, lookup: &ColumnLookup) -> DatabaseResult<Vec<Row>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        debug!(connection = %connection, table = %lookup.table, column = %lookup.column, "In-memory lookup");

        if let Some(Exclusion::Clause(clause)) = &lookup.exclude {
            if !clause.trim().is_empty() {
                return Err(DatabaseError::Unsupported(
                    "raw exclusion clauses need a SQL backend".to_string(),
                ));
            }
        }

        let key = (connection.to_string(), lookup.table.clone());
        let Some(rows) = self.tables.get(&key) else {
            return Ok(Vec::new());
        };

        Ok(rows
            .iter()
            .filter(|row| {
                let value = row.get(&lookup.column).unwrap_or(&serde_json::Value::Null);
                sql_eq(value, &lookup.value) == Some(true)
            })
            .filter(|row| match &lookup.exclude {
                Some(Exclusion::FieldValue { field, value }) => {
                    let current = row.get(field).unwrap_or(&serde_json::Value::Null);
                    sql_eq(current, value) == Some(false)
                }
                _ => true,
            })
            .cloned()
            .collect())
    }

    fn treat(&self, treatment: &CredentialTreatment, credential: &str) -> DatabaseResult<String> {
        if treatment.is_identity() {
            return Ok(credential.to_string());
        }
        self.treatments
            .get(treatment.template())
            .map(|treat| treat.value()(credential))
            .ok_or_else(|| {
                DatabaseError::Unsupported(format!(
                    "no in-memory treatment registered for {}",
                    treatment.template()
                ))
            })
    }
}

#[async_trait]
impl QueryGateway for InMemoryQueryGateway {
    async fn find_by_column(
        &self,
        connection: &str,
        lookup: &ColumnLookup,
    ) -> DatabaseResult<Vec<Row>> {
        self.matching_rows(connection, lookup)
    }

    async fn count(&self, connection: &str, lookup: &ColumnLookup) -> DatabaseResult<u64> {
        Ok(self.matching_rows(connection, lookup)?.len() as u64)
    }

    async fn find_with_credential_match(
        &self,
        connection: &str,
        lookup: &ColumnLookup,
        credential_column: &str,
        treatment: &CredentialTreatment,
        credential: &str,
    ) -> DatabaseResult<Vec<Row>> {
        let rows = self.matching_rows(connection, lookup)?;
        let treated = self.treat(treatment, credential)?;

        Ok(rows
            .into_iter()
            .map(|mut row| {
                let stored = row.get(credential_column).and_then(scalar_text);
                let flag = i32::from(stored.as_deref() == Some(treated.as_str()));
                row.insert(CREDENTIAL_MATCH_COLUMN, flag);
                row
            })
            .collect())
    }
}
