// Query gateway: the only path from the adapters to the database
use crate::connection::ConnectionManager;
use crate::error::{DatabaseError, DatabaseResult};
use crate::lookup::{quote_ident, ColumnLookup, Exclusion};
use crate::row::Row;
use crate::treatment::{CredentialTreatment, TreatmentMode, CREDENTIAL_MATCH_COLUMN};
use async_trait::async_trait;
use logger_redacted::CredentialRedactor;
use serde_json::Value as JsonValue;
use sqlx::{Postgres, QueryBuilder, Row as _};
use std::sync::Arc;
use tracing::{debug, error};

/// Executes the handful of single-table lookups the adapters need.
///
/// Every value that originates from a caller is bound as a parameter.
/// Identifiers are quoted. The one exception is a credential treatment in
/// [`TreatmentMode::Raw`], which embeds an escaped literal.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// All rows of `lookup.table` whose `lookup.column` equals `lookup.value`
    async fn find_by_column(&self, connection: &str, lookup: &ColumnLookup)
        -> DatabaseResult<Vec<Row>>;

    /// Number of rows the same lookup would return
    async fn count(&self, connection: &str, lookup: &ColumnLookup) -> DatabaseResult<u64>;

    /// Like [`QueryGateway::find_by_column`], with an extra
    /// [`CREDENTIAL_MATCH_COLUMN`] per row: 1 when `credential_column` equals
    /// the treated credential, 0 otherwise.
    async fn find_with_credential_match(
        &self,
        connection: &str,
        lookup: &ColumnLookup,
        credential_column: &str,
        treatment: &CredentialTreatment,
        credential: &str,
    ) -> DatabaseResult<Vec<Row>>;
}

/// PostgreSQL gateway over the pools of a [`ConnectionManager`]
pub struct PgQueryGateway {
    connections: Arc<ConnectionManager>,
    redactor: CredentialRedactor,
}

impl PgQueryGateway {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self {
            connections,
            redactor: CredentialRedactor::default(),
        }
    }

    #[must_use]
    pub fn with_redactor(mut self, redactor: CredentialRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    async fn fetch_rows(
        &self,
        connection: &str,
        mut builder: QueryBuilder<'static, Postgres>,
    ) -> DatabaseResult<Vec<Row>> {
        let pool = self.connections.pool(connection)?;
        debug!(
            connection = %pool.name(),
            sql = %self.redactor.redact_sql(builder.sql()),
            "Executing query"
        );

        let records = builder.build().fetch_all(pool.pool()).await.map_err(|e| {
            error!("Query failed: {}", e);
            DatabaseError::from_sqlx(e)
        })?;

        records
            .iter()
            .map(|record| match record.try_get::<JsonValue, _>(0)? {
                JsonValue::Object(map) => Ok(Row::from(map)),
                other => Err(DatabaseError::QueryFailed(format!(
                    "expected a JSON object per row, got {other}"
                ))),
            })
            .collect()
    }
}

/// Append `FROM table WHERE column = $n [AND exclusion]`
pub(crate) fn push_lookup(
    builder: &mut QueryBuilder<'static, Postgres>,
    lookup: &ColumnLookup,
) -> DatabaseResult<()> {
    builder
        .push(" FROM ")
        .push(lookup.table.to_sql()?)
        .push(" WHERE ");
    push_comparison(builder, &lookup.column, "=", &lookup.value)?;

    match &lookup.exclude {
        Some(Exclusion::Clause(clause)) if !clause.trim().is_empty() => {
            builder.push(" AND (").push(clause).push(")");
        }
        Some(Exclusion::FieldValue { field, value }) => {
            builder.push(" AND ");
            push_comparison(builder, field, "<>", value)?;
        }
        _ => {}
    }
    Ok(())
}

/// `"column" <op> $n`.
///
/// A string is bound as `text` and compared with the column's text form, so
/// `"1"` finds an `INT` row the same way it finds a `TEXT` one.
pub(crate) fn push_comparison(
    builder: &mut QueryBuilder<'static, Postgres>,
    column: &str,
    op: &str,
    value: &JsonValue,
) -> DatabaseResult<()> {
    builder.push(quote_ident(column)?);
    if value.is_string() {
        builder.push("::text");
    }
    builder.push(" ").push(op).push(" ");
    push_value(builder, value);
    Ok(())
}

/// Bind a JSON value with the closest native Postgres type
pub(crate) fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: &JsonValue) {
    match value {
        JsonValue::Null => {
            builder.push_bind(None::<String>);
        }
        JsonValue::Bool(b) => {
            builder.push_bind(*b);
        }
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                builder.push_bind(i);
            } else {
                builder.push_bind(n.as_f64().unwrap_or(f64::NAN));
            }
        }
        JsonValue::String(s) => {
            builder.push_bind(s.clone());
        }
        other => {
            builder.push_bind(sqlx::types::Json(other.clone()));
        }
    }
}

/// `CASE WHEN "credential" = <treated> THEN 1 ELSE 0 END`
pub(crate) fn push_match_flag(
    builder: &mut QueryBuilder<'static, Postgres>,
    credential_column: &str,
    treatment: &CredentialTreatment,
    credential: &str,
) -> DatabaseResult<()> {
    builder
        .push("CASE WHEN ")
        .push(quote_ident(credential_column)?)
        .push(" = ");

    match treatment.mode() {
        TreatmentMode::Parameterized => {
            let (before, after) = treatment.split();
            builder.push(before);
            builder.push_bind(credential.to_string());
            builder.push(after);
        }
        TreatmentMode::Raw => {
            builder.push(treatment.render_literal(credential));
        }
    }

    builder
        .push(" THEN 1 ELSE 0 END AS ")
        .push(quote_ident(CREDENTIAL_MATCH_COLUMN)?);
    Ok(())
}

#[async_trait]
impl QueryGateway for PgQueryGateway {
    async fn find_by_column(
        &self,
        connection: &str,
        lookup: &ColumnLookup,
    ) -> DatabaseResult<Vec<Row>> {
        let mut builder = QueryBuilder::new("SELECT row_to_json(t) FROM (SELECT *");
        push_lookup(&mut builder, lookup)?;
        builder.push(") AS t");

        self.fetch_rows(connection, builder).await
    }

    async fn count(&self, connection: &str, lookup: &ColumnLookup) -> DatabaseResult<u64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*)");
        push_lookup(&mut builder, lookup)?;

        let pool = self.connections.pool(connection)?;
        debug!(connection = %pool.name(), sql = %builder.sql(), "Executing count");

        let record = builder.build().fetch_one(pool.pool()).await.map_err(|e| {
            error!("Count failed: {}", e);
            DatabaseError::from_sqlx(e)
        })?;
        let count: i64 = record.try_get(0)?;

        u64::try_from(count).map_err(|_| DatabaseError::QueryFailed(format!("negative count {count}")))
    }

    async fn find_with_credential_match(
        &self,
        connection: &str,
        lookup: &ColumnLookup,
        credential_column: &str,
        treatment: &CredentialTreatment,
        credential: &str,
    ) -> DatabaseResult<Vec<Row>> {
        let mut builder = QueryBuilder::new("SELECT row_to_json(t) FROM (SELECT *, ");
        push_match_flag(&mut builder, credential_column, treatment, credential)?;
        push_lookup(&mut builder, lookup)?;
        builder.push(") AS t");

        self.fetch_rows(connection, builder).await
    }
}
