//! credcheck - verify credentials and record existence from the command line
//!
//! Reads the same configuration as the library:
//! - `database` for named connections
//! - `logging` for the subscriber
//! - `authentication` for the adapter

use anyhow::Context;
use auth_identity::{AppConfig, DbAuthAdapter};
use clap::{Parser, Subcommand};
use config_engine::ConfigEngine;
use database_layer::{ConnectionManager, Exclusion, PgQueryGateway, QueryGateway};
use logger_redacted::{init_tracing, CredentialRedactor};
use record_validator::{ExistsCheckConfig, RecordExists, Validator};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "credcheck")]
#[command(version)]
#[command(about = "Verify credentials and record existence against a configured database")]
struct Cli {
    /// Path to a TOML or YAML configuration file
    #[arg(short, long, env = "CREDGATE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Authenticate an identity with the `authentication` settings
    Auth {
        #[arg(long)]
        identity: String,

        /// Prefer the environment variable over the flag
        #[arg(long, env = "CREDGATE_CREDENTIAL", hide_env_values = true)]
        credential: String,
    },

    /// Check that a record with the given field value exists
    Exists {
        #[arg(long)]
        table: Option<String>,

        #[arg(long)]
        schema: Option<String>,

        #[arg(long)]
        field: String,

        #[arg(long)]
        value: String,

        #[arg(long)]
        connection: Option<String>,

        #[arg(long, requires = "exclude_value", conflicts_with = "exclude_clause")]
        exclude_field: Option<String>,

        #[arg(long, requires = "exclude_field")]
        exclude_value: Option<String>,

        /// Raw SQL condition, appended as `AND (<clause>)`
        #[arg(long)]
        exclude_clause: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = &result {
        error!("credcheck failed: {:#}", e);
        eprintln!("error: {e:#}");
    }
    ExitCode::from(exit_status(&result))
}

/// 0 valid, 1 rejected, 2 configuration or data-access error
fn exit_status(result: &anyhow::Result<bool>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut engine = ConfigEngine::new();
    if let Some(path) = &cli.config {
        engine = engine.with_file(path);
    }
    let config = AppConfig::load(&engine.with_env()).context("loading configuration")?;

    init_tracing(&config.logging)?;
    let redactor = CredentialRedactor::new(config.logging.redaction_enabled);

    let connections = Arc::new(ConnectionManager::from_settings(&config.database)?);
    let gateway: Arc<dyn QueryGateway> =
        Arc::new(PgQueryGateway::new(Arc::clone(&connections)).with_redactor(redactor));

    let report = execute(cli.command, &config, gateway, redactor).await;
    connections.close_all().await;

    let report = report?;
    println!("{}", serde_json::to_string_pretty(&report.output)?);
    Ok(report.valid)
}

/// What a subcommand prints, and whether it passed
#[derive(Debug)]
struct Report {
    valid: bool,
    output: Value,
}

async fn execute(
    command: Command,
    config: &AppConfig,
    gateway: Arc<dyn QueryGateway>,
    redactor: CredentialRedactor,
) -> anyhow::Result<Report> {
    match command {
        Command::Auth {
            identity,
            credential,
        } => {
            let settings = config
                .authentication
                .as_ref()
                .context("no [authentication] section configured")?;
            let mut adapter =
                DbAuthAdapter::from_settings(gateway, settings)?.with_redactor(redactor);
            adapter.set_identity(&identity).set_credential(&credential);

            let outcome = adapter.authenticate().await?;
            Ok(Report {
                valid: outcome.is_valid(),
                output: serde_json::to_value(&outcome)?,
            })
        }
        Command::Exists {
            table,
            schema,
            field,
            value,
            connection,
            exclude_field,
            exclude_value,
            exclude_clause,
        } => {
            let mut builder = ExistsCheckConfig::builder().field(field);
            if let Some(table) = table {
                builder = builder.table(table);
            }
            if let Some(schema) = schema {
                builder = builder.schema(schema);
            }
            if let Some(connection) = connection {
                builder = builder.connection(connection);
            }
            if let (Some(field), Some(value)) = (exclude_field, exclude_value) {
                builder = builder.exclude(Exclusion::field_value(field, value));
            } else if let Some(clause) = exclude_clause {
                builder = builder.exclude(Exclusion::Clause(clause));
            }

            let mut validator = RecordExists::new(gateway, builder.build()?);
            let valid = validator.is_valid(&json!(value)).await?;
            Ok(Report {
                valid,
                output: json!({
                    "valid": valid,
                    "messages": validator.messages(),
                }),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_identity::AuthSettings;
    use database_layer::{InMemoryQueryGateway, Row, TableRef, TreatmentMode};

    fn gateway() -> Arc<dyn QueryGateway> {
        Arc::new(InMemoryQueryGateway::new().with_rows(
            "default",
            &TableRef::new("users"),
            [
                Row::new()
                    .with("id", 1)
                    .with("username", "alice")
                    .with("email", "alice@example.com")
                    .with("password", "secret"),
                Row::new()
                    .with("id", 2)
                    .with("username", "bob")
                    .with("email", "bob@example.com")
                    .with("password", "hunter2"),
            ],
        ))
    }

    fn auth_config(callback: Option<&str>, treatment: Option<&str>) -> AppConfig {
        AppConfig {
            authentication: Some(AuthSettings {
                connection: "default".to_string(),
                table: "users".to_string(),
                identity_column: "username".to_string(),
                credential_column: "password".to_string(),
                ambiguity_identity: false,
                callback: callback.map(str::to_string),
                treatment: treatment.map(str::to_string),
                treatment_mode: TreatmentMode::default(),
            }),
            ..AppConfig::default()
        }
    }

    async fn execute_args(config: &AppConfig, args: &[&str]) -> anyhow::Result<Report> {
        let cli = Cli::try_parse_from(std::iter::once("credcheck").chain(args.iter().copied()))?;
        execute(cli.command, config, gateway(), CredentialRedactor::default()).await
    }

    async fn status(config: &AppConfig, args: &[&str]) -> u8 {
        let result = execute_args(config, args).await.map(|report| report.valid);
        exit_status(&result)
    }

    #[test]
    fn test_exit_status_mapping() {
        assert_eq!(exit_status(&Ok(true)), 0);
        assert_eq!(exit_status(&Ok(false)), 1);
        assert_eq!(exit_status(&Err(anyhow::anyhow!("boom"))), 2);
    }

    #[tokio::test]
    async fn test_auth_success_prints_outcome() {
        let config = auth_config(Some("strict"), None);
        let report = execute_args(
            &config,
            &["auth", "--identity", "alice", "--credential", "secret"],
        )
        .await
        .unwrap();

        assert!(report.valid);
        assert_eq!(report.output["code"], "SUCCESS");
        assert_eq!(report.output["identity"], "alice");
        assert!(report.output["row"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_auth_rejections_exit_one() {
        let config = auth_config(None, None);
        assert_eq!(
            status(&config, &["auth", "--identity", "alice", "--credential", "wrong"]).await,
            1
        );
        assert_eq!(
            status(&config, &["auth", "--identity", "carol", "--credential", "secret"]).await,
            1
        );
    }

    #[tokio::test]
    async fn test_auth_configuration_errors_exit_two() {
        let args = ["auth", "--identity", "alice", "--credential", "secret"];

        let conflicting = auth_config(Some("bcrypt"), Some("MD5(?)"));
        let err = execute_args(&conflicting, &args).await.unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
        assert_eq!(status(&conflicting, &args).await, 2);

        assert_eq!(status(&auth_config(Some("sha1"), None), &args).await, 2);
        assert_eq!(status(&AppConfig::default(), &args).await, 2);
    }

    #[tokio::test]
    async fn test_exists_found_and_missing() {
        let config = AppConfig::default();
        let found = ["exists", "--table", "users", "--field", "email", "--value", "bob@example.com"];
        assert_eq!(status(&config, &found).await, 0);

        let report = execute_args(
            &config,
            &["exists", "--table", "users", "--field", "email", "--value", "carol@example.com"],
        )
        .await
        .unwrap();
        assert!(!report.valid);
        assert_eq!(
            report.output["messages"]["noRecordFound"],
            "No record matching the input was found"
        );
    }

    #[tokio::test]
    async fn test_exists_excludes_record_being_edited() {
        let config = AppConfig::default();
        let editing_self = [
            "exists", "--table", "users", "--field", "email", "--value", "alice@example.com",
            "--exclude-field", "id", "--exclude-value", "1",
        ];
        assert_eq!(status(&config, &editing_self).await, 1);

        let editing_other = [
            "exists", "--table", "users", "--field", "email", "--value", "alice@example.com",
            "--exclude-field", "id", "--exclude-value", "2",
        ];
        assert_eq!(status(&config, &editing_other).await, 0);
    }

    #[tokio::test]
    async fn test_exists_errors_exit_two() {
        let config = AppConfig::default();

        // no table or schema
        assert_eq!(
            status(&config, &["exists", "--field", "email", "--value", "a@x"]).await,
            2
        );
        // raw clauses need a SQL store
        assert_eq!(
            status(
                &config,
                &["exists", "--table", "users", "--field", "email", "--value", "a@x", "--exclude-clause", "id <> 1"],
            )
            .await,
            2
        );
    }

    #[test]
    fn test_exclude_field_requires_value() {
        let parsed = Cli::try_parse_from([
            "credcheck", "exists", "--table", "users", "--field", "email", "--value", "a@x",
            "--exclude-field", "id",
        ]);
        assert!(parsed.is_err());
    }
}
