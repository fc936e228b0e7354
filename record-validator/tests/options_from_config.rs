use config_engine::ConfigEngine;
use database_layer::{Exclusion, TableRef};
use figment::Jail;
use record_validator::{ExistsCheckConfig, RecordExistsOptions};

#[test]
fn test_validator_options_from_toml_section() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "credgate.toml",
            r#"
            [validators.unique_email]
            schema = "auth"
            table = "users"
            field = "email"
            exclude = { field = "id", value = 42 }
            "#,
        )?;

        let options: RecordExistsOptions = ConfigEngine::new()
            .with_file("credgate.toml")
            .section("validators.unique_email")
            .map_err(|e| e.to_string())?;
        let config = ExistsCheckConfig::try_from(options).map_err(|e| e.to_string())?;

        assert_eq!(config.table(), &TableRef::qualified("auth", "users"));
        assert_eq!(config.exclude(), Some(&Exclusion::field_value("id", 42)));
        Ok(())
    });
}

#[test]
fn test_env_overrides_field() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "credgate.toml",
            r#"
            [validators.login]
            table = "users"
            field = "email"
            exclude = "deleted_at IS NOT NULL"
            "#,
        )?;
        jail.set_env("CREDGATE_VALIDATORS__LOGIN__FIELD", "username");

        let options: RecordExistsOptions = ConfigEngine::new()
            .with_file("credgate.toml")
            .with_env()
            .section("validators.login")
            .map_err(|e| e.to_string())?;

        assert_eq!(options.field.as_deref(), Some("username"));
        assert_eq!(
            options.exclude,
            Some(Exclusion::Clause("deleted_at IS NOT NULL".into()))
        );
        Ok(())
    });
}
