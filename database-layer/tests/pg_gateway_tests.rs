//! Runs against a live PostgreSQL. Set `DATABASE_URL` and run with `--ignored`.

use database_layer::{
    match_flag_set, ColumnLookup, ConnectionManager, CredentialTreatment, DatabasePool, Exclusion,
    PgQueryGateway, QueryGateway, TableRef, TreatmentMode,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

/// Seeds a table private to one test, since the harness runs tests in parallel
async fn gateway(table: &str) -> PgQueryGateway {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect");

    sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(&format!(
        "CREATE TABLE {table} (id INT PRIMARY KEY, username TEXT, password TEXT)"
    ))
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(&format!(
        "INSERT INTO {table} VALUES \
         (1, 'alice', md5('secret')), (2, 'bob', 'hunter2'), (3, 'bob', 'other')"
    ))
    .execute(&pool)
    .await
    .unwrap();

    let mut manager = ConnectionManager::new("default");
    manager.register(DatabasePool::from_pool("default", pool));
    PgQueryGateway::new(Arc::new(manager))
}

fn lookup(table: &str, username: &str) -> ColumnLookup {
    ColumnLookup::new(TableRef::new(table), "username", username)
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_and_count() {
    let table = "credgate_test_find";
    let gateway = gateway(table).await;

    let rows = gateway.find_by_column("", &lookup(table, "bob")).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].columns().collect::<Vec<_>>(),
        vec!["id", "username", "password"]
    );

    let excluded = lookup(table, "bob").excluding(Exclusion::field_value("id", 2));
    assert_eq!(gateway.count("default", &excluded).await.unwrap(), 1);

    let clause = lookup(table, "bob").excluding(Exclusion::Clause("id <> 3".into()));
    assert_eq!(gateway.count("default", &clause).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_credential_match_with_treatment() {
    let table = "credgate_test_treatment";
    let gateway = gateway(table).await;
    let md5 = CredentialTreatment::new("md5(?)");

    for mode in [TreatmentMode::Parameterized, TreatmentMode::Raw] {
        let rows = gateway
            .find_with_credential_match(
                "default",
                &lookup(table, "alice"),
                "password",
                &md5.clone().with_mode(mode),
                "secret",
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(match_flag_set(&rows[0]));
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_unknown_connection_fails_before_query() {
    let table = "credgate_test_unknown";
    let gateway = gateway(table).await;
    assert!(gateway.count("archive", &lookup(table, "bob")).await.is_err());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_string_values_against_integer_column() {
    let table = "credgate_test_int_strings";
    let gateway = gateway(table).await;

    let by_id = ColumnLookup::new(TableRef::new(table), "id", "1");
    assert_eq!(gateway.count("default", &by_id).await.unwrap(), 1);

    // Editing bob's row 2 in place: row 3 still holds the name
    let editing = lookup(table, "bob").excluding(Exclusion::field_value("id", "2"));
    assert_eq!(gateway.count("default", &editing).await.unwrap(), 1);

    let only_row = lookup(table, "alice").excluding(Exclusion::field_value("id", "1"));
    assert_eq!(gateway.count("default", &only_row).await.unwrap(), 0);
}
