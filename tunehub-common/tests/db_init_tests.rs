//! Tests for database initialization
//!
//! Covers automatic creation on first run, reopening an existing
//! database, and seeding of the default admin account.

use std::path::PathBuf;
use tunehub_common::auth;
use tunehub_common::db::init::{init_database, DEFAULT_ADMIN_USERNAME};
use tunehub_common::db::users;
use tunehub_common::Role;

fn temp_db_path(name: &str) -> PathBuf {
    PathBuf::from(format!(
        "/tmp/tunehub-test-{}-{}.db",
        name,
        std::process::id()
    ))
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let db_path = temp_db_path("create");
    let _ = std::fs::remove_file(&db_path);

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let db_path = temp_db_path("existing");
    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    // Second open must succeed and must not duplicate the admin seed
    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    let admin_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(pool2.as_ref().unwrap())
            .await
            .unwrap();
    assert_eq!(admin_count, 1, "Admin account was seeded more than once");

    drop(pool1);
    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_default_admin_seeded() {
    let db_path = temp_db_path("admin-seed");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let admin = users::find_by_username(&pool, DEFAULT_ADMIN_USERNAME)
        .await
        .unwrap()
        .expect("default admin not seeded");

    assert_eq!(admin.role, Role::Admin);
    assert!(auth::check_password_hash(&admin.password_hash, "admin"));

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_foreign_keys_enabled() {
    let db_path = temp_db_path("fk");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(enabled, 1, "foreign_keys pragma not enabled");

    let _ = std::fs::remove_file(&db_path);
}
