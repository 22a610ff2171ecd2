// In-memory database fixtures for unit tests

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use super::dates::now_timestamp;
use super::migrations::run_migrations;

/// A single-connection in-memory pool with the schema applied. One
/// connection, since every new connection would open an empty database.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool, false).await.unwrap();
    pool
}

pub async fn insert_user(pool: &SqlitePool, user_id: &str) {
    let now = now_timestamp();
    sqlx::query("INSERT INTO users (id, email, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(format!("{}@example.com", user_id.to_lowercase()))
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .unwrap();
}
