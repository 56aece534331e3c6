use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub user_id: i64,
    pub is_admin: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct BroadcastMessage {
    pub id: i32,
    pub user_id: i64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Pooled database handle, constructed once in `main` and shared through the
/// dispatcher dependency map.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(3) // Maximum 3 simultaneous database connections
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id SERIAL PRIMARY KEY,
                user_id BIGINT UNIQUE NOT NULL,
                is_admin BOOLEAN NOT NULL DEFAULT FALSE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                id SERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL,
                message TEXT NOT NULL,
                timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_user(&self, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, user_id, is_admin FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create_user(&self, user_id: i64, is_admin: bool) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (user_id, is_admin) VALUES ($1, $2)
             RETURNING id, user_id, is_admin",
        )
        .bind(user_id)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn count_users(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn all_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, user_id, is_admin FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn add_message(
        &self,
        user_id: i64,
        message: &str,
    ) -> Result<BroadcastMessage, sqlx::Error> {
        sqlx::query_as::<_, BroadcastMessage>(
            "INSERT INTO messages (user_id, message) VALUES ($1, $2)
             RETURNING id, user_id, message, timestamp",
        )
        .bind(user_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn all_messages(&self) -> Result<Vec<BroadcastMessage>, sqlx::Error> {
        sqlx::query_as::<_, BroadcastMessage>(
            "SELECT id, user_id, message, timestamp FROM messages ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
