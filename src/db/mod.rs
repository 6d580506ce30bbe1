use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{config::Config, error::Result, models::*};

#[cfg(test)]
pub mod memory;

/// Durable home of player records, keyed by player identifier.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Inserts the record unless one already exists for `user.id`.
    async fn create_user(&self, user: &NewUser) -> Result<()>;

    /// Overwrites experience and level, inserting the whole record when none
    /// exists. An existing username is kept. No version check: last writer wins.
    async fn upsert_progress(&self, progress: &NewUser) -> Result<()>;

    async fn is_healthy(&self) -> bool;
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

// ==================== USER QUERIES ====================
#[async_trait]
impl UserStore for Database {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, username, experience, level, created_at, last_update_time
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_user(&self, user: &NewUser) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, experience, level)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(user.experience)
        .bind(user.level)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_progress(&self, progress: &NewUser) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, experience, level)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE
             SET experience = EXCLUDED.experience,
                 level = EXCLUDED.level,
                 last_update_time = NOW()",
        )
        .bind(&progress.id)
        .bind(&progress.username)
        .bind(progress.experience)
        .bind(progress.level)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.pool.acquire().await.is_ok()
    }
}
