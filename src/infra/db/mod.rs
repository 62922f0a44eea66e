//! Postgres pool construction, migrations and the repository impls.

mod counts;
mod dishes;
mod menus;
mod submenus;
mod util;

pub use util::map_sqlx_error;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::application::repos::{HealthRepo, RepoError};

/// Handle to the Postgres pool. Every repository trait in the
/// application layer is implemented on this type; cloning shares the
/// underlying pool.
#[derive(Clone)]
pub struct PostgresRepositories {
    pool: PgPool,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Opens a pool with the given connection budget.
    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        let options = PgPoolOptions::new().max_connections(max_connections);
        options.connect(url).await
    }

    /// Applies everything under `migrations/` that has not yet run.
    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        let migrator = sqlx::migrate!("./migrations");
        migrator.run(pool).await.map_err(Into::into)
    }
}

#[async_trait]
impl HealthRepo for PostgresRepositories {
    async fn health_check(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1")
            .execute(self.pool())
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}
