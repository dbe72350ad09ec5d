//! Connection pool for the folder catalog.
//!
//! Owns the catalog schema: pending migrations are applied on connect when
//! `database.run_migrations` is set, and readiness means the `folders`
//! table is reachable, not merely that PostgreSQL answers.

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use mediahub_core::config::DatabaseConfig;
use mediahub_core::error::{AppError, ErrorKind};
use mediahub_core::result::AppResult;

/// Catalog schema migrations, embedded at build time.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Reported in `pg_stat_activity` for catalog connections.
const APPLICATION_NAME: &str = "mediahub-catalog";

/// PostgreSQL pool holding the `folders` and `videos` tables.
#[derive(Debug, Clone)]
pub struct CatalogPool {
    pool: PgPool,
}

impl CatalogPool {
    /// Connect to the catalog and bring its schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid database.url", e)
            })?
            .application_name(APPLICATION_NAME);

        info!(
            host = options.get_host(),
            database = options.get_database().unwrap_or("(default)"),
            max_connections = config.max_connections,
            "Connecting to folder catalog"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to connect to folder catalog", e)
            })?;

        let catalog = Self { pool };
        if config.run_migrations {
            catalog.migrate().await?;
        }
        Ok(catalog)
    }

    /// The underlying sqlx pool, for the repositories.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending catalog migrations.
    pub async fn migrate(&self) -> AppResult<()> {
        MIGRATOR.run(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to migrate folder catalog", e)
        })?;

        info!(migrations = MIGRATOR.iter().count(), "Folder catalog schema up to date");
        Ok(())
    }

    /// Whether the catalog answers and its `folders` table exists.
    pub async fn is_ready(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT to_regclass('folders') IS NOT NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Folder catalog is unreachable", e)
            })
    }

    /// Stop handing out connections and wait for in-flight catalog writes.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        self.pool.close().await;
        info!("Folder catalog pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embeds_folder_schema() {
        assert!(
            MIGRATOR
                .iter()
                .any(|m| m.description.contains("create folders"))
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_configuration_error() {
        let config = DatabaseConfig {
            url: "not a database url".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
            run_migrations: false,
        };

        let err = CatalogPool::connect(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
