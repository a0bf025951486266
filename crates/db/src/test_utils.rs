//! Test utilities for database operations.
//!
//! Provides an in-memory SQLite database with the full schema applied, so
//! repository and service flows can run without a database server.

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// URL of a private in-memory SQLite database.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run every migration.
    ///
    /// The pool is pinned to a single connection: each SQLite in-memory
    /// connection owns its own database.
    pub async fn in_memory() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(IN_MEMORY_URL);
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get a shared handle to the connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }
}
