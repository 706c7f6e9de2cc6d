//! Dharma Player Storage
//!
//! Persistence backends implementing [`dharma_core::PersistenceGateway`]:
//!
//! - [`SqliteGateway`]: relational store used by the server
//! - [`LocalGateway`]: a single serialized JSON blob, in memory or in a file
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each table owns its own queries (`users`, `tracks`,
//!   `settings`, `progress`)
//! - **Hashed Credentials**: both backends store bcrypt hashes only
//!
//! # Example
//!
//! ```rust,no_run
//! use dharma_storage::{create_pool, run_migrations, SqliteGateway};
//! use dharma_core::PersistenceGateway;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://database.db").await?;
//! run_migrations(&pool).await?;
//!
//! let gateway = SqliteGateway::new(pool);
//! let tracks = gateway.list_tracks().await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

pub mod credentials;
pub mod local;

// Vertical slices
pub mod progress;
pub mod settings;
pub mod tracks;
pub mod users;

pub use context::SqliteGateway;
pub use error::{Result, StorageError};
pub use local::LocalGateway;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
pub async fn run_migrations(pool: &SqlitePool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://database.db`)
pub async fn create_pool(database_url: &str) -> std::result::Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    // In-memory databases are per-connection, so keep a single one
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::debug!("SQLite pool created");

    Ok(pool)
}
