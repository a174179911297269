/// Embedded schema migrations
///
/// The SQL files under `migrations/` are compiled into the binary with
/// `sqlx::migrate!`. Each migration has an `.up.sql` and a `.down.sql`
/// half; the initial one creates `files`, `users`, `projects`,
/// `collaborators`, `invites` and `tasks`.
///
/// # Example
///
/// ```no_run
/// use tasklane_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasklane_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{
    migrate::{MigrateDatabase, Migrator},
    postgres::PgPool,
    Postgres,
};
use tracing::{debug, info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!(available = MIGRATOR.iter().count(), "Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        warn!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Reverts migrations down to (but not including) `target` version
///
/// `target = 0` reverts everything.
pub async fn revert_migrations(
    pool: &PgPool,
    target: i64,
) -> Result<(), sqlx::migrate::MigrateError> {
    warn!(target, "Reverting database migrations");
    MIGRATOR.undo(pool, target).await
}

/// Creates the database if it does not exist yet
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        debug!("Database already exists");
    } else {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    }

    Ok(())
}
