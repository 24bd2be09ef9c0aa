use std::str::FromStr;
use std::time::Duration;

use lazy_static::lazy_static;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Error, Pool, Sqlite};

use crate::utils::env_utils::get_env_or;

static DB_URL_KEY: &str = "DATABASE_URL";
static DEFAULT_DB_URL: &str = "sqlite:rating.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

lazy_static! {
    pub static ref DB_URL: String = get_env_or(DB_URL_KEY, DEFAULT_DB_URL);
}

/// Creates the database file if needed, connects and applies pending migrations.
pub async fn open(url: &str, max_connections: u32) -> Result<Pool<Sqlite>, Error> {
    create_database_if_needed(url).await?;
    let pool = create_pool(url, max_connections).await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Writers wait for each other up to `BUSY_TIMEOUT` instead of failing with `SQLITE_BUSY`.
pub async fn create_pool(url: &str, max_connections: u32) -> Result<Pool<Sqlite>, Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

pub async fn create_database_if_needed(url: &str) -> Result<(), Error> {
    if !Sqlite::database_exists(url).await? {
        log::info!("Creating database {}", url);
        Sqlite::create_database(url).await?;
    }
    Ok(())
}

pub async fn migrate(pool: &Pool<Sqlite>) -> Result<(), Error> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}
