use std::path::Path;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, SqlitePool,
};
use tracing::info;

use crate::{
    traits::CreateTable,
    types::{author::Author, book::Book, book_instance::BookInstance},
};

pub async fn connect(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    info!("Opening database at {}", path.display());
    let conn = Pool::connect_with(
        SqliteConnectOptions::new()
            .filename(path)
            .journal_mode(SqliteJournalMode::Wal)
            .create_if_missing(true),
    )
    .await?;
    create_tables(&conn).await?;
    Ok(conn)
}

/// A private database that disappears with the pool. Every connection to
/// `:memory:` is a separate database, so the pool is capped at one.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let conn = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    create_tables(&conn).await?;
    Ok(conn)
}

pub async fn create_tables(conn: &SqlitePool) -> Result<()> {
    tokio::try_join!(
        Author::create_table(conn),
        Book::create_table(conn),
        BookInstance::create_table(conn)
    )?;
    Ok(())
}
