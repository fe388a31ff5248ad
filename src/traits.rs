use std::fmt::Write;

use anyhow::Result;
use sqlx::sqlite::{SqliteQueryResult, SqliteRow};
use sqlx::FromRow;
use tracing::{debug, info};

use crate::{config::Config, types::uuid::Uuid, validation::ValidationErrors};

pub trait DbTable {
    const NAME_SINGULAR: &'static str;
    const NAME_PLURAL: &'static str;
    const TABLE_NAME: &'static str = Self::NAME_PLURAL;
}

pub trait Id {
    fn id(&self) -> &Uuid;
}

/// Entities reachable under `/catalog/{name}/{id}`.
pub trait DetailPage: DbTable + Id {
    fn url(&self) -> String {
        format!("/catalog/{}/{}", Self::NAME_SINGULAR, self.id())
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub trait CreateTable {
    async fn create_table(conn: &sqlx::SqlitePool) -> Result<()>;
}

/// Takes any executor so a batch of inserts can share one transaction.
pub trait Insertable {
    async fn insert<'e, E>(&self, conn: E) -> Result<SqliteQueryResult>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
        Self: Sized;
}

pub trait Updateable {
    async fn update(&mut self, conn: &sqlx::SqlitePool, new: Self) -> Result<SqliteQueryResult>
    where
        Self: Sized;
}

pub trait Queryable: DbTable + Sized + Send + Unpin + for<'r> FromRow<'r, SqliteRow> {
    const ORDER_BY: &'static str = "rowid";

    async fn get_all(conn: &sqlx::SqlitePool) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT * FROM {} ORDER BY {};",
            Self::TABLE_NAME,
            Self::ORDER_BY
        );
        debug!("{}", sql);
        Ok(sqlx::query_as::<_, Self>(&sql).fetch_all(conn).await?)
    }

    async fn get_by_id(conn: &sqlx::SqlitePool, id: &Uuid) -> Result<Option<Self>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?1;", Self::TABLE_NAME);
        debug!("{} [{}]", sql, id);
        Ok(sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?)
    }

    /// Like [Queryable::get_by_id], but a missing row is an error.
    async fn get_existing(conn: &sqlx::SqlitePool, id: &Uuid) -> Result<Self> {
        match Self::get_by_id(conn, id).await? {
            Some(x) => Ok(x),
            None => anyhow::bail!("No {} with id {}", Self::NAME_SINGULAR, id),
        }
    }
}

pub trait Removeable: DbTable + Id {
    async fn remove(&self, conn: &sqlx::SqlitePool) -> Result<SqliteQueryResult> {
        let sql = format!("DELETE FROM {} WHERE id = ?1;", Self::TABLE_NAME);
        debug!("{} [{}]", sql, self.id());
        let result = sqlx::query(&sql).bind(self.id()).execute(conn).await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("No {} with id {}", Self::NAME_SINGULAR, self.id());
        }
        info!("Removed {} {}", Self::NAME_SINGULAR, self.id());
        Ok(result)
    }
}

pub trait DisplayTerminal {
    async fn fmt(&self, f: &mut String, conn: &sqlx::SqlitePool, config: &Config) -> Result<()>;

    async fn fmt_to_string(&self, conn: &sqlx::SqlitePool, config: &Config) -> Result<String> {
        let mut s = String::new();
        DisplayTerminal::fmt(self, &mut s, conn, config).await?;
        Ok(s)
    }
}

impl<T: DisplayTerminal> DisplayTerminal for Vec<T> {
    async fn fmt(&self, f: &mut String, conn: &sqlx::SqlitePool, config: &Config) -> Result<()> {
        for x in self {
            DisplayTerminal::fmt(x, f, conn, config).await?;
            writeln!(f)?;
        }
        Ok(())
    }
}
