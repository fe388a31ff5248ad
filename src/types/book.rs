use std::fmt::{Display, Write};

use anyhow::Result;
use derives::{DbTable, Id};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteQueryResult, FromRow};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, Styleable},
    traits::*,
    types::{book_instance::BookInstance, uuid::Uuid},
    validation::ValidationErrors,
};

/// The work that copies ([BookInstance]) are made of. Only carries what's
/// needed to resolve and show the reference.
#[derive(Default, Debug, Clone, PartialEq, Eq, FromRow, DbTable, Id, Serialize, Deserialize)]
pub struct Book {
    pub id:    Uuid,
    pub title: String,
}

impl Book {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id:    Uuid::new(),
            title: title.into(),
        }
    }

    pub async fn instances(&self, conn: &sqlx::SqlitePool) -> Result<Vec<BookInstance>> {
        BookInstance::get_all_for_book(conn, &self.id).await
    }
}

impl DetailPage for Book {}

impl Removeable for Book {}

impl Queryable for Book {
    const ORDER_BY: &'static str = "title";
}

impl Validate for Book {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .required_id("id", &self.id)
            .required("title", &self.title);
        errors.into_result()
    }
}

impl CreateTable for Book {
    async fn create_table(conn: &sqlx::SqlitePool) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL
            );"#,
            Self::TABLE_NAME
        ))
        .execute(conn)
        .await?;
        Ok(())
    }
}

impl Insertable for Book {
    async fn insert<'e, E>(&self, conn: E) -> Result<SqliteQueryResult>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        if let Err(e) = self.validate() {
            warn!("Rejected book {}: {}", self.id, e);
            return Err(e.into());
        }
        debug!("Inserting book {}", self.id);
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {} ( id, title )
            VALUES ( ?1, ?2 );
            "#,
            Self::TABLE_NAME
        ))
        .bind(&self.id)
        .bind(&self.title)
        .execute(conn)
        .await?;
        info!("Added book {:?} ({})", self.title, self.id);
        Ok(result)
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl DisplayTerminal for Book {
    async fn fmt(&self, f: &mut String, _conn: &sqlx::SqlitePool, config: &Config) -> Result<()> {
        write!(f, "{}", self.title.style(&config.output_book.style_content))?;
        if config.output_book.display_uuid {
            write!(f, " {}", config.output_uuid.format_str(self.id.short()))?;
        }
        if config.display_url {
            write!(f, " {}", config.output_url.format_str(self.url()))?;
        }
        Ok(())
    }
}
