use std::fmt::Write;

use anyhow::Result;
use chrono_humanize::HumanTime;
use derives::{DbTable, Id};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteQueryResult, FromRow};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, Styleable},
    traits::*,
    types::{book::Book, status::Status, timestamp::Timestamp, uuid::Uuid},
    validation::ValidationErrors,
};

/// A physical copy of a [Book].
#[derive(Debug, Clone, PartialEq, Eq, FromRow, DbTable, Id, Serialize, Deserialize)]
pub struct BookInstance {
    pub id:       Uuid,
    pub book:     Uuid,
    pub imprint:  String,
    pub status:   Status,
    pub due_back: Timestamp,
}

impl BookInstance {
    /// A copy in maintenance, due back now.
    pub fn new(book: Uuid, imprint: impl Into<String>) -> Self {
        Self {
            id: Uuid::new(),
            book,
            imprint: imprint.into(),
            status: Status::default(),
            due_back: Timestamp::now(),
        }
    }

    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }

    pub fn with_due_back(self, due_back: Timestamp) -> Self {
        Self { due_back, ..self }
    }

    pub fn due_back_formatted(&self) -> String {
        self.due_back.medium()
    }

    pub fn due_back_formatted_ymd(&self) -> String {
        self.due_back.ymd()
    }

    /// Resolves the referenced book, which may have been removed since.
    pub async fn book(&self, conn: &sqlx::SqlitePool) -> Result<Option<Book>> {
        Book::get_by_id(conn, &self.book).await
    }

    pub async fn get_all_for_book(conn: &sqlx::SqlitePool, book: &Uuid) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT * FROM {} WHERE book = ?1 ORDER BY {};",
            Self::TABLE_NAME,
            Self::ORDER_BY
        );
        debug!("{} [{}]", sql, book);
        Ok(sqlx::query_as::<_, Self>(&sql)
            .bind(book)
            .fetch_all(conn)
            .await?)
    }
}

impl DetailPage for BookInstance {}

impl Removeable for BookInstance {}

impl Queryable for BookInstance {
    const ORDER_BY: &'static str = "due_back, imprint";
}

impl Validate for BookInstance {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .required_id("id", &self.id)
            .required_id("book", &self.book)
            .required("imprint", &self.imprint);
        errors.into_result()
    }
}

impl CreateTable for BookInstance {
    async fn create_table(conn: &sqlx::SqlitePool) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY NOT NULL,
                book TEXT NOT NULL,
                imprint TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT '{}' CHECK (status IN ({})),
                due_back INTEGER NOT NULL
            );"#,
            Self::TABLE_NAME,
            Status::default(),
            Status::sql_list()
        ))
        .execute(conn)
        .await?;
        Ok(())
    }
}

impl Insertable for BookInstance {
    async fn insert<'e, E>(&self, conn: E) -> Result<SqliteQueryResult>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        if let Err(e) = self.validate() {
            warn!("Rejected book instance {}: {}", self.id, e);
            return Err(e.into());
        }
        debug!("Inserting book instance {}", self.id);
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {} ( id, book, imprint, status, due_back )
            VALUES ( ?1, ?2, ?3, ?4, ?5 );
            "#,
            Self::TABLE_NAME
        ))
        .bind(&self.id)
        .bind(&self.book)
        .bind(&self.imprint)
        .bind(self.status)
        .bind(self.due_back)
        .execute(conn)
        .await?;
        info!("Added copy {:?} of book {} ({})", self.imprint, self.book, self.id);
        Ok(result)
    }
}

impl Updateable for BookInstance {
    async fn update(&mut self, conn: &sqlx::SqlitePool, new: Self) -> Result<SqliteQueryResult> {
        let new = Self {
            id: self.id.clone(),
            ..new
        };
        if let Err(e) = new.validate() {
            warn!("Rejected update of book instance {}: {}", self.id, e);
            return Err(e.into());
        }
        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET
                book = ?2,
                imprint = ?3,
                status = ?4,
                due_back = ?5
            WHERE
                id = ?1;
            "#,
            Self::TABLE_NAME
        ))
        .bind(&new.id)
        .bind(&new.book)
        .bind(&new.imprint)
        .bind(new.status)
        .bind(new.due_back)
        .execute(conn)
        .await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("No bookinstance with id {}", self.id);
        }
        if self.status != new.status {
            info!("Copy {} went from {} to {}", self.id, self.status, new.status);
        }
        *self = new;
        Ok(result)
    }
}

impl DisplayTerminal for BookInstance {
    async fn fmt(&self, f: &mut String, conn: &sqlx::SqlitePool, config: &Config) -> Result<()> {
        match self.book(conn).await? {
            Some(book) => DisplayTerminal::fmt(&book, f, conn, config).await?,
            None => write!(f, "{}", config.output_error.format_str("missing book"))?,
        }
        write!(
            f,
            ": {} {}",
            self.imprint.style(&config.output_book_instance.style_content),
            config.output_status.format_str(self.status)
        )?;
        if self.status != Status::Available {
            let due = HumanTime::from(self.due_back.0);
            write!(
                f,
                " {}",
                config
                    .output_due_back
                    .format_str(format!("{} ({})", self.due_back_formatted(), due))
            )?;
        }
        if config.output_book_instance.display_uuid {
            write!(f, " {}", config.output_uuid.format_str(self.id.short()))?;
        }
        if config.display_url {
            write!(f, " {}", config.output_url.format_str(self.url()))?;
        }
        Ok(())
    }
}
