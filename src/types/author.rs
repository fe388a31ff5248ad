use std::fmt::{Display, Write};

use anyhow::Result;
use derives::{DbTable, Id};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteQueryResult, FromRow};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, Styleable},
    traits::*,
    types::{timestamp::Timestamp, uuid::Uuid},
    validation::{ValidationErrors, MAX_NAME_LENGTH},
};

/// Placeholder for a year that isn't known.
pub const UNKNOWN_YEAR: &str = "NA";

#[derive(Default, Debug, Clone, PartialEq, Eq, FromRow, DbTable, Id, Serialize, Deserialize)]
pub struct Author {
    pub id:            Uuid,
    pub first_name:    String,
    pub family_name:   String,
    pub date_of_birth: Option<Timestamp>,
    pub date_of_death: Option<Timestamp>,
}

impl Author {
    pub fn new(first_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            id:            Uuid::new(),
            first_name:    first_name.into(),
            family_name:   family_name.into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    /// `"{first_name} {family_name}"`, or empty when either part is missing.
    pub fn name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            return String::new();
        }
        format!("{} {}", self.first_name, self.family_name)
    }

    pub fn date_of_birth_formatted(&self) -> String {
        year_or_unknown(&self.date_of_birth)
    }

    pub fn date_of_death_formatted(&self) -> String {
        year_or_unknown(&self.date_of_death)
    }

    /// Prefill value for date inputs; `None` when there's no date to show.
    pub fn date_of_birth_formatted_ymd(&self) -> Option<String> {
        self.date_of_birth.as_ref().map(Timestamp::ymd)
    }

    pub fn date_of_death_formatted_ymd(&self) -> Option<String> {
        self.date_of_death.as_ref().map(Timestamp::ymd)
    }

    pub fn lifespan(&self) -> String {
        match (&self.date_of_birth, &self.date_of_death) {
            (Some(born), Some(died)) => format!("( {} - {} )", born.year(), died.year()),
            (Some(born), None) => format!("( b: {} )", born.year()),
            _ => "( N/A )".to_string(),
        }
    }
}

fn year_or_unknown(date: &Option<Timestamp>) -> String {
    match date {
        Some(date) => date.year(),
        None => UNKNOWN_YEAR.to_string(),
    }
}

impl DetailPage for Author {}

impl Removeable for Author {}

impl Queryable for Author {
    const ORDER_BY: &'static str = "family_name, first_name";
}

impl Validate for Author {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .required_id("id", &self.id)
            .required("first_name", &self.first_name)
            .max_length("first_name", &self.first_name, MAX_NAME_LENGTH)
            .required("family_name", &self.family_name)
            .max_length("family_name", &self.family_name, MAX_NAME_LENGTH);
        errors.into_result()
    }
}

impl CreateTable for Author {
    async fn create_table(conn: &sqlx::SqlitePool) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY NOT NULL,
                first_name TEXT NOT NULL,
                family_name TEXT NOT NULL,
                date_of_birth INTEGER,
                date_of_death INTEGER
            );"#,
            Self::TABLE_NAME
        ))
        .execute(conn)
        .await?;
        Ok(())
    }
}

impl Insertable for Author {
    async fn insert<'e, E>(&self, conn: E) -> Result<SqliteQueryResult>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        if let Err(e) = self.validate() {
            warn!("Rejected author {}: {}", self.id, e);
            return Err(e.into());
        }
        debug!("Inserting author {}", self.id);
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {} ( id, first_name, family_name, date_of_birth, date_of_death )
            VALUES ( ?1, ?2, ?3, ?4, ?5 );
            "#,
            Self::TABLE_NAME
        ))
        .bind(&self.id)
        .bind(&self.first_name)
        .bind(&self.family_name)
        .bind(self.date_of_birth)
        .bind(self.date_of_death)
        .execute(conn)
        .await?;
        info!("Added author {} ({})", self.name(), self.id);
        Ok(result)
    }
}

impl Updateable for Author {
    async fn update(&mut self, conn: &sqlx::SqlitePool, new: Self) -> Result<SqliteQueryResult> {
        let new = Self {
            id: self.id.clone(),
            ..new
        };
        if let Err(e) = new.validate() {
            warn!("Rejected update of author {}: {}", self.id, e);
            return Err(e.into());
        }
        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET
                first_name = ?2,
                family_name = ?3,
                date_of_birth = ?4,
                date_of_death = ?5
            WHERE
                id = ?1;
            "#,
            Self::TABLE_NAME
        ))
        .bind(&new.id)
        .bind(&new.first_name)
        .bind(&new.family_name)
        .bind(new.date_of_birth)
        .bind(new.date_of_death)
        .execute(conn)
        .await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("No author with id {}", self.id);
        }
        info!("Updated author {}", self.id);
        *self = new;
        Ok(result)
    }
}

impl Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.first_name.is_empty(), self.family_name.is_empty()) {
            (true, true) => write!(f, "{}", self.id),
            (true, false) => write!(f, "{}, (First name unknown)", self.family_name),
            (false, true) => write!(f, "(Family name unknown), {}", self.first_name),
            (false, false) => write!(f, "{}, {}", self.family_name, self.first_name),
        }
    }
}

impl DisplayTerminal for Author {
    async fn fmt(&self, f: &mut String, _conn: &sqlx::SqlitePool, config: &Config) -> Result<()> {
        let output = &config.output_author;
        write!(
            f,
            "{} {}",
            self.to_string().style(&output.style_content),
            self.lifespan().style(&config.output_lifespan.style_content)
        )?;
        if output.display_uuid {
            write!(f, " {}", config.output_uuid.format_str(self.id.short()))?;
        }
        if config.display_url {
            write!(f, " {}", config.output_url.format_str(self.url()))?;
        }
        Ok(())
    }
}
