use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    traits::*,
    types::{author::Author, book::Book, book_instance::BookInstance},
};

/// Contains the entire state of the database
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub authors:        Vec<Author>,
    pub books:          Vec<Book>,
    pub book_instances: Vec<BookInstance>,
}

impl State {
    /// Generate [State] struct from database
    pub async fn load(conn: &sqlx::SqlitePool) -> Result<Self> {
        Ok(Self {
            authors:        Author::get_all(conn).await?,
            books:          Book::get_all(conn).await?,
            book_instances: BookInstance::get_all(conn).await?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty() && self.books.is_empty() && self.book_instances.is_empty()
    }

    /// Sort all fields on [State]
    pub fn sort(&mut self) {
        self.authors.sort_by(|a, b| a.id.cmp(&b.id));
        self.books.sort_by(|a, b| a.id.cmp(&b.id));
        self.book_instances.sort_by(|a, b| a.id.cmp(&b.id));
    }

    /// Serialize the state to a string
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from a string to state, errors point at the offending field
    pub fn deserialize(s: &str) -> Result<State> {
        let de = &mut serde_json::Deserializer::from_str(s);
        Ok(serde_path_to_error::deserialize(de)?)
    }

    /// Insert everything into the database in a single transaction, so a
    /// rejected record leaves nothing behind. Books go in before their copies.
    pub async fn rebuild(&self, conn: &sqlx::SqlitePool) -> Result<()> {
        let mut tx = conn.begin().await?;
        for author in &self.authors {
            author.insert(&mut tx).await?;
        }
        for book in &self.books {
            book.insert(&mut tx).await?;
        }
        for book_instance in &self.book_instances {
            book_instance.insert(&mut tx).await?;
        }
        tx.commit().await?;
        info!(
            "Restored {} authors, {} books and {} copies",
            self.authors.len(),
            self.books.len(),
            self.book_instances.len()
        );
        Ok(())
    }
}
