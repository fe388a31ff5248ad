use anyhow::Result;
use serde::Serialize;

use crate::{
    traits::*,
    types::{author::Author, book_instance::BookInstance},
};

#[derive(Debug, Default, Serialize)]
pub struct AuthorRecord {
    #[serde(rename = "Name")]
    name:          String,
    #[serde(rename = "Lifespan")]
    lifespan:      String,
    #[serde(rename = "Date of Birth")]
    date_of_birth: Option<String>,
    #[serde(rename = "Date of Death")]
    date_of_death: Option<String>,
    #[serde(rename = "URL")]
    url:           String,
}

impl From<&Author> for AuthorRecord {
    fn from(author: &Author) -> Self {
        Self {
            name:          author.name(),
            lifespan:      author.lifespan(),
            date_of_birth: author.date_of_birth_formatted_ymd(),
            date_of_death: author.date_of_death_formatted_ymd(),
            url:           author.url(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct BookInstanceRecord {
    #[serde(rename = "Book Id")]
    book_id:  String,
    #[serde(rename = "Imprint")]
    imprint:  String,
    #[serde(rename = "Status")]
    status:   String,
    #[serde(rename = "Due Back")]
    due_back: String,
    #[serde(rename = "URL")]
    url:      String,
}

impl From<&BookInstance> for BookInstanceRecord {
    fn from(book_instance: &BookInstance) -> Self {
        Self {
            book_id:  book_instance.book.to_string(),
            imprint:  book_instance.imprint.clone(),
            status:   book_instance.status.to_string(),
            due_back: book_instance.due_back_formatted(),
            url:      book_instance.url(),
        }
    }
}

pub async fn export_authors(conn: &sqlx::SqlitePool, wtr: impl std::io::Write) -> Result<()> {
    let authors = Author::get_all(conn).await?;
    write_records(authors.iter().map(AuthorRecord::from), wtr)
}

pub async fn export_book_instances(
    conn: &sqlx::SqlitePool,
    wtr: impl std::io::Write,
) -> Result<()> {
    let book_instances = BookInstance::get_all(conn).await?;
    write_records(book_instances.iter().map(BookInstanceRecord::from), wtr)
}

pub fn write_records<T: Serialize>(
    data: impl IntoIterator<Item = T>,
    wtr: impl std::io::Write,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(wtr);
    for record in data {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
