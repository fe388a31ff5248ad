pub mod status;
pub mod timestamp;
pub mod uuid;

pub mod author;
pub mod book;
pub mod book_instance;
