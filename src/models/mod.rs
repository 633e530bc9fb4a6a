//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

// Re-export commonly used types
pub use author::{Author, AuthorForm};
pub use book::{Book, BookForm, BookListing, BookSummary, PopulatedBook};
pub use book_instance::{BookInstance, BookInstanceForm, BookStatus, PopulatedInstance};
pub use genre::{Genre, GenreForm};

use uuid::Uuid;

/// Location of a record's detail page, e.g. `/catalog/book/<id>`
pub fn catalog_url(segment: &str, id: Uuid) -> String {
    format!("/catalog/{}/{}", segment, id)
}
