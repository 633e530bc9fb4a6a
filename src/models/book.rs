//! Book model, form and populated views

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{author::Author, catalog_url, genre::Genre};
use crate::validation::{self, author_reference, genre_references, FormInput};

fn book_url(id: Uuid) -> String {
    catalog_url("book", id)
}

/// Book record; author and genres are stored as identifiers.
///
/// This and the book views below serialize with the derived `url`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<Uuid>,
}

impl Book {
    pub fn url(&self) -> String {
        book_url(self.id)
    }
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Book", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("author_id", &self.author_id)?;
        state.serialize_field("summary", &self.summary)?;
        state.serialize_field("isbn", &self.isbn)?;
        state.serialize_field("genre_ids", &self.genre_ids)?;
        state.serialize_field("url", &self.url())?;
        state.end()
    }
}

/// Short book entry used in dependents and selection lists
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
}

impl Serialize for BookSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BookSummary", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("summary", &self.summary)?;
        state.serialize_field("url", &book_url(self.id))?;
        state.end()
    }
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            summary: book.summary.clone(),
        }
    }
}

/// Book list entry with its author resolved
#[derive(Debug, Clone, ToSchema)]
pub struct BookListing {
    pub id: Uuid,
    pub title: String,
    pub author: Option<Author>,
}

impl Serialize for BookListing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BookListing", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("author", &self.author)?;
        state.serialize_field("url", &book_url(self.id))?;
        state.end()
    }
}

/// Book with author and genres resolved
#[derive(Debug, Clone, ToSchema)]
pub struct PopulatedBook {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
}

impl Serialize for PopulatedBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PopulatedBook", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("summary", &self.summary)?;
        state.serialize_field("isbn", &self.isbn)?;
        state.serialize_field("author", &self.author)?;
        state.serialize_field("genres", &self.genres)?;
        state.serialize_field("url", &book_url(self.id))?;
        state.end()
    }
}

/// Book create/update form. `genre` may repeat.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title must not be empty."))]
    pub title: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Author must not be empty."),
        custom(function = "author_reference")
    )]
    pub author: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Summary must not be empty."))]
    pub summary: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "ISBN must not be empty"))]
    pub isbn: String,
    #[serde(default)]
    #[validate(custom(function = "genre_references"))]
    pub genre: Vec<String>,
}

impl FormInput for BookForm {
    const FIELDS: &'static [&'static str] = &["title", "author", "summary", "isbn", "genre"];

    fn trim(&mut self) {
        validation::trim_in_place(&mut self.title);
        validation::trim_in_place(&mut self.author);
        validation::trim_in_place(&mut self.summary);
        validation::trim_in_place(&mut self.isbn);
        for genre in &mut self.genre {
            validation::trim_in_place(genre);
        }
        self.genre.retain(|g| !g.is_empty());
    }

    fn escape(&mut self) {
        self.title = validation::escape(&self.title);
        self.author = validation::escape(&self.author);
        self.summary = validation::escape(&self.summary);
        self.isbn = validation::escape(&self.isbn);
        for genre in &mut self.genre {
            *genre = validation::escape(genre);
        }
    }
}

impl BookForm {
    /// Build the record; only call on a form that passed validation
    pub fn to_record(&self, id: Uuid) -> Book {
        Book {
            id,
            title: self.title.clone(),
            author_id: Uuid::parse_str(&self.author).unwrap_or_default(),
            summary: self.summary.clone(),
            isbn: self.isbn.clone(),
            genre_ids: self
                .genre
                .iter()
                .filter_map(|g| Uuid::parse_str(g).ok())
                .collect(),
        }
    }

    /// Whether `genre` is among the selected genres
    pub fn selects_genre(&self, genre: Uuid) -> bool {
        let id = genre.to_string();
        self.genre.iter().any(|g| *g == id)
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: validation::unescape(&book.title),
            author: book.author_id.to_string(),
            summary: validation::unescape(&book.summary),
            isbn: validation::unescape(&book.isbn),
            genre: book.genre_ids.iter().map(Uuid::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::sanitize;

    fn valid_form() -> BookForm {
        BookForm {
            title: "The Name of the Wind".to_string(),
            author: Uuid::new_v4().to_string(),
            summary: "A story.".to_string(),
            isbn: "9780756404079".to_string(),
            genre: vec![Uuid::new_v4().to_string()],
        }
    }

    #[test]
    fn test_all_empty_fields_reported_in_order() {
        let mut form = BookForm::default();
        let errors = sanitize(&mut form);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "author", "summary", "isbn"]);
        assert_eq!(errors[3].message, "ISBN must not be empty");
    }

    #[test]
    fn test_malformed_references() {
        let mut form = valid_form();
        form.author = "somebody".to_string();
        form.genre.push("fantasy".to_string());
        let errors = sanitize(&mut form);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Author must be a valid identifier.");
        assert_eq!(errors[1].message, "Genre selection is invalid.");
    }

    #[test]
    fn test_prefill_round_trips_escaped_text() {
        let mut form = valid_form();
        form.title = "Tom & Jerry".to_string();
        form.summary = "Cat <vs> mouse".to_string();
        assert!(sanitize(&mut form).is_empty());
        let stored = form.to_record(Uuid::new_v4());
        assert_eq!(stored.title, "Tom &amp; Jerry");

        let mut again = BookForm::from(&stored);
        assert_eq!(again.title, "Tom & Jerry");
        assert!(sanitize(&mut again).is_empty());
        assert_eq!(again.to_record(stored.id), stored);
    }

    #[test]
    fn test_views_carry_url() {
        let book = valid_form().to_record(Uuid::new_v4());
        let url = format!("/catalog/book/{}", book.id);
        assert_eq!(book.url(), url);
        assert_eq!(serde_json::to_value(&book).unwrap()["url"], url);
        let summary = BookSummary::from(&book);
        assert_eq!(serde_json::to_value(&summary).unwrap()["url"], url);
        let listing = BookListing {
            id: book.id,
            title: book.title.clone(),
            author: None,
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["url"], url);
        assert!(json["author"].is_null());
    }

    #[test]
    fn test_to_record_keeps_references() {
        let mut form = valid_form();
        form.genre.push("  ".to_string());
        assert!(sanitize(&mut form).is_empty());
        let book = form.to_record(Uuid::new_v4());
        assert_eq!(book.author_id.to_string(), form.author);
        assert_eq!(book.genre_ids.len(), 1);
        assert!(form.selects_genre(book.genre_ids[0]));
        assert!(!form.selects_genre(Uuid::new_v4()));
    }
}
