//! Book instance (physical copy) model and form

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{book::BookSummary, catalog_url};
use crate::validation::{self, book_reference, book_status, valid_due_back, FormInput};

/// Copy availability
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "book_status")]
pub enum BookStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookStatus {
    pub const ALL: [BookStatus; 4] = [
        BookStatus::Available,
        BookStatus::Maintenance,
        BookStatus::Loaned,
        BookStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Maintenance => "Maintenance",
            BookStatus::Loaned => "Loaned",
            BookStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown book status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for BookStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

fn instance_url(id: Uuid) -> String {
    catalog_url("bookinstance", id)
}

/// Book instance record, serialized with its derived `url`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Uuid,
    pub imprint: String,
    pub status: BookStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstance {
    pub fn url(&self) -> String {
        instance_url(self.id)
    }
}

impl Serialize for BookInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BookInstance", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("book_id", &self.book_id)?;
        state.serialize_field("imprint", &self.imprint)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("due_back", &self.due_back)?;
        state.serialize_field("url", &self.url())?;
        state.end()
    }
}

/// Book instance with its book resolved
#[derive(Debug, Clone, ToSchema)]
pub struct PopulatedInstance {
    pub id: Uuid,
    pub imprint: String,
    pub status: BookStatus,
    pub due_back: Option<NaiveDate>,
    pub book: Option<BookSummary>,
}

impl PopulatedInstance {
    pub fn new(instance: BookInstance, book: Option<BookSummary>) -> Self {
        Self {
            id: instance.id,
            imprint: instance.imprint,
            status: instance.status,
            due_back: instance.due_back,
            book,
        }
    }

    /// Book title, or an empty string when the book is gone
    pub fn book_title(&self) -> &str {
        self.book.as_ref().map(|b| b.title.as_str()).unwrap_or_default()
    }
}

impl Serialize for PopulatedInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PopulatedInstance", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("imprint", &self.imprint)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("due_back", &self.due_back)?;
        state.serialize_field("book", &self.book)?;
        state.serialize_field("url", &instance_url(self.id))?;
        state.end()
    }
}

/// Book instance create/update form; an empty status means Maintenance
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookInstanceForm {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Book must be specified"),
        custom(function = "book_reference")
    )]
    pub book: String,
    #[serde(default)]
    #[validate(length(min = 5, message = "Imprint must be specified"))]
    pub imprint: String,
    #[serde(default)]
    #[validate(custom(function = "book_status"))]
    pub status: String,
    #[serde(default)]
    #[validate(custom(function = "valid_due_back"))]
    pub due_back: Option<String>,
}

impl FormInput for BookInstanceForm {
    const FIELDS: &'static [&'static str] = &["book", "imprint", "status", "due_back"];

    fn trim(&mut self) {
        validation::trim_in_place(&mut self.book);
        validation::trim_in_place(&mut self.imprint);
        validation::trim_in_place(&mut self.status);
        if self.status.is_empty() {
            self.status = BookStatus::default().to_string();
        }
        validation::trim_optional(&mut self.due_back);
    }

    fn escape(&mut self) {
        self.book = validation::escape(&self.book);
        self.imprint = validation::escape(&self.imprint);
        self.status = validation::escape(&self.status);
    }
}

impl BookInstanceForm {
    /// Build the record; only call on a form that passed validation
    pub fn to_record(&self, id: Uuid) -> BookInstance {
        BookInstance {
            id,
            book_id: Uuid::parse_str(&self.book).unwrap_or_default(),
            imprint: self.imprint.clone(),
            status: self.status.parse().unwrap_or_default(),
            due_back: self.due_back.as_deref().and_then(validation::parse_iso_date),
        }
    }
}

impl From<&BookInstance> for BookInstanceForm {
    fn from(instance: &BookInstance) -> Self {
        Self {
            book: instance.book_id.to_string(),
            imprint: validation::unescape(&instance.imprint),
            status: instance.status.to_string(),
            due_back: instance.due_back.map(|d| d.to_string()),
        }
    }
}
