//! Author model and form

use chrono::NaiveDate;
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::catalog_url;
use crate::validation::{
    self, family_name_chars, first_name_chars, valid_date_of_birth, valid_date_of_death,
    FormInput,
};

/// Author record, serialized with its derived `name`, `lifespan` and `url`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Display name, "family, first"
    pub fn name(&self) -> String {
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// e.g. "1815 - 1852"; either side may be blank
    pub fn lifespan(&self) -> String {
        let year = |d: Option<NaiveDate>| d.map(|d| d.format("%Y").to_string()).unwrap_or_default();
        format!("{} - {}", year(self.date_of_birth), year(self.date_of_death))
    }

    pub fn url(&self) -> String {
        catalog_url("author", self.id)
    }
}

impl Serialize for Author {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Author", 8)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("first_name", &self.first_name)?;
        state.serialize_field("family_name", &self.family_name)?;
        state.serialize_field("date_of_birth", &self.date_of_birth)?;
        state.serialize_field("date_of_death", &self.date_of_death)?;
        state.serialize_field("name", &self.name())?;
        state.serialize_field("lifespan", &self.lifespan())?;
        state.serialize_field("url", &self.url())?;
        state.end()
    }
}

/// Author create/update form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AuthorForm {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "First name must be specified."),
        custom(function = "first_name_chars")
    )]
    pub first_name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Family name must be specified."),
        custom(function = "family_name_chars")
    )]
    pub family_name: String,
    #[serde(default)]
    #[validate(custom(function = "valid_date_of_birth"))]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "valid_date_of_death"))]
    pub date_of_death: Option<String>,
}

impl FormInput for AuthorForm {
    const FIELDS: &'static [&'static str] =
        &["first_name", "family_name", "date_of_birth", "date_of_death"];

    fn trim(&mut self) {
        validation::trim_in_place(&mut self.first_name);
        validation::trim_in_place(&mut self.family_name);
        validation::trim_optional(&mut self.date_of_birth);
        validation::trim_optional(&mut self.date_of_death);
    }

    fn escape(&mut self) {
        self.first_name = validation::escape(&self.first_name);
        self.family_name = validation::escape(&self.family_name);
    }
}

impl AuthorForm {
    /// Build the record; only call on a form that passed validation
    pub fn to_record(&self, id: Uuid) -> Author {
        Author {
            id,
            first_name: self.first_name.clone(),
            family_name: self.family_name.clone(),
            date_of_birth: self.date_of_birth.as_deref().and_then(validation::parse_iso_date),
            date_of_death: self.date_of_death.as_deref().and_then(validation::parse_iso_date),
        }
    }
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            first_name: validation::unescape(&author.first_name),
            family_name: validation::unescape(&author.family_name),
            date_of_birth: author.date_of_birth.map(|d| d.to_string()),
            date_of_death: author.date_of_death.map(|d| d.to_string()),
        }
    }
}
