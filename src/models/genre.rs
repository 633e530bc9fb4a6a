//! Genre model and form

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::catalog_url;
use crate::validation::{self, FormInput};

/// Genre record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

impl Genre {
    pub fn url(&self) -> String {
        catalog_url("genre", self.id)
    }
}

impl Serialize for Genre {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Genre", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("url", &self.url())?;
        state.end()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct GenreForm {
    #[serde(default)]
    #[validate(length(min = 3, message = "Genre name must contain at least 3 characters"))]
    pub name: String,
}

impl FormInput for GenreForm {
    const FIELDS: &'static [&'static str] = &["name"];

    fn trim(&mut self) {
        validation::trim_in_place(&mut self.name);
    }

    fn escape(&mut self) {
        self.name = validation::escape(&self.name);
    }
}

impl GenreForm {
    pub fn to_record(&self, id: Uuid) -> Genre {
        Genre {
            id,
            name: self.name.clone(),
        }
    }
}

impl From<&Genre> for GenreForm {
    fn from(genre: &Genre) -> Self {
        Self {
            name: validation::unescape(&genre.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::sanitize;

    #[test]
    fn test_name_needs_three_characters() {
        let mut form = GenreForm {
            name: "  SF ".to_string(),
        };
        let errors = sanitize(&mut form);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
        assert_eq!(
            errors[0].message,
            "Genre name must contain at least 3 characters"
        );
        assert_eq!(form.name, "SF");
    }

    #[test]
    fn test_prefill_round_trips_escaped_name() {
        let mut form = GenreForm {
            name: "Sword & Sorcery".to_string(),
        };
        assert!(sanitize(&mut form).is_empty());
        let stored = form.to_record(Uuid::new_v4());
        assert_eq!(stored.name, "Sword &amp; Sorcery");

        let mut again = GenreForm::from(&stored);
        assert_eq!(again.name, "Sword & Sorcery");
        assert!(sanitize(&mut again).is_empty());
        assert_eq!(again.to_record(stored.id), stored);
    }

    #[test]
    fn test_length_checked_before_escape() {
        let mut form = GenreForm {
            name: "<>".to_string(),
        };
        assert_eq!(sanitize(&mut form).len(), 1);
        assert_eq!(form.name, "&lt;&gt;");
    }

    #[test]
    fn test_valid_name() {
        let mut form = GenreForm {
            name: "Fantasy".to_string(),
        };
        assert!(sanitize(&mut form).is_empty());
        let id = Uuid::new_v4();
        assert_eq!(
            form.to_record(id),
            Genre {
                id,
                name: "Fantasy".to_string()
            }
        );
    }
}
