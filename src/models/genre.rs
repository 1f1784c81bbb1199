//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::validation::{trim, FieldError, FormInput};

/// Genre record. Names are unique under case-insensitive comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

impl Genre {
    pub fn url(&self) -> String {
        super::catalog_url("genre", self.id)
    }
}

/// Genre form as submitted
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GenreInput {
    #[serde(default)]
    #[validate(length(
        min = 3,
        max = 100,
        message = "Genre name must contain between 3 and 100 characters."
    ))]
    pub name: String,
}

impl From<&Genre> for GenreInput {
    fn from(genre: &Genre) -> Self {
        Self {
            name: genre.name.clone(),
        }
    }
}

impl FormInput for GenreInput {
    type Fields = String;

    const FIELDS: &'static [&'static str] = &["name"];

    fn normalized(self) -> Self {
        Self {
            name: trim(&self.name),
        }
    }

    fn to_fields(&self) -> Result<String, Vec<FieldError>> {
        Ok(self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_rejected() {
        let input = GenreInput {
            name: "  SF  ".to_string(),
        }
        .normalized();
        let errors = input.parse().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn test_name_is_trimmed() {
        let input = GenreInput {
            name: "  Poetry ".to_string(),
        }
        .normalized();
        assert_eq!(input.parse().unwrap(), "Poetry");
    }
}
