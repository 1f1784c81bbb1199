//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::validation::{self, parse_date, trim, FieldError, FormInput};

/// Full author model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    pub fn url(&self) -> String {
        super::catalog_url("author", self.id)
    }

    /// "Family, First", or empty when either part is missing
    pub fn name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            return String::new();
        }
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// "birth - death" with unknown sides left blank
    pub fn lifespan(&self) -> String {
        let side = |d: Option<NaiveDate>| d.map(super::display_date).unwrap_or_default();
        format!("{} - {}", side(self.date_of_birth), side(self.date_of_death))
    }
}

/// Validated author values for create and full-replace update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorFields {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Author form as submitted
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AuthorInput {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "First name must be specified."),
        custom(function = "validation::first_name_chars")
    )]
    pub first_name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Family name must be specified."),
        custom(function = "validation::family_name_chars")
    )]
    pub family_name: String,
    #[serde(default)]
    #[validate(custom(function = "validation::birth_date"))]
    pub date_of_birth: String,
    #[serde(default)]
    #[validate(custom(function = "validation::death_date"))]
    pub date_of_death: String,
}

impl From<&Author> for AuthorInput {
    fn from(author: &Author) -> Self {
        let iso = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        Self {
            first_name: author.first_name.clone(),
            family_name: author.family_name.clone(),
            date_of_birth: iso(author.date_of_birth),
            date_of_death: iso(author.date_of_death),
        }
    }
}

impl FormInput for AuthorInput {
    type Fields = AuthorFields;

    const FIELDS: &'static [&'static str] =
        &["first_name", "family_name", "date_of_birth", "date_of_death"];

    fn normalized(self) -> Self {
        Self {
            first_name: trim(&self.first_name),
            family_name: trim(&self.family_name),
            date_of_birth: trim(&self.date_of_birth),
            date_of_death: trim(&self.date_of_death),
        }
    }

    fn to_fields(&self) -> Result<AuthorFields, Vec<FieldError>> {
        let date_of_birth = parse_date(&self.date_of_birth)
            .map_err(|_| vec![FieldError::new("date_of_birth", "Invalid date of birth.")])?;
        let date_of_death = parse_date(&self.date_of_death)
            .map_err(|_| vec![FieldError::new("date_of_death", "Invalid date of death.")])?;

        Ok(AuthorFields {
            first_name: self.first_name.clone(),
            family_name: self.family_name.clone(),
            date_of_birth,
            date_of_death,
        })
    }
}
