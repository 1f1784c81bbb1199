//! Book instance (physical copy) model and related types

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{
    book::BookTitle,
    validation::{self, parse_date, trim, FieldError, FormInput},
};

/// Copy availability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl InstanceStatus {
    pub const ALL: [InstanceStatus; 4] = [
        InstanceStatus::Maintenance,
        InstanceStatus::Available,
        InstanceStatus::Loaned,
        InstanceStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Available => "Available",
            InstanceStatus::Maintenance => "Maintenance",
            InstanceStatus::Loaned => "Loaned",
            InstanceStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstanceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown book instance status: {}", s))
    }
}

/// Stored copy, referencing its book by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Uuid,
    pub imprint: String,
    pub status: InstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstance {
    pub fn url(&self) -> String {
        super::catalog_url("bookinstance", self.id)
    }

    pub fn due_back_formatted(&self) -> String {
        self.due_back.map(super::display_date).unwrap_or_default()
    }
}

/// Copy with its book populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookInstanceDetail {
    pub id: Uuid,
    pub book: BookTitle,
    pub imprint: String,
    pub status: InstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstanceDetail {
    pub fn url(&self) -> String {
        super::catalog_url("bookinstance", self.id)
    }

    pub fn due_back_formatted(&self) -> String {
        self.due_back.map(super::display_date).unwrap_or_default()
    }
}

/// Validated copy values for create and full-replace update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInstanceFields {
    pub book_id: Uuid,
    pub imprint: String,
    pub status: InstanceStatus,
    pub due_back: Option<NaiveDate>,
}

fn known_status(value: &str) -> Result<(), ValidationError> {
    if value.parse::<InstanceStatus>().is_ok() {
        return Ok(());
    }
    let mut err = ValidationError::new("status");
    err.message = Some("Invalid status.".into());
    Err(err)
}

/// Copy form as submitted
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookInstanceInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Book must be specified."))]
    pub book: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Imprint must be specified."))]
    pub imprint: String,
    #[serde(default)]
    #[validate(custom(function = "known_status"))]
    pub status: String,
    #[serde(default)]
    #[validate(custom(function = "validation::due_back_date"))]
    pub due_back: String,
}

impl Default for BookInstanceInput {
    fn default() -> Self {
        Self {
            book: String::new(),
            imprint: String::new(),
            status: InstanceStatus::default().to_string(),
            due_back: String::new(),
        }
    }
}

impl From<&BookInstanceDetail> for BookInstanceInput {
    fn from(instance: &BookInstanceDetail) -> Self {
        Self {
            book: instance.book.id.to_string(),
            imprint: instance.imprint.clone(),
            status: instance.status.to_string(),
            due_back: instance.due_back.map(|d| d.to_string()).unwrap_or_default(),
        }
    }
}

impl FormInput for BookInstanceInput {
    type Fields = BookInstanceFields;

    const FIELDS: &'static [&'static str] = &["book", "imprint", "status", "due_back"];

    fn normalized(self) -> Self {
        Self {
            book: trim(&self.book),
            imprint: trim(&self.imprint),
            status: trim(&self.status),
            due_back: trim(&self.due_back),
        }
    }

    fn to_fields(&self) -> Result<BookInstanceFields, Vec<FieldError>> {
        let book_id = Uuid::parse_str(&self.book)
            .map_err(|_| vec![FieldError::new("book", "Book not found.")])?;
        let status = self
            .status
            .parse()
            .map_err(|_| vec![FieldError::new("status", "Invalid status.")])?;
        let due_back = parse_date(&self.due_back)
            .map_err(|_| vec![FieldError::new("due_back", "Invalid date.")])?;

        Ok(BookInstanceFields {
            book_id,
            imprint: self.imprint.clone(),
            status,
            due_back,
        })
    }
}
