//! Form validation helpers shared by all catalog forms.
//!
//! Form values arrive as raw strings. Each input type trims them, runs the
//! `validator` rules declared on its fields, then converts to typed fields.
//! Errors are reported as `(field, message)` pairs in form order.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

/// A single failed rule on a submitted form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Raw form submission for one catalog entity
pub trait FormInput: Validate + Sized {
    /// Typed, validated values handed to the store
    type Fields: Send;

    /// Field names in the order they appear on the form
    const FIELDS: &'static [&'static str];

    /// Trim every value; repeated fields drop blank entries.
    fn normalized(self) -> Self;

    /// Convert values that already passed `validate` into typed fields.
    fn to_fields(&self) -> Result<Self::Fields, Vec<FieldError>>;

    /// Run declared rules, then conversion.
    fn parse(&self) -> Result<Self::Fields, Vec<FieldError>> {
        if let Err(errors) = self.validate() {
            return Err(ordered_errors(&errors, Self::FIELDS));
        }
        self.to_fields()
    }
}

/// Flatten `validator` errors into form order.
pub fn ordered_errors(errors: &ValidationErrors, order: &[&str]) -> Vec<FieldError> {
    let mut flat: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |err| FieldError {
                field: field.clone(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", err.code)),
            })
        })
        .collect();

    flat.sort_by_key(|e| {
        order
            .iter()
            .position(|name| *name == e.field)
            .unwrap_or(order.len())
    });
    flat
}

pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Parse an optional `YYYY-MM-DD` form value; blank means absent.
pub fn parse_date(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map(Some)
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn optional_date(value: &str, message: &'static str) -> Result<(), ValidationError> {
    parse_date(value)
        .map(|_| ())
        .map_err(|_| rule("iso_date", message))
}

/// Blank or a valid calendar date
pub fn due_back_date(value: &str) -> Result<(), ValidationError> {
    optional_date(value, "Invalid date.")
}

pub fn birth_date(value: &str) -> Result<(), ValidationError> {
    optional_date(value, "Invalid date of birth.")
}

pub fn death_date(value: &str) -> Result<(), ValidationError> {
    optional_date(value, "Invalid date of death.")
}

pub fn first_name_chars(value: &str) -> Result<(), ValidationError> {
    name_chars(value, "First name has non-alphanumeric characters.")
}

pub fn family_name_chars(value: &str) -> Result<(), ValidationError> {
    name_chars(value, "Family name has non-alphanumeric characters.")
}

fn name_chars(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.chars().count() > 100 {
        return Err(rule("length", "Name must be at most 100 characters."));
    }
    if !value.chars().all(char::is_alphanumeric) {
        return Err(rule("alphanumeric", message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("").unwrap(), None);
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn test_name_chars() {
        assert!(first_name_chars("Ursula").is_ok());
        assert!(first_name_chars("Élodie").is_ok());
        let err = first_name_chars("Le Guin").unwrap_err();
        assert_eq!(err.code, "alphanumeric");
        let err = family_name_chars(&"x".repeat(101)).unwrap_err();
        assert_eq!(err.code, "length");
    }

    #[test]
    fn test_trim() {
        assert_eq!(trim("  Dune "), "Dune");
        assert_eq!(trim("Dune"), "Dune");
    }
}
