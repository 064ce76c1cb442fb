//! Field rules shared by users and microposts. Every rule runs, and every failure is collected,
//! so callers can show the whole list at once instead of fixing one field per round trip.
use crate::twoface::{Cause, Describe, ExternalError, TfError};
use regex::Regex;
use std::fmt;
use thiserror::Error;

pub const NAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 255;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const MICROPOST_MAX_LEN: usize = 140;

lazy_static! {
    // ASCII only: with Unicode on, `\w` takes letters from any script and `(?i)` lets `[a-z]`
    // match the Kelvin sign.
    static ref VALID_EMAIL: Regex =
        Regex::new(r"(?i-u)\A[\w+\-.]+@[a-z\d\-]+(\.[a-z\d\-]+)*\.[a-z]+\z")
            .expect("email regex should compile");
}

/// One broken rule on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Every rule a record broke. Empty means the record is valid.
#[derive(Debug, Default, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {errors:?}")]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Was this field rejected for any reason?
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was collected, otherwise a twoface error carrying every field error.
    pub fn into_result(self) -> Result<(), TfError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    pub fn into_error(self) -> TfError {
        self.describe(ExternalError {
            cause: Cause::UserInvalidField,
            text: "one or more fields are invalid",
        })
    }
}

/// Blank means empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn check_present(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if is_blank(value) {
        errors.add(field, "can't be blank");
    }
}

pub fn check_max_len(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("is too long (maximum is {} characters)", max));
    }
}

pub fn check_min_len(errors: &mut ValidationErrors, field: &'static str, value: &str, min: usize) {
    if value.chars().count() < min {
        errors.add(field, format!("is too short (minimum is {} characters)", min));
    }
}

/// Format only. Blank emails are reported by `check_present`, so they're skipped here.
pub fn check_email_format(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if !is_blank(value) && !VALID_EMAIL.is_match(value) {
        errors.add(field, "is invalid");
    }
}

/// Emails are compared and stored in lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
