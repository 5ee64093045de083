//! Presence and format checks shared by the request handlers.

use lettre::Address;
use uuid::Uuid;

use crate::errors::AppError;

/// Collects required string fields so a single error can name every missing one.
#[derive(Debug, Default)]
pub struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trimmed value, or records `name` as missing when absent or blank.
    pub fn take(&mut self, name: &'static str, value: Option<String>) -> String {
        match non_blank(value) {
            Some(v) => v,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    /// Like [`Required::take`] but hands the value back exactly as sent.
    /// Used for secrets, where surrounding whitespace is significant.
    pub fn take_untrimmed(&mut self, name: &'static str, value: Option<String>) -> String {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => v,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.missing.is_empty() {
            return Ok(());
        }
        Err(AppError::Validation(format!(
            "Missing required fields: {} {} required",
            self.missing.join(", "),
            if self.missing.len() == 1 { "is" } else { "are" }
        )))
    }
}

/// A field that may be omitted from a partial update but cannot be blanked.
pub fn optional_non_blank(name: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(v) => match non_blank(Some(v)) {
            Some(v) => Ok(Some(v)),
            None => Err(AppError::Validation(format!("{name} cannot be empty"))),
        },
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a path identifier. Malformed ids are a 400, never a 404.
pub fn parse_id(raw: &str, resource: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Validation(format!("Invalid {resource} ID format")))
}

/// An address the mail transports will accept, with a dotted domain.
///
/// Parsing goes through `lettre::Address` so that anything passing here can
/// also be used as a Reply-To or recipient further down the line.
pub fn is_valid_email(email: &str) -> bool {
    match email.parse::<Address>() {
        Ok(address) => {
            let domain = address.domain();
            domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        Err(_) => false,
    }
}
