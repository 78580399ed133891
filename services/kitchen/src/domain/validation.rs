//! Field-level validation errors collected before any write.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::KitchenServiceError;

/// Messages keyed by field path (`title`, `steps.0.instruction`, `ingredients.2`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), KitchenServiceError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(KitchenServiceError::Validation(self))
        }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> KitchenServiceError {
        let mut errors = Self::new();
        errors.add(field, message);
        KitchenServiceError::Validation(errors)
    }
}

// ── Field checks ─────────────────────────────────────────────────────────────

pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Trim, and treat blank as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn check_required(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, format!("{field} is required"));
    } else if char_len(value) > max {
        errors.add(field, format!("{field} may not be greater than {max} characters"));
    }
}

pub fn check_max_len(errors: &mut ValidationErrors, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        if char_len(value) > max {
            errors.add(field, format!("{field} may not be greater than {max} characters"));
        }
    }
}

pub fn check_range<T>(errors: &mut ValidationErrors, field: &str, value: Option<T>, min: T, max: T)
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if let Some(value) = value {
        if value < min || value > max {
            errors.add(field, format!("{field} must be between {min} and {max}"));
        }
    }
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain.
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

pub fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
        && !value.chars().any(char::is_whitespace)
}
