//! User-facing message catalogue.
//!
//! Every message is non-empty and distinct within its category so the UI can
//! show exactly one sentence per problem.

use crate::field::Field;
use crate::outcome::VerifyFailure;

/// General banner shown when the claim request got no response at all.
pub const SUBMIT_TRANSPORT_MESSAGE: &str =
    "We couldn't reach the server. Please check your connection and submit again.";

pub fn field_required_message(field: Field) -> &'static str {
    match field {
        Field::OrderId => "Please enter your order ID.",
        Field::FullName => "Please enter your full name.",
        Field::Email => "Please enter your email address.",
        Field::PhoneNumber => "Please enter your phone number.",
    }
}

/// Format message for fields that carry a syntactic check; `None` otherwise.
pub fn field_format_message(field: Field) -> Option<&'static str> {
    match field {
        Field::Email => Some("Please enter a valid email address."),
        Field::PhoneNumber => Some("Please enter a valid phone number (at least 10 digits)."),
        Field::OrderId | Field::FullName => None,
    }
}

/// Order-id field error for a failed verification.
pub fn verify_failure_message(failure: VerifyFailure) -> &'static str {
    match failure {
        VerifyFailure::Invalid => {
            "We couldn't find that order ID. Please check it and try again."
        }
        VerifyFailure::Transport => {
            "We couldn't verify your order right now. Please try again in a moment."
        }
    }
}
