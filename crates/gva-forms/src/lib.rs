//! gva-forms
//!
//! Domain types for a single giveaway entry attempt:
//! - syntactic field validators (email, phone, required)
//! - the `FormState` aggregate and its `Stage`
//! - verification / claim request and outcome types
//! - the user-facing message catalogue for every error kind
//!
//! Pure and synchronous. No network I/O and no logging live here; the
//! workflow crate owns both.

mod field;
mod messages;
mod outcome;
mod state;
mod validators;

pub use field::Field;
pub use messages::{
    field_format_message, field_required_message, verify_failure_message, SUBMIT_TRANSPORT_MESSAGE,
};
pub use outcome::{
    ClaimOutcome, ClaimRequest, SubmitFailureKind, VerifyFailure, VerifyOutcome, VerifyRequest,
};
pub use state::{FormState, Stage};
pub use validators::{validate_email, validate_field, validate_phone_number, validate_required};
