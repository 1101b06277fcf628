use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::Field;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Position of an entry attempt in the verify → submit workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Fields are being edited; no usable product id.
    #[default]
    Collecting,
    /// A verify-order call is in flight.
    Verifying,
    /// A product id is held for the current order id.
    Verified,
    /// A claim-ticket call is in flight.
    Submitting,
    /// The claim was accepted. **Terminal.**
    Completed,
    /// The claim was refused or never reached the collaborator. Transient:
    /// settles to `Collecting` within the same transition.
    Failed,
}

impl Stage {
    /// `true` while a remote call is in flight. This is the busy flag that
    /// keeps a second verification or submission from starting.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Verifying | Self::Submitting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Verifying => "verifying",
            Self::Verified => "verified",
            Self::Submitting => "submitting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FormState
// ---------------------------------------------------------------------------

/// Every value, error and flag of one entry attempt.
///
/// `product_id` is only meaningful for the exact `order_id` it was verified
/// against; whoever edits `order_id` must clear it (the workflow does).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub order_id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub product_id: Option<String>,
    pub field_errors: BTreeMap<Field, String>,
    pub stage: Stage,
    pub general_error: Option<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::OrderId => &self.order_id,
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::PhoneNumber => &self.phone_number,
        }
    }

    pub fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::OrderId => &mut self.order_id,
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::PhoneNumber => &mut self.phone_number,
        }
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    pub fn set_error(&mut self, field: Field, message: impl Into<String>) {
        self.field_errors.insert(field, message.into());
    }

    pub fn clear_error(&mut self, field: Field) {
        self.field_errors.remove(&field);
    }

    pub fn has_errors(&self) -> bool {
        !self.field_errors.is_empty() || self.general_error.is_some()
    }

    /// `true` when the form is back to its session-start value, ignoring `stage`.
    pub fn is_blank(&self) -> bool {
        Field::ALL.iter().all(|f| self.value(*f).is_empty())
            && self.product_id.is_none()
            && !self.has_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_form_is_blank_and_collecting() {
        let form = FormState::new();
        assert!(form.is_blank());
        assert_eq!(form.stage, Stage::Collecting);
        assert!(!form.stage.is_busy());
    }

    #[test]
    fn busy_stages() {
        assert!(Stage::Verifying.is_busy());
        assert!(Stage::Submitting.is_busy());
        assert!(!Stage::Verified.is_busy());
        assert!(!Stage::Failed.is_busy());
        assert!(Stage::Completed.is_terminal());
    }

    #[test]
    fn value_mut_routes_to_the_right_field() {
        let mut form = FormState::new();
        *form.value_mut(Field::PhoneNumber) = "5551234567".into();
        assert_eq!(form.phone_number, "5551234567");
        assert_eq!(form.value(Field::PhoneNumber), "5551234567");
        assert!(!form.is_blank());
    }

    #[test]
    fn errors_keyed_by_field() {
        let mut form = FormState::new();
        form.set_error(Field::Email, "bad");
        assert_eq!(form.error(Field::Email), Some("bad"));
        assert!(form.has_errors());
        form.clear_error(Field::Email);
        assert!(!form.has_errors());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut form = FormState::new();
        form.set_error(Field::OrderId, "x");
        let v = serde_json::to_value(&form).unwrap();
        assert_eq!(v["stage"], "collecting");
        assert_eq!(v["fieldErrors"]["orderId"], "x");
        assert!(v["productId"].is_null());
    }
}
