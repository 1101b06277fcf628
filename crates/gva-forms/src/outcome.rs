//! Requests handed to the two remote collaborators and the outcomes they
//! report back.

use serde::{Deserialize, Serialize};

use crate::messages::SUBMIT_TRANSPORT_MESSAGE;
use crate::state::FormState;

// ---------------------------------------------------------------------------
// Order verification
// ---------------------------------------------------------------------------

/// Body of a verify-order call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub order_id: String,
}

impl VerifyRequest {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
        }
    }
}

/// Result of one verify-order call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Order recognized; `product_id` is the single identifier selected for the claim.
    Valid { product_id: String },
    /// Order not recognized.
    Invalid,
    /// Network failure, timeout, or a response that could not be interpreted.
    TransportError { reason: String },
}

impl VerifyOutcome {
    pub fn valid(product_id: impl Into<String>) -> Self {
        Self::Valid {
            product_id: product_id.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::TransportError {
            reason: reason.into(),
        }
    }

    /// The failure category, or `None` for `Valid`.
    pub fn failure(&self) -> Option<VerifyFailure> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid => Some(VerifyFailure::Invalid),
            Self::TransportError { .. } => Some(VerifyFailure::Transport),
        }
    }
}

/// Verification failure category. Both surface as an order-id field error but
/// are counted separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyFailure {
    Invalid,
    Transport,
}

// ---------------------------------------------------------------------------
// Claim submission
// ---------------------------------------------------------------------------

/// Body of a claim-ticket call. Field names match the collaborator's keys for
/// both the JSON and the multipart encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub order_id: String,
    pub asin: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

impl ClaimRequest {
    /// Build the claim payload from a form. `None` while no product id is held.
    pub fn from_form(form: &FormState) -> Option<Self> {
        let asin = form.product_id.as_deref()?;
        Some(Self {
            order_id: form.order_id.trim().to_string(),
            asin: asin.to_string(),
            name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone_number: form.phone_number.trim().to_string(),
        })
    }

    /// `(key, value)` pairs in wire order, used by the multipart encoding.
    pub fn form_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("orderId", self.order_id.as_str()),
            ("asin", self.asin.as_str()),
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phoneNumber", self.phone_number.as_str()),
        ]
    }
}

/// Typed reason a claim was refused by the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmitFailureKind {
    DuplicateClaim,
    PayloadTooLarge,
    InvalidData,
    ServerError,
    Unknown,
}

impl SubmitFailureKind {
    pub const ALL: [SubmitFailureKind; 5] = [
        SubmitFailureKind::DuplicateClaim,
        SubmitFailureKind::PayloadTooLarge,
        SubmitFailureKind::InvalidData,
        SubmitFailureKind::ServerError,
        SubmitFailureKind::Unknown,
    ];

    /// Map the collaborator's `error.type` string. Absent or unrecognized
    /// values map to `Unknown`.
    pub fn from_wire(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("DUPLICATE_CLAIM") => Self::DuplicateClaim,
            Some("FILE_TOO_LARGE") => Self::PayloadTooLarge,
            Some("INVALID_DATA") => Self::InvalidData,
            Some("SERVER_ERROR") => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateClaim => "DUPLICATE_CLAIM",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::InvalidData => "INVALID_DATA",
            Self::ServerError => "SERVER_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// General banner text for this failure kind.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::DuplicateClaim => {
                "This order has already been used to enter the giveaway."
            }
            Self::PayloadTooLarge => {
                "Your entry is too large to process. Please shorten it and submit again."
            }
            Self::InvalidData => {
                "Some of the details you entered were rejected. Please review them and submit again."
            }
            Self::ServerError => {
                "Our server ran into a problem. Please try again in a few minutes."
            }
            Self::Unknown => "Something went wrong while submitting your entry. Please try again.",
        }
    }
}

impl std::fmt::Display for SubmitFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one claim-ticket call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Success,
    /// The collaborator answered and refused the claim.
    Failure {
        kind: SubmitFailureKind,
        /// Collaborator-supplied detail, kept for logs only.
        detail: Option<String>,
    },
    /// No response, or the request could not be built.
    TransportError { reason: String },
}

impl ClaimOutcome {
    pub fn failure(kind: SubmitFailureKind) -> Self {
        Self::Failure { kind, detail: None }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::TransportError {
            reason: reason.into(),
        }
    }

    /// Banner text for a failed outcome; `None` on success.
    pub fn general_message(&self) -> Option<&'static str> {
        match self {
            Self::Success => None,
            Self::Failure { kind, .. } => Some(kind.user_message()),
            Self::TransportError { .. } => Some(SUBMIT_TRANSPORT_MESSAGE),
        }
    }
}
