//! JSON response shapes of the two collaborators and their mapping to
//! outcomes. Request bodies are the `gva-forms` request types serialized
//! directly.

use gva_forms::{ClaimOutcome, SubmitFailureKind, VerifyOutcome};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Verify order
// ---------------------------------------------------------------------------

/// `{ valid: bool, asins: string | [string] }`. Missing `valid` means not valid.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VerifyOrderResponse {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub asins: Option<ProductIds>,
}

/// The identifier field arrives either as one value or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductIds {
    One(String),
    Many(Vec<String>),
}

impl ProductIds {
    /// First non-blank identifier, trimmed.
    pub fn select(&self) -> Option<&str> {
        match self {
            ProductIds::One(id) => Some(id.trim()).filter(|s| !s.is_empty()),
            ProductIds::Many(ids) => ids.iter().map(|s| s.trim()).find(|s| !s.is_empty()),
        }
    }
}

impl VerifyOrderResponse {
    pub fn into_outcome(self) -> VerifyOutcome {
        if !self.valid {
            return VerifyOutcome::Invalid;
        }
        match self.asins.as_ref().and_then(ProductIds::select) {
            Some(id) => VerifyOutcome::valid(id),
            None => VerifyOutcome::transport("order reported valid without a product identifier"),
        }
    }
}

// ---------------------------------------------------------------------------
// Claim ticket
// ---------------------------------------------------------------------------

/// `{ success: bool, error?: { type, message } }`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ClaimTicketResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiError {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Failure kind implied by an HTTP status when the body carries no typed error.
pub(crate) fn kind_for_status(status: u16) -> SubmitFailureKind {
    match status {
        409 => SubmitFailureKind::DuplicateClaim,
        413 => SubmitFailureKind::PayloadTooLarge,
        400 | 422 => SubmitFailureKind::InvalidData,
        500..=599 => SubmitFailureKind::ServerError,
        _ => SubmitFailureKind::Unknown,
    }
}

/// Interpret a claim response that did arrive. A typed `error` in the body
/// wins over the status code.
pub(crate) fn interpret_claim_response(status: u16, body: &[u8]) -> ClaimOutcome {
    let ok_status = (200..300).contains(&status);

    let parsed: Option<ClaimTicketResponse> = serde_json::from_slice(body).ok();
    match parsed {
        Some(ClaimTicketResponse {
            error: Some(err), ..
        }) => ClaimOutcome::Failure {
            kind: SubmitFailureKind::from_wire(err.kind.as_deref()),
            detail: err.message,
        },
        Some(ClaimTicketResponse { success: true, .. }) if ok_status => ClaimOutcome::Success,
        Some(_) if ok_status => ClaimOutcome::failure(SubmitFailureKind::Unknown),
        Some(_) => ClaimOutcome::failure(kind_for_status(status)),
        None if ok_status => ClaimOutcome::Failure {
            kind: SubmitFailureKind::Unknown,
            detail: Some("claim response body could not be decoded".to_string()),
        },
        None => ClaimOutcome::failure(kind_for_status(status)),
    }
}
