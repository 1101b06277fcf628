//! gva-client
//!
//! Boundary to the two remote collaborators of an entry attempt:
//! - **verify order**: order id → validity + product identifier
//! - **claim ticket**: completed entry → success or typed failure
//!
//! Both are modelled as object-safe async traits so the workflow can hold
//! `Arc<dyn OrderVerifier>` / `Arc<dyn ClaimSubmitter>` without knowing the
//! concrete transport. The HTTP implementations never return an error: every
//! failure is folded into the outcome type before it leaves this crate.

mod claim;
mod error;
mod http;
mod verify;
mod wire;

pub use claim::HttpClaimSubmitter;
pub use error::ClientError;
pub use http::{build_http_client, http_collaborators};
pub use verify::HttpOrderVerifier;

use gva_forms::{ClaimOutcome, ClaimRequest, VerifyOutcome, VerifyRequest};

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Order-verification collaborator.
#[async_trait::async_trait]
pub trait OrderVerifier: Send + Sync {
    /// Short name for logs (e.g. `"http"`).
    fn name(&self) -> &'static str;

    /// Issue exactly one verification call for `req.order_id`.
    async fn verify_order(&self, req: &VerifyRequest) -> VerifyOutcome;
}

/// Claim-submission collaborator.
#[async_trait::async_trait]
pub trait ClaimSubmitter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Issue exactly one claim call. Never retries.
    async fn submit_claim(&self, req: &ClaimRequest) -> ClaimOutcome;
}
