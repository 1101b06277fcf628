//! Test doubles for the two entry collaborators.
//!
//! Both fakes replay a script of outcomes in order, record every request they
//! receive, and count calls. Once the script is exhausted they fall back to a
//! fixed outcome. No randomness, no network I/O.
//!
//! They are shared with the code under test through `Arc`, so a test keeps
//! its own handle for assertions after handing a clone to the controller.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gva_client::{ClaimSubmitter, OrderVerifier};
use gva_forms::{ClaimOutcome, ClaimRequest, VerifyOutcome, VerifyRequest};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// ScriptedVerifier
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct VerifierInner {
    script: VecDeque<VerifyOutcome>,
    fallback: VerifyOutcome,
    requests: Vec<VerifyRequest>,
}

/// Order verifier that answers from a script.
#[derive(Debug)]
pub struct ScriptedVerifier {
    inner: Mutex<VerifierInner>,
}

impl ScriptedVerifier {
    /// Answers `outcomes` in order, then `Invalid` forever.
    pub fn new(outcomes: impl IntoIterator<Item = VerifyOutcome>) -> Arc<Self> {
        Self::with_fallback(outcomes, VerifyOutcome::Invalid)
    }

    /// Answers `Valid(product_id)` to every call.
    pub fn always_valid(product_id: &str) -> Arc<Self> {
        Self::with_fallback([], VerifyOutcome::valid(product_id))
    }

    pub fn with_fallback(
        outcomes: impl IntoIterator<Item = VerifyOutcome>,
        fallback: VerifyOutcome,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(VerifierInner {
                script: outcomes.into_iter().collect(),
                fallback,
                requests: Vec::new(),
            }),
        })
    }

    pub fn call_count(&self) -> usize {
        lock(&self.inner).requests.len()
    }

    /// Order ids received, in call order.
    pub fn order_ids(&self) -> Vec<String> {
        lock(&self.inner)
            .requests
            .iter()
            .map(|r| r.order_id.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl OrderVerifier for ScriptedVerifier {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn verify_order(&self, req: &VerifyRequest) -> VerifyOutcome {
        let mut inner = lock(&self.inner);
        inner.requests.push(req.clone());
        match inner.script.pop_front() {
            Some(outcome) => outcome,
            None => inner.fallback.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedClaimSubmitter
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SubmitterInner {
    script: VecDeque<ClaimOutcome>,
    fallback: ClaimOutcome,
    requests: Vec<ClaimRequest>,
}

/// Claim submitter that answers from a script.
#[derive(Debug)]
pub struct ScriptedClaimSubmitter {
    inner: Mutex<SubmitterInner>,
}

impl ScriptedClaimSubmitter {
    /// Answers `outcomes` in order, then `Success` forever.
    pub fn new(outcomes: impl IntoIterator<Item = ClaimOutcome>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(SubmitterInner {
                script: outcomes.into_iter().collect(),
                fallback: ClaimOutcome::Success,
                requests: Vec::new(),
            }),
        })
    }

    pub fn accepting() -> Arc<Self> {
        Self::new([])
    }

    pub fn call_count(&self) -> usize {
        lock(&self.inner).requests.len()
    }

    pub fn requests(&self) -> Vec<ClaimRequest> {
        lock(&self.inner).requests.clone()
    }
}

#[async_trait::async_trait]
impl ClaimSubmitter for ScriptedClaimSubmitter {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn submit_claim(&self, req: &ClaimRequest) -> ClaimOutcome {
        let mut inner = lock(&self.inner);
        inner.requests.push(req.clone());
        match inner.script.pop_front() {
            Some(outcome) => outcome,
            None => inner.fallback.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A well-formed set of entry values: `(order_id, full_name, email, phone)`.
pub const VALID_ENTRY: (&str, &str, &str, &str) = (
    "111-2223334-5556667",
    "Ada Lovelace",
    "ada@example.com",
    "+1 555-123-4567",
);
