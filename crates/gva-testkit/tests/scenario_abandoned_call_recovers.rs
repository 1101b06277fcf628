//! Scenario: a dropped action never leaves the session busy.
//!
//! # Invariants under test
//!
//! 1. Dropping `advance()` while the verify call is pending completes the
//!    call as a transport failure: stage back to Collecting, order-id retry
//!    message set, no product id.
//! 2. After that, an order-id edit and a fresh `advance()` verify normally.
//! 3. Dropping `submit()` while the claim call is pending sets the connection
//!    banner, keeps values and product id, and a resubmit goes through.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gva_client::{ClaimSubmitter, OrderVerifier};
use gva_forms::{
    verify_failure_message, ClaimOutcome, ClaimRequest, Field, Stage, VerifyFailure,
    VerifyOutcome, VerifyRequest, SUBMIT_TRANSPORT_MESSAGE,
};
use gva_testkit::{ScriptedClaimSubmitter, ScriptedVerifier, VALID_ENTRY};
use gva_workflow::{EntryController, Step};

/// Never answers its first call; answers `Valid` afterwards.
#[derive(Default)]
struct StallFirstVerifier {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl OrderVerifier for StallFirstVerifier {
    fn name(&self) -> &'static str {
        "stall-first"
    }

    async fn verify_order(&self, req: &VerifyRequest) -> VerifyOutcome {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        VerifyOutcome::valid(format!("B0-{}", req.order_id))
    }
}

/// Never answers its first call; accepts afterwards.
#[derive(Default)]
struct StallFirstSubmitter {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl ClaimSubmitter for StallFirstSubmitter {
    fn name(&self) -> &'static str {
        "stall-first"
    }

    async fn submit_claim(&self, _req: &ClaimRequest) -> ClaimOutcome {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        ClaimOutcome::Success
    }
}

fn fill(ctl: &mut EntryController) {
    let (order_id, name, email, phone) = VALID_ENTRY;
    ctl.edit(Field::OrderId, order_id).unwrap();
    ctl.edit(Field::FullName, name).unwrap();
    ctl.edit(Field::Email, email).unwrap();
    ctl.edit(Field::PhoneNumber, phone).unwrap();
}

// ---------------------------------------------------------------------------
// 1 + 2: dropped verification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dropped_verification_returns_to_collecting() {
    let verifier = Arc::new(StallFirstVerifier::default());
    let submitter = ScriptedClaimSubmitter::accepting();
    let mut ctl = EntryController::new(verifier.clone(), submitter.clone());
    fill(&mut ctl);

    // Poll `advance()` once (it parks on the stalled call), then drop it.
    tokio::select! {
        biased;
        res = ctl.advance() => panic!("stalled verifier answered: {res:?}"),
        _ = std::future::ready(()) => {}
    }

    assert_eq!(ctl.stage(), Stage::Collecting);
    assert_eq!(
        ctl.form().error(Field::OrderId),
        Some(verify_failure_message(VerifyFailure::Transport))
    );
    assert!(ctl.form().product_id.is_none());
    assert_eq!(ctl.telemetry().verify_transport_errors, 1);

    ctl.edit(Field::OrderId, "A2").unwrap();
    assert_eq!(
        ctl.advance().await,
        Ok(Step::Verified {
            product_id: "B0-A2".into()
        })
    );
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 2);
    assert_eq!(submitter.call_count(), 0);
}

// ---------------------------------------------------------------------------
// 3: dropped submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dropped_submission_can_be_resubmitted() {
    let verifier = ScriptedVerifier::always_valid("B00PRIZE");
    let submitter = Arc::new(StallFirstSubmitter::default());
    let mut ctl = EntryController::new(verifier.clone(), submitter.clone());
    fill(&mut ctl);
    ctl.advance().await.unwrap();

    tokio::select! {
        biased;
        res = ctl.submit() => panic!("stalled submitter answered: {res:?}"),
        _ = std::future::ready(()) => {}
    }

    assert_eq!(ctl.stage(), Stage::Collecting);
    assert_eq!(
        ctl.form().general_error.as_deref(),
        Some(SUBMIT_TRANSPORT_MESSAGE)
    );
    assert_eq!(ctl.form().email, VALID_ENTRY.2);
    assert_eq!(ctl.form().product_id.as_deref(), Some("B00PRIZE"));
    assert!(ctl.can_submit());
    assert_eq!(ctl.telemetry().submit_transport_errors, 1);

    assert_eq!(ctl.submit().await, Ok(Step::Completed));
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 2);
    assert_eq!(verifier.call_count(), 1);
}
