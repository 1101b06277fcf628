//! Async driver around [`EntryMachine`].
//!
//! Owns the machine and both collaborators for one session. Each public
//! method is one user action: it applies the event, runs the remote call the
//! machine asked for (at most one), and feeds the result back before
//! returning. `&mut self` across the await is the whole concurrency story:
//! one action at a time per session.
//!
//! Remote failures never surface as `Err`; they end up in the form's field
//! errors / general error. `Err(Refusal)` only means the action was not
//! allowed (the UI should have had that trigger disabled).

use std::sync::Arc;

use anyhow::Result;
use gva_client::{http_collaborators, ClaimSubmitter, OrderVerifier};
use gva_config::{report_unused_keys, EntryConfig, LoadedConfig, UnusedKeyPolicy};
use gva_forms::{ClaimOutcome, Field, FormState, Stage, VerifyOutcome};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::machine::{EntryEvent, EntryMachine, Refusal, Step};
use crate::telemetry::Telemetry;

const ABANDONED_REASON: &str = "call abandoned before completion";

pub struct EntryController {
    session_id: Uuid,
    machine: EntryMachine,
    verifier: Arc<dyn OrderVerifier>,
    submitter: Arc<dyn ClaimSubmitter>,
    telemetry: Telemetry,
}

impl EntryController {
    pub fn new(verifier: Arc<dyn OrderVerifier>, submitter: Arc<dyn ClaimSubmitter>) -> Self {
        let session_id = Uuid::new_v4();
        info!(
            %session_id,
            verifier = verifier.name(),
            submitter = submitter.name(),
            "entry session started"
        );
        Self {
            session_id,
            machine: EntryMachine::new(),
            verifier,
            submitter,
            telemetry: Telemetry::default(),
        }
    }

    /// HTTP-backed session from a typed config.
    pub fn from_config(cfg: &EntryConfig) -> Result<Self> {
        let (verifier, submitter) = http_collaborators(cfg)?;
        Ok(Self::new(Arc::new(verifier), Arc::new(submitter)))
    }

    /// HTTP-backed session from a loaded layered config, with endpoint env
    /// overrides applied. Logs the config hash for the session and warns about
    /// keys nothing reads.
    pub fn from_loaded_config(loaded: &LoadedConfig) -> Result<Self> {
        let cfg = EntryConfig::from_loaded_with_env(loaded)?;
        let unused = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
        let ctl = Self::from_config(&cfg)?;
        if !unused.is_clean() {
            warn!(
                session_id = %ctl.session_id,
                unused = ?unused.unused_leaf_pointers,
                "config contains unused keys"
            );
        }
        info!(
            session_id = %ctl.session_id,
            config_hash = %loaded.config_hash,
            verify_url = %cfg.endpoints.verify_order,
            claim_url = %cfg.endpoints.claim_ticket,
            "entry session configured"
        );
        Ok(ctl)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn form(&self) -> &FormState {
        self.machine.form()
    }

    pub fn stage(&self) -> Stage {
        self.machine.stage()
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Whether the submit trigger should be enabled.
    pub fn can_submit(&self) -> bool {
        self.machine.can_submit()
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    /// A field's value changed. Never issues a call.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) -> Result<(), Refusal> {
        self.dispatch(EntryEvent::edit(field, value), false)
            .map(|_| ())
    }

    /// The user left `field`. For the order-id field this verifies the order
    /// (unless a product id is already held for it).
    pub async fn leave_field(&mut self, field: Field) -> Result<Step, Refusal> {
        let step = self.dispatch(EntryEvent::Blur(field), false)?;
        self.drive(step).await
    }

    /// The user asked for the next step: verify the current order id.
    pub async fn advance(&mut self) -> Result<Step, Refusal> {
        let step = self.dispatch(EntryEvent::Advance, false)?;
        self.drive(step).await
    }

    /// The user pressed submit.
    pub async fn submit(&mut self) -> Result<Step, Refusal> {
        let step = self.dispatch(EntryEvent::Submit, true)?;
        self.drive(step).await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn dispatch(&mut self, event: EntryEvent, submitting: bool) -> Result<Step, Refusal> {
        let from = self.machine.stage();
        let step = match self.machine.apply(event) {
            Ok(step) => step,
            Err(refusal) => {
                debug!(session_id = %self.session_id, stage = %from, %refusal, "event refused");
                return Err(refusal);
            }
        };

        let to = self.machine.stage();
        if let Step::SubmissionFailed { .. } = step {
            debug!(session_id = %self.session_id, from = %from, via = %Stage::Failed, to = %to, "stage");
        } else if from != to {
            debug!(session_id = %self.session_id, from = %from, to = %to, "stage");
        }

        self.telemetry.record(&step, submitting);
        Ok(step)
    }

    /// Run the remote call a step asks for and apply its completion.
    ///
    /// The call is awaited under an [`InFlight`] guard: if the caller drops
    /// this future before the call returns, the guard completes it as a
    /// transport failure so the session does not stay busy.
    async fn drive(&mut self, step: Step) -> Result<Step, Refusal> {
        match step {
            Step::Verify(req) => {
                let verifier = Arc::clone(&self.verifier);
                let mut guard = InFlight::arm(self);
                let outcome = verifier.verify_order(&req).await;
                let ctl = guard.disarm();
                // The machine keys completions by the raw input it issued for.
                let order_id = ctl
                    .machine
                    .pending_verification()
                    .map(str::to_string)
                    .unwrap_or_else(|| req.order_id.clone());
                let done = ctl.dispatch(
                    EntryEvent::VerificationFinished { order_id, outcome },
                    false,
                )?;
                ctl.log_verification(&req.order_id, &done);
                Ok(done)
            }
            Step::Submit(req) => {
                let submitter = Arc::clone(&self.submitter);
                let mut guard = InFlight::arm(self);
                let outcome = submitter.submit_claim(&req).await;
                let ctl = guard.disarm();
                let detail = match &outcome {
                    ClaimOutcome::Failure { detail, .. } => detail.clone(),
                    ClaimOutcome::TransportError { reason } => Some(reason.clone()),
                    ClaimOutcome::Success => None,
                };
                let done = ctl.dispatch(EntryEvent::SubmissionFinished { outcome }, true)?;
                ctl.log_submission(&req.order_id, &done, detail.as_deref());
                Ok(done)
            }
            Step::Cached => {
                debug!(session_id = %self.session_id, "verification skipped: product id held");
                Ok(step)
            }
            other => Ok(other),
        }
    }

    /// Complete a call whose awaiting future was dropped. No-op unless the
    /// machine is still busy.
    fn abandon_in_flight(&mut self) {
        let (event, submitting) = match self.machine.stage() {
            Stage::Verifying => match self.machine.pending_verification() {
                Some(order_id) => (
                    EntryEvent::VerificationFinished {
                        order_id: order_id.to_string(),
                        outcome: VerifyOutcome::transport(ABANDONED_REASON),
                    },
                    false,
                ),
                None => return,
            },
            Stage::Submitting => (
                EntryEvent::SubmissionFinished {
                    outcome: ClaimOutcome::transport(ABANDONED_REASON),
                },
                true,
            ),
            _ => return,
        };

        warn!(session_id = %self.session_id, stage = %self.machine.stage(), "in-flight call abandoned");
        if let Err(refusal) = self.dispatch(event, submitting) {
            warn!(session_id = %self.session_id, %refusal, "abandoned call could not be completed");
        }
    }

    fn log_verification(&self, order_id: &str, step: &Step) {
        match step {
            Step::Verified { product_id } => {
                info!(session_id = %self.session_id, order_id, product_id = %product_id, "order verified")
            }
            Step::VerificationFailed(failure) => {
                warn!(session_id = %self.session_id, order_id, ?failure, "order verification failed")
            }
            Step::StaleVerificationDiscarded => {
                warn!(session_id = %self.session_id, order_id, "stale verification discarded")
            }
            _ => {}
        }
    }

    fn log_submission(&self, order_id: &str, step: &Step, detail: Option<&str>) {
        match step {
            Step::Completed => {
                info!(session_id = %self.session_id, order_id, "claim accepted")
            }
            Step::SubmissionFailed { kind: Some(kind) } => {
                warn!(session_id = %self.session_id, order_id, kind = %kind, detail, "claim refused")
            }
            Step::SubmissionFailed { kind: None } => {
                warn!(session_id = %self.session_id, order_id, detail, "claim not delivered")
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// InFlight
// ---------------------------------------------------------------------------

/// Holds the controller across a remote call. Dropped while armed (the
/// awaiting future was cancelled), it completes the call as a transport
/// failure.
struct InFlight<'a> {
    ctl: &'a mut EntryController,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn arm(ctl: &'a mut EntryController) -> Self {
        Self { ctl, armed: true }
    }

    /// The call returned; lend the controller out for the real completion.
    fn disarm(&mut self) -> &mut EntryController {
        self.armed = false;
        &mut *self.ctl
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.ctl.abandon_in_flight();
        }
    }
}
