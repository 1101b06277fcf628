//! Entry state machine
//!
//! # Design
//!
//! Explicit, synchronous state machine for one entry attempt. Every user
//! action and every remote-call completion is applied via
//! [`EntryMachine::apply`], which enforces:
//!
//! 1. **Busy flag.** While a call is in flight (`Verifying` / `Submitting`)
//!    no second verification or submission can start. Such events return a
//!    [`Refusal`] and leave the state untouched.
//! 2. **No unverified claims.** `Submit` is refused while no product id is
//!    held; the claim request is only ever built from a held product id.
//! 3. **Product id follows the order id.** Any change to the order id clears
//!    the product id; a verification response for an order id that no longer
//!    matches the input is discarded.
//! 4. **Single synchronous gate.** All four fields are validated at submit
//!    time before a claim request is produced.
//!
//! The machine performs no I/O. A step that needs the network returns
//! [`Step::Verify`] or [`Step::Submit`]; the caller runs the call and feeds
//! the result back as `VerificationFinished` / `SubmissionFinished`.
//!
//! # State diagram
//!
//! ```text
//!               Blur(OrderId) / Advance            Valid
//!   Collecting ─────────────────────────► Verifying ─────► Verified
//!       ▲  ▲                                  │               │  │
//!       │  └────── Invalid | TransportError ──┘               │  │ Edit(OrderId)
//!       │  └────── stale response (order id edited) ──┘       │  └──────► Collecting
//!       │                                                     │ Submit (all fields valid)
//!       │        Failure | TransportError                     ▼
//!       └──────────── Failed ◄──────────────────────────── Submitting
//!                                                             │ Success
//!                                                             ▼
//!                                                      Completed (term.)
//! ```

use gva_forms::{
    field_required_message, validate_field, validate_required, verify_failure_message,
    ClaimOutcome, ClaimRequest, Field, FormState, Stage, SubmitFailureKind, VerifyFailure,
    VerifyOutcome, VerifyRequest,
};

// ---------------------------------------------------------------------------
// EntryEvent
// ---------------------------------------------------------------------------

/// Events that drive an [`EntryMachine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryEvent {
    /// A field's value changed (keystroke / paste).
    Edit { field: Field, value: String },
    /// The user left a field. Leaving the order-id field requests verification.
    Blur(Field),
    /// The user asked for the next step; requests verification.
    Advance,
    /// A verify-order call for `order_id` came back.
    VerificationFinished {
        order_id: String,
        outcome: VerifyOutcome,
    },
    /// The user pressed submit.
    Submit,
    /// The claim-ticket call came back.
    SubmissionFinished { outcome: ClaimOutcome },
}

impl EntryEvent {
    pub fn edit(field: Field, value: impl Into<String>) -> Self {
        Self::Edit {
            field,
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// What an applied event produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// State updated; nothing further to do.
    Idle,
    /// Local validation failed; field errors are set and no call is needed.
    Blocked,
    /// Verification skipped: a product id is already held for this order id.
    Cached,
    /// Caller must issue this verify-order call.
    Verify(VerifyRequest),
    /// Verification succeeded; the product id is now held.
    Verified { product_id: String },
    /// Verification failed; an order-id field error is set.
    VerificationFailed(VerifyFailure),
    /// The response belonged to an order id the user has since changed.
    StaleVerificationDiscarded,
    /// Caller must issue this claim-ticket call.
    Submit(ClaimRequest),
    /// The claim was accepted and the form reset.
    Completed,
    /// The claim failed; `kind` is `None` when no response arrived.
    SubmissionFailed { kind: Option<SubmitFailureKind> },
}

// ---------------------------------------------------------------------------
// Refusal
// ---------------------------------------------------------------------------

/// An event that cannot be applied in the current stage. The state is left
/// untouched and no call is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// The claim was already accepted; the session is over.
    Completed,
    /// A verify-order call is in flight.
    VerificationInFlight,
    /// A claim-ticket call is in flight.
    SubmissionInFlight,
    /// Submit pressed without a verified product id.
    NotVerified,
    /// A completion arrived with no matching call in flight.
    UnexpectedCompletion { stage: Stage },
}

impl std::fmt::Display for Refusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Refusal::Completed => write!(f, "entry already completed"),
            Refusal::VerificationInFlight => write!(f, "order verification in flight"),
            Refusal::SubmissionInFlight => write!(f, "claim submission in flight"),
            Refusal::NotVerified => write!(f, "order not verified"),
            Refusal::UnexpectedCompletion { stage } => {
                write!(f, "no matching call in flight (stage={stage})")
            }
        }
    }
}

impl std::error::Error for Refusal {}

// ---------------------------------------------------------------------------
// EntryMachine
// ---------------------------------------------------------------------------

/// One entry attempt: the [`FormState`] plus the order id of the in-flight
/// verification call, if any.
#[derive(Debug, Clone, Default)]
pub struct EntryMachine {
    form: FormState,
    pending_verification: Option<String>,
}

impl EntryMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn stage(&self) -> Stage {
        self.form.stage
    }

    /// Order id the in-flight verification was issued for.
    pub fn pending_verification(&self) -> Option<&str> {
        self.pending_verification.as_deref()
    }

    /// Whether a `Submit` would pass the busy / verified preconditions.
    /// Field validation still runs on submit.
    ///
    /// A held product id always belongs to the current order id, so after a
    /// failed submission the entry can be resubmitted without re-verifying.
    pub fn can_submit(&self) -> bool {
        matches!(self.form.stage, Stage::Verified | Stage::Collecting)
            && self.form.product_id.is_some()
    }

    /// Apply an event.
    ///
    /// # Errors
    /// Returns [`Refusal`] when the event is not legal in the current stage.
    /// A refused event never mutates state.
    pub fn apply(&mut self, event: EntryEvent) -> Result<Step, Refusal> {
        if self.form.stage.is_terminal() {
            return Err(Refusal::Completed);
        }

        match event {
            EntryEvent::Edit { field, value } => Ok(self.edit(field, value)),
            EntryEvent::Blur(Field::OrderId) | EntryEvent::Advance => self.request_verification(),
            EntryEvent::Blur(field) => Ok(self.blur(field)),
            EntryEvent::VerificationFinished { order_id, outcome } => {
                self.finish_verification(order_id, outcome)
            }
            EntryEvent::Submit => self.submit(),
            EntryEvent::SubmissionFinished { outcome } => self.finish_submission(outcome),
        }
    }

    fn edit(&mut self, field: Field, value: String) -> Step {
        if self.form.value(field) == value {
            return Step::Idle;
        }

        *self.form.value_mut(field) = value;
        self.form.clear_error(field);

        if field == Field::OrderId {
            self.form.product_id = None;
            // Verifying keeps its busy flag: the in-flight response is
            // discarded as stale when it lands.
            if matches!(self.form.stage, Stage::Verified | Stage::Failed) {
                self.form.stage = Stage::Collecting;
            }
        }

        Step::Idle
    }

    fn blur(&mut self, field: Field) -> Step {
        match validate_field(field, self.form.value(field)) {
            Some(msg) => {
                self.form.set_error(field, msg);
                Step::Blocked
            }
            None => {
                self.form.clear_error(field);
                Step::Idle
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), Refusal> {
        match self.form.stage {
            Stage::Verifying => Err(Refusal::VerificationInFlight),
            Stage::Submitting => Err(Refusal::SubmissionInFlight),
            _ => Ok(()),
        }
    }

    fn request_verification(&mut self) -> Result<Step, Refusal> {
        self.ensure_idle()?;

        if !validate_required(&self.form.order_id) {
            self.form.product_id = None;
            self.form
                .set_error(Field::OrderId, field_required_message(Field::OrderId));
            return Ok(Step::Blocked);
        }

        if self.form.product_id.is_some() {
            return Ok(Step::Cached);
        }

        self.form.clear_error(Field::OrderId);
        self.form.stage = Stage::Verifying;
        self.pending_verification = Some(self.form.order_id.clone());
        Ok(Step::Verify(VerifyRequest::new(self.form.order_id.trim())))
    }

    fn finish_verification(
        &mut self,
        order_id: String,
        outcome: VerifyOutcome,
    ) -> Result<Step, Refusal> {
        let matches_pending = self.form.stage == Stage::Verifying
            && self.pending_verification.as_deref() == Some(order_id.as_str());
        if !matches_pending {
            return Err(Refusal::UnexpectedCompletion {
                stage: self.form.stage,
            });
        }
        self.pending_verification = None;

        if self.form.order_id != order_id {
            self.form.product_id = None;
            self.form.stage = Stage::Collecting;
            return Ok(Step::StaleVerificationDiscarded);
        }

        match outcome {
            VerifyOutcome::Valid { product_id } => {
                self.form.clear_error(Field::OrderId);
                self.form.product_id = Some(product_id.clone());
                self.form.stage = Stage::Verified;
                Ok(Step::Verified { product_id })
            }
            failed => {
                // `failure()` is `Some` for every non-Valid outcome.
                let failure = failed.failure().unwrap_or(VerifyFailure::Transport);
                self.form.product_id = None;
                self.form
                    .set_error(Field::OrderId, verify_failure_message(failure));
                self.form.stage = Stage::Collecting;
                Ok(Step::VerificationFailed(failure))
            }
        }
    }

    fn submit(&mut self) -> Result<Step, Refusal> {
        self.ensure_idle()?;
        if !self.can_submit() {
            return Err(Refusal::NotVerified);
        }

        self.form.general_error = None;

        let mut blocked = false;
        for field in Field::ALL {
            match validate_field(field, self.form.value(field)) {
                Some(msg) => {
                    self.form.set_error(field, msg);
                    blocked = true;
                }
                None => self.form.clear_error(field),
            }
        }
        if blocked {
            return Ok(Step::Blocked);
        }

        match ClaimRequest::from_form(&self.form) {
            Some(req) => {
                self.form.stage = Stage::Submitting;
                Ok(Step::Submit(req))
            }
            None => Err(Refusal::NotVerified),
        }
    }

    fn finish_submission(&mut self, outcome: ClaimOutcome) -> Result<Step, Refusal> {
        if self.form.stage != Stage::Submitting {
            return Err(Refusal::UnexpectedCompletion {
                stage: self.form.stage,
            });
        }

        let kind = match &outcome {
            ClaimOutcome::Success => {
                self.form = FormState::new();
                self.form.stage = Stage::Completed;
                self.pending_verification = None;
                return Ok(Step::Completed);
            }
            ClaimOutcome::Failure { kind, .. } => Some(*kind),
            ClaimOutcome::TransportError { .. } => None,
        };

        self.form.general_error = outcome.general_message().map(str::to_string);
        // Failed settles to Collecting at once. Values and the product id stay
        // for resubmission; an order-id edit still clears the product id.
        self.form.stage = Stage::Collecting;

        Ok(Step::SubmissionFailed { kind })
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
