use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gva_forms::{SubmitFailureKind, VerifyFailure};
use serde::{Deserialize, Serialize};

use crate::machine::Step;

/// Per-session counters. Verification failures keep the invalid / transport
/// split that the UI collapses into one order-id message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telemetry {
    pub verify_calls: u32,
    pub verify_invalid: u32,
    pub verify_transport_errors: u32,
    pub verify_cache_hits: u32,
    pub stale_verifications_discarded: u32,
    pub submit_calls: u32,
    pub submit_blocked_by_validation: u32,
    pub submit_transport_errors: u32,
    pub submit_failures: BTreeMap<SubmitFailureKind, u32>,
    pub completed: bool,
    /// When the last remote call (either collaborator) returned.
    pub last_remote_call_at: Option<DateTime<Utc>>,
}

impl Telemetry {
    /// Fold one step into the counters. `Blocked` is counted against submit
    /// only when `submitting` is set, since blur validation blocks too.
    pub(crate) fn record(&mut self, step: &Step, submitting: bool) {
        match step {
            Step::Verify(_) => self.verify_calls += 1,
            Step::Submit(_) => self.submit_calls += 1,
            Step::Cached => self.verify_cache_hits += 1,
            Step::Blocked if submitting => self.submit_blocked_by_validation += 1,
            Step::StaleVerificationDiscarded => {
                self.stale_verifications_discarded += 1;
                self.touch();
            }
            Step::Verified { .. } => self.touch(),
            Step::VerificationFailed(VerifyFailure::Invalid) => {
                self.verify_invalid += 1;
                self.touch();
            }
            Step::VerificationFailed(VerifyFailure::Transport) => {
                self.verify_transport_errors += 1;
                self.touch();
            }
            Step::Completed => {
                self.completed = true;
                self.touch();
            }
            Step::SubmissionFailed { kind: Some(kind) } => {
                *self.submit_failures.entry(*kind).or_insert(0) += 1;
                self.touch();
            }
            Step::SubmissionFailed { kind: None } => {
                self.submit_transport_errors += 1;
                self.touch();
            }
            Step::Idle | Step::Blocked => {}
        }
    }

    fn touch(&mut self) {
        self.last_remote_call_at = Some(Utc::now());
    }

    pub fn verify_failures(&self) -> u32 {
        self.verify_invalid + self.verify_transport_errors
    }

    pub fn submit_failures_total(&self) -> u32 {
        self.submit_transport_errors + self.submit_failures.values().sum::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_verification_split() {
        let mut t = Telemetry::default();
        t.record(&Step::VerificationFailed(VerifyFailure::Invalid), false);
        t.record(&Step::VerificationFailed(VerifyFailure::Transport), false);
        t.record(&Step::VerificationFailed(VerifyFailure::Transport), false);
        assert_eq!(t.verify_invalid, 1);
        assert_eq!(t.verify_transport_errors, 2);
        assert_eq!(t.verify_failures(), 3);
        assert!(t.last_remote_call_at.is_some());
    }

    #[test]
    fn blur_blocks_are_not_submit_blocks() {
        let mut t = Telemetry::default();
        t.record(&Step::Blocked, false);
        assert_eq!(t.submit_blocked_by_validation, 0);
        t.record(&Step::Blocked, true);
        assert_eq!(t.submit_blocked_by_validation, 1);
    }

    #[test]
    fn serializes_failure_kinds_as_wire_names() {
        let mut t = Telemetry::default();
        t.record(
            &Step::SubmissionFailed {
                kind: Some(SubmitFailureKind::DuplicateClaim),
            },
            false,
        );
        t.record(&Step::SubmissionFailed { kind: None }, false);
        assert_eq!(t.submit_failures_total(), 2);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["submit_failures"]["DUPLICATE_CLAIM"], 1);
        assert_eq!(v["submit_transport_errors"], 1);
    }
}
