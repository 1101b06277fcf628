//! gva-workflow
//!
//! The entry workflow: verify an order id, then submit a claim tied to the
//! product id the verification returned.
//!
//! - [`machine`]: the synchronous state machine over `FormState`. No I/O;
//!   usable from any event loop, testable without a network.
//! - [`EntryController`]: async driver that owns one machine plus the two
//!   collaborators and runs the calls the machine asks for.
//! - [`Telemetry`]: per-session counters kept by the controller.

pub mod machine;

mod controller;
mod telemetry;

pub use controller::EntryController;
pub use machine::{EntryEvent, EntryMachine, Refusal, Step};
pub use telemetry::Telemetry;
