//! Reliable single-hop delivery: the acknowledgment state machine and its
//! admission control.

pub mod admission;
pub mod events;
pub mod state_machine;

pub use admission::AdmissionGate;
pub use events::{
    AckEvent, AckLayerResponse, ReceiveOutcome, RejectReason, Rejected, SendCompletion,
};
pub use state_machine::{AckLayer, AckState};
