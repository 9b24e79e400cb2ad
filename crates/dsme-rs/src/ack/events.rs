use crate::frame::Frame;
use crate::hal::{DsmeError, TimerHandle};
use crate::types::SequenceNumber;

/// Signals consumed by the acknowledgment state machine.
/// Request signals carry the frame whose ownership moves into the machine.
/// State entry and exit work happens in the transition that produces the
/// next state, so there are no separate entry/exit signals.
#[derive(Debug)]
pub enum AckEvent<T> {
    SendRequest { frame: Frame, origin: T },
    ReceiveRequest { frame: Frame },
    SendDone { success: bool },
    AckReceived { seq_num: SequenceNumber },
    TimerFired { handle: TimerHandle },
}

/// Terminal outcome of an outbound exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckLayerResponse {
    /// The matching acknowledgment arrived in time.
    AckSuccessful,
    /// No acknowledgment arrived within macAckWaitDuration.
    AckFailed,
    /// The radio reported a failed transmission.
    SendFailed,
    /// The frame was sent and no acknowledgment was expected.
    NoAckRequested,
}

/// Hands a sent frame back to the component that requested the send.
#[derive(Debug)]
pub struct SendCompletion<T> {
    pub response: AckLayerResponse,
    pub frame: Frame,
    pub origin: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Another exchange is outstanding. Retry later.
    Busy,
    /// The platform refused to transmit the frame.
    PlatformRefused,
}

/// A refused send request. The caller keeps ownership of the frame.
#[derive(Debug)]
pub struct Rejected<T> {
    pub reason: RejectReason,
    pub frame: Frame,
    pub origin: T,
}

/// What happened to a frame passed to `AckLayer::receive`.
#[derive(Debug)]
pub enum ReceiveOutcome<T> {
    /// Addressed to another device. The frame was released.
    NotForThisDevice,
    /// An exchange was in progress. The frame was released.
    Busy,
    /// Delivered upwards; no acknowledgment required.
    Delivered,
    /// Delivered upwards; an acknowledgment is being transmitted.
    AckScheduled,
    /// Delivered upwards, but no acknowledgment could be sent.
    AckNotSent(DsmeError),
    /// The acknowledgment completed the outstanding exchange.
    AckMatched(SendCompletion<T>),
    /// The acknowledgment matched no outstanding exchange.
    AckIgnored,
}
