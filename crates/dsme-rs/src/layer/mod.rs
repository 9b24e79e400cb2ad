//! Wires the acknowledgment layer and the beacon manager to a `Platform`.

pub mod delivery;
pub mod dsme;

pub use dsme::DsmeLayer;

use crate::ack::AckLayerResponse;
use crate::beacon::{ScanConfirm, SyncLossReason};
use crate::frame::Frame;

/// Tags an outbound exchange of the acknowledgment layer with its requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOrigin {
    /// A frame handed to `DsmeLayer::send`.
    Upper,
    /// This device's own enhanced beacon.
    Beacon,
}

/// What the DSME layer reports to the next higher layer
/// in response to an event or a tick.
#[derive(Debug)]
pub enum DsmeIndication {
    /// A data frame for this device. Ownership moves to the receiver.
    DataReceived(Frame),
    /// Terminal outcome of a frame passed to `DsmeLayer::send`.
    SendConfirm {
        response: AckLayerResponse,
        frame: Frame,
    },
    ScanConfirm(ScanConfirm),
    SyncLoss(SyncLossReason),
    /// The superframe clock must be realigned to the parent's timeline.
    Resynchronized {
        beacon_interval_start: u32,
        superframe: u16,
        multi_superframe: u16,
    },
}
