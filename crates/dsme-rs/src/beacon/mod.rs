//! Beacon-based synchronization: network discovery scans, tracking of the
//! parent's beacons and arbitration of beacon slots between neighbors.

pub mod counters;
pub mod manager;
pub mod scan;

pub use counters::LostBeaconCounter;
pub use manager::BeaconManager;
pub use scan::{MAX_PAN_DESCRIPTORS, ScanConfirm, ScanDuration, ScanState, ScanStatus, ScanType};

use crate::frame::Frame;
use crate::types::{ChannelNumber, MacAddress};

/// Synchronization state towards the network timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Unsynchronized,
    /// Following the beacons of `parent`. A PAN coordinator is synchronized to
    /// its own timeline and has no parent.
    Synchronized { parent: Option<MacAddress> },
}

/// Ownership of a beacon slot (SD index) for this device's own beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimState {
    #[default]
    Unclaimed,
    /// An allocation notification for the slot is queued or on air.
    AllocationSent(u16),
    Allocated(u16),
}

impl ClaimState {
    /// The slot this device claims or owns.
    pub fn sd_index(&self) -> Option<u16> {
        match self {
            ClaimState::Unclaimed => None,
            ClaimState::AllocationSent(sd) | ClaimState::Allocated(sd) => Some(*sd),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncLossReason {
    /// More than macMaxLostBeacons consecutive beacons of the parent were missed.
    BeaconLost,
}

/// Work the beacon manager hands to the orchestrating layer.
#[derive(Debug)]
pub enum BeaconAction {
    /// Tune the radio.
    SetChannel(ChannelNumber),
    /// Transmit this device's enhanced beacon now (no CSMA/CA).
    SendBeacon(Frame),
    /// Queue a frame for the contention access period.
    SendInCap(Frame),
    /// The local superframe clock must follow the parent's timeline.
    Resynchronize {
        beacon_interval_start: u32,
        superframe: u16,
        multi_superframe: u16,
    },
    ScanComplete(ScanConfirm),
    SyncLoss(SyncLossReason),
}
