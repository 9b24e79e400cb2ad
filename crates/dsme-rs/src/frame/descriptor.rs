//! Beacon payload descriptors: the superframe specification of plain beacons
//! and the DSME PAN descriptor carried in enhanced beacons.

use crate::bitmap::BeaconBitmap;
use crate::types::{ChannelNumber, MacAddress, PanId};

/// Superframe specification field (IEEE 802.15.4-2015, 7.3.1.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuperframeSpecification {
    pub beacon_order: u8,
    pub superframe_order: u8,
    pub final_cap_slot: u8,
    pub pan_coordinator: bool,
    pub association_permit: bool,
}

/// DSME superframe specification (IEEE 802.15.4-2015, 7.4.4.22).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DsmeSuperframeSpecification {
    pub multi_superframe_order: u8,
    pub channel_diversity_mode: bool,
    pub cap_reduction: bool,
}

/// Time synchronization specification of a DSME PAN descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSyncSpecification {
    /// Symbol counter value at which the beacon was scheduled.
    pub beacon_timestamp: u32,
    /// Lateness of the actual transmission relative to the scheduled start, in symbols.
    pub beacon_offset_timestamp: u16,
}

/// The DSME PAN descriptor IE carried in every enhanced beacon.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DsmePanDescriptor {
    pub superframe_spec: SuperframeSpecification,
    pub dsme_superframe_spec: DsmeSuperframeSpecification,
    pub time_sync: TimeSyncSpecification,
    /// Beacon slots known to the sender; `sd_index` is the sender's own beacon slot.
    pub beacon_bitmap: BeaconBitmap,
}

/// Describes a coordinator found during a scan (MLME-SCAN.confirm PANDescriptor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanDescriptor {
    pub coord_address: MacAddress,
    pub coord_pan_id: PanId,
    pub channel_number: ChannelNumber,
    pub superframe_spec: SuperframeSpecification,
    pub link_quality: u8,
    /// Symbol counter at the start of the received beacon.
    pub timestamp: u32,
    /// Present if the beacon was an enhanced beacon of a DSME network.
    pub dsme: Option<DsmePanDescriptor>,
}

impl PanDescriptor {
    /// Two descriptors describe the same network if channel, coordinator and PAN agree.
    pub fn same_network(&self, other: &PanDescriptor) -> bool {
        self.channel_number == other.channel_number
            && self.coord_address == other.coord_address
            && self.coord_pan_id == other.coord_pan_id
    }
}
