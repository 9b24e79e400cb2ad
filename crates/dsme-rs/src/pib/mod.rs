//! The PAN Information Base: typed MAC and PHY attributes with defaults and validation.

pub mod helper;

pub use helper::PibHelper;

use crate::hal::DsmeError;
use crate::types::{
    A_MAX_LOST_BEACONS, ChannelNumber, ExtendedAddress, NO_SHORT_ADDRESS, PanId, ShortAddress,
};
use alloc::vec::Vec;

/// Highest beacon/superframe order that still describes a beacon-enabled PAN.
pub const MAX_ORDER: u8 = 14;

/// MAC PIB attributes read and written by the DSME core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacPib {
    pub short_address: ShortAddress,
    pub extended_address: ExtendedAddress,
    pub pan_id: PanId,
    pub coord_short_address: ShortAddress,
    pub coord_extended_address: ExtendedAddress,
    /// The device is the PAN coordinator and owns the timeline.
    pub is_pan_coord: bool,
    /// The device acts as a coordinator and transmits its own beacons.
    pub is_coord: bool,
    /// The device is associated with the PAN.
    pub associated_pan_coord: bool,
    /// Beacon slot (SD index) this device transmits its beacon in.
    pub sd_index: u16,
    pub beacon_order: u8,
    pub superframe_order: u8,
    pub multi_superframe_order: u8,
    pub cap_reduction: bool,
    /// Lost beacons tolerated before synchronization is declared lost.
    pub max_lost_beacons: u8,
    /// Minimum link quality for a beacon to be recorded during a scan.
    pub scan_min_link_quality: u8,
}

impl Default for MacPib {
    fn default() -> Self {
        Self {
            short_address: ShortAddress(NO_SHORT_ADDRESS),
            extended_address: ExtendedAddress(0),
            pan_id: PanId::BROADCAST,
            coord_short_address: ShortAddress(NO_SHORT_ADDRESS),
            coord_extended_address: ExtendedAddress(0),
            is_pan_coord: false,
            is_coord: false,
            associated_pan_coord: false,
            sd_index: 0,
            beacon_order: 6,
            superframe_order: 3,
            multi_superframe_order: 5,
            cap_reduction: false,
            max_lost_beacons: A_MAX_LOST_BEACONS,
            scan_min_link_quality: 0,
        }
    }
}

impl MacPib {
    /// Checks the superframe structure and thresholds for consistency.
    pub fn validate(&self) -> Result<(), DsmeError> {
        if self.beacon_order > MAX_ORDER {
            return Err(DsmeError::InvalidConfiguration("beacon order above 14"));
        }
        if self.superframe_order > self.multi_superframe_order {
            return Err(DsmeError::InvalidConfiguration(
                "superframe order exceeds multi-superframe order",
            ));
        }
        if self.multi_superframe_order > self.beacon_order {
            return Err(DsmeError::InvalidConfiguration(
                "multi-superframe order exceeds beacon order",
            ));
        }
        if self.max_lost_beacons == 0 {
            return Err(DsmeError::InvalidConfiguration("max lost beacons must be positive"));
        }
        if self.sd_index >= 1 << (self.beacon_order - self.superframe_order) {
            return Err(DsmeError::InvalidConfiguration("SD index outside the beacon interval"));
        }
        Ok(())
    }
}

/// PHY PIB attributes the MAC timing depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhyPib {
    pub current_channel: ChannelNumber,
    pub channel_page: u8,
    /// Channels available for DSME channel hopping / adaptation.
    pub channels: Vec<ChannelNumber>,
    /// Duration of the synchronization header in symbols.
    pub shr_duration: u32,
    /// Symbols per octet of the PHY.
    pub symbols_per_octet: u32,
}

impl Default for PhyPib {
    /// 2.4 GHz O-QPSK: channels 11-26, 10 symbol SHR, 2 symbols per octet.
    fn default() -> Self {
        Self {
            current_channel: 11,
            channel_page: 0,
            channels: (11..=26).collect(),
            shr_duration: 10,
            symbols_per_octet: 2,
        }
    }
}

impl PhyPib {
    pub fn validate(&self) -> Result<(), DsmeError> {
        if self.channels.is_empty() {
            return Err(DsmeError::InvalidConfiguration("empty channel list"));
        }
        if self.channels.len() > u8::MAX as usize {
            return Err(DsmeError::InvalidConfiguration("too many channels"));
        }
        Ok(())
    }
}
