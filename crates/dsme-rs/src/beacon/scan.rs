//! Channel scan bookkeeping (MLME-SCAN).

use crate::frame::PanDescriptor;
use crate::hal::DsmeError;
use crate::pib::{MAX_ORDER, PibHelper};
use crate::types::{A_BASE_SUPERFRAME_DURATION, ChannelNumber, PanId};
use alloc::vec::Vec;

/// Upper bound of the PAN descriptor list reported by one scan.
pub const MAX_PAN_DESCRIPTORS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanType {
    /// Listen only.
    Passive,
    /// Send an enhanced beacon request on each channel, then listen.
    EnhancedActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Success,
    /// No usable beacon was received on any scanned channel.
    NoBeacon,
}

/// Result of a completed scan (MLME-SCAN.confirm).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfirm {
    pub status: ScanStatus,
    pub scan_type: ScanType,
    pub pan_descriptors: Vec<PanDescriptor>,
}

/// Scan time per channel, in superframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDuration(pub u16);

impl ScanDuration {
    /// Converts the 802.15.4 ScanDuration exponent `n`, meaning
    /// `aBaseSuperframeDuration * (2^n + 1)` symbols, into whole superframes.
    pub fn from_exponent(exponent: u8, helper: &PibHelper<'_>) -> Result<Self, DsmeError> {
        if exponent > MAX_ORDER {
            return Err(DsmeError::InvalidParameter("scan duration exponent above 14"));
        }
        let symbols = A_BASE_SUPERFRAME_DURATION * ((1u32 << exponent) + 1);
        let superframes = symbols.div_ceil(helper.symbols_per_superframe()).max(1);
        Ok(Self(superframes as u16))
    }

    pub fn superframes(&self) -> u16 {
        self.0
    }
}

/// State of an ongoing scan. Exists only while scanning.
#[derive(Debug, Clone)]
pub struct ScanState {
    pub scan_type: ScanType,
    pub channels: Vec<ChannelNumber>,
    pub current_channel_index: usize,
    pub superframes_per_channel: u16,
    pub superframes_left: u16,
    pub pan_descriptors: Vec<PanDescriptor>,
    /// PAN id in effect before the scan cleared the filter.
    pub stored_pan_id: PanId,
    /// Channel the radio was tuned to before the scan.
    pub stored_channel: ChannelNumber,
}

impl ScanState {
    pub fn current_channel(&self) -> Option<ChannelNumber> {
        self.channels.get(self.current_channel_index).copied()
    }

    /// Records `descriptor` unless the same network is already listed or the
    /// list is full. Returns `true` if it was added.
    pub fn record(&mut self, descriptor: PanDescriptor) -> bool {
        if self.pan_descriptors.len() >= MAX_PAN_DESCRIPTORS
            || self.pan_descriptors.iter().any(|d| d.same_network(&descriptor))
        {
            return false;
        }
        self.pan_descriptors.push(descriptor);
        true
    }

    /// Counts down one superframe. Returns `true` when the current channel is done.
    pub fn tick(&mut self) -> bool {
        self.superframes_left = self.superframes_left.saturating_sub(1);
        self.superframes_left == 0
    }

    /// Moves on to the next channel. Returns the channel, or `None` when the
    /// channel list is exhausted.
    pub fn advance(&mut self) -> Option<ChannelNumber> {
        self.current_channel_index += 1;
        self.superframes_left = self.superframes_per_channel;
        self.current_channel()
    }

    pub fn into_confirm(self) -> ScanConfirm {
        let status = if self.pan_descriptors.is_empty() {
            ScanStatus::NoBeacon
        } else {
            ScanStatus::Success
        };
        ScanConfirm {
            status,
            scan_type: self.scan_type,
            pan_descriptors: self.pan_descriptors,
        }
    }
}
