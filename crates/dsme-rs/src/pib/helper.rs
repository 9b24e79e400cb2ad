use super::{MacPib, PhyPib};
use crate::types::{
    A_BASE_SLOT_DURATION, A_NUM_SUPERFRAME_SLOTS, A_TURNAROUND_TIME, A_UNIT_BACKOFF_PERIOD,
    ChannelNumber,
};

/// Final CAP slot of a superframe without CAP reduction.
const DEFAULT_FINAL_CAP_SLOT: u8 = 8;

/// Derives the superframe structure and timing from the MAC and PHY PIB.
/// All values assume a validated PIB (`SO <= MO <= BO`).
#[derive(Debug, Clone, Copy)]
pub struct PibHelper<'a> {
    mac: &'a MacPib,
    phy: &'a PhyPib,
}

impl<'a> PibHelper<'a> {
    pub fn new(mac: &'a MacPib, phy: &'a PhyPib) -> Self {
        Self { mac, phy }
    }

    pub fn mac(&self) -> &'a MacPib {
        self.mac
    }

    /// `2^(MO-SO)`
    pub fn superframes_per_multi_superframe(&self) -> u16 {
        1 << (self.mac.multi_superframe_order - self.mac.superframe_order)
    }

    /// `2^(BO-SO)`
    pub fn superframes_per_beacon_interval(&self) -> u16 {
        1 << (self.mac.beacon_order - self.mac.superframe_order)
    }

    /// `2^(BO-MO)`
    pub fn multi_superframes_per_beacon_interval(&self) -> u16 {
        1 << (self.mac.beacon_order - self.mac.multi_superframe_order)
    }

    /// Final slot of the contention access period in `superframe_id`.
    /// With CAP reduction only the first superframe of a multi-superframe has a CAP.
    pub fn final_cap_slot(&self, superframe_id: u16) -> u8 {
        if self.mac.cap_reduction && superframe_id > 0 {
            0
        } else {
            DEFAULT_FINAL_CAP_SLOT
        }
    }

    /// Number of guaranteed time slots following the CAP (and the beacon slot).
    pub fn num_gt_slots(&self, superframe_id: u16) -> u8 {
        A_NUM_SUPERFRAME_SLOTS - self.final_cap_slot(superframe_id) - 1
    }

    pub fn symbols_per_slot(&self) -> u32 {
        A_BASE_SLOT_DURATION << self.mac.superframe_order
    }

    pub fn symbols_per_superframe(&self) -> u32 {
        self.symbols_per_slot() * A_NUM_SUPERFRAME_SLOTS as u32
    }

    pub fn num_channels(&self) -> u8 {
        self.phy.channels.len() as u8
    }

    pub fn channels(&self) -> &'a [ChannelNumber] {
        &self.phy.channels
    }

    /// macAckWaitDuration in symbols:
    /// `aUnitBackoffPeriod + aTurnaroundTime + phySHRDuration + ceil(6 * phySymbolsPerOctet)`.
    pub fn ack_wait_duration(&self) -> u32 {
        A_UNIT_BACKOFF_PERIOD
            + A_TURNAROUND_TIME
            + self.phy.shr_duration
            + 6 * self.phy.symbols_per_octet
    }
}
