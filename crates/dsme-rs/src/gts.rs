//! Slot addressing: conversion between a (superframe, slot, channel) triple and
//! the linear slot index used across one multi-superframe.

use crate::types::{AbsSlotIndex, ChannelNumber};
use core::fmt;

/// A Guaranteed Time Slot coordinate within the multi-superframe.
///
/// `channel` is the index into the configured channel list, not the PHY channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gts {
    pub superframe_id: u16,
    pub slot_id: u16,
    pub channel: ChannelNumber,
}

impl Gts {
    /// Marker for "no slot".
    pub const UNDEFINED: Gts = Gts {
        superframe_id: 0xFFFF,
        slot_id: 0xFFFF,
        channel: 0xFF,
    };

    pub const fn new(superframe_id: u16, slot_id: u16, channel: ChannelNumber) -> Self {
        Self {
            superframe_id,
            slot_id,
            channel,
        }
    }

    pub fn is_undefined(&self) -> bool {
        *self == Self::UNDEFINED
    }

    /// Computes the absolute index: superframe is most significant, then slot, then channel.
    ///
    /// # Panics
    /// If `slot_id` or `channel` exceed the given bounds, or the index does not fit.
    pub fn absolute_index(&self, num_gt_slots: u8, num_channels: u8) -> AbsSlotIndex {
        assert!(
            self.slot_id < num_gt_slots as u16,
            "slot {} out of range ({} GT slots)",
            self.slot_id,
            num_gt_slots
        );
        assert!(
            self.channel < num_channels,
            "channel {} out of range ({} channels)",
            self.channel,
            num_channels
        );
        let idx = (self.superframe_id as u32 * num_gt_slots as u32 + self.slot_id as u32)
            * num_channels as u32
            + self.channel as u32;
        assert!(idx <= AbsSlotIndex::MAX as u32, "absolute slot index {} exceeds 16 bits", idx);
        idx as AbsSlotIndex
    }

    /// Inverse of [`Gts::absolute_index`].
    ///
    /// # Panics
    /// If `idx` is not below `num_superframes * num_gt_slots * num_channels`.
    pub fn from_absolute_index(
        idx: AbsSlotIndex,
        num_gt_slots: u8,
        num_channels: u8,
        num_superframes_per_multi_superframe: u8,
    ) -> Gts {
        let slots_per_superframe = num_gt_slots as u32 * num_channels as u32;
        let total = slots_per_superframe * num_superframes_per_multi_superframe as u32;
        assert!(
            (idx as u32) < total,
            "absolute slot index {} out of range ({} slots)",
            idx,
            total
        );
        let idx = idx as u32;
        let superframe_id = idx / slots_per_superframe;
        let within = idx % slots_per_superframe;
        Gts {
            superframe_id: superframe_id as u16,
            slot_id: (within / num_channels as u32) as u16,
            channel: (within % num_channels as u32) as ChannelNumber,
        }
    }
}

impl fmt::Display for Gts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            write!(f, "GTS(undefined)")
        } else {
            write!(
                f,
                "GTS(sf={}, slot={}, ch={})",
                self.superframe_id, self.slot_id, self.channel
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Configurations seen in practice: default 7 GT slots / 16 channels,
    // CAP reduction with 15 GT slots, and a single-channel setup.
    const CONFIGS: [(u8, u8, u8); 4] = [(7, 16, 2), (15, 16, 4), (7, 1, 8), (15, 4, 1)];

    #[test]
    fn test_coordinate_round_trip() {
        for (slots, channels, superframes) in CONFIGS {
            for sf in 0..superframes as u16 {
                for slot in 0..slots as u16 {
                    for ch in 0..channels {
                        let gts = Gts::new(sf, slot, ch);
                        let idx = gts.absolute_index(slots, channels);
                        assert_eq!(Gts::from_absolute_index(idx, slots, channels, superframes), gts);
                    }
                }
            }
        }
    }

    #[test]
    fn test_index_round_trip_covers_whole_range() {
        for (slots, channels, superframes) in CONFIGS {
            let total = slots as u16 * channels as u16 * superframes as u16;
            for idx in 0..total {
                let gts = Gts::from_absolute_index(idx, slots, channels, superframes);
                assert_eq!(gts.absolute_index(slots, channels), idx);
            }
        }
    }

    #[test]
    fn test_ordering_superframe_then_slot_then_channel() {
        assert_eq!(Gts::new(0, 0, 1).absolute_index(7, 16), 1);
        assert_eq!(Gts::new(0, 1, 0).absolute_index(7, 16), 16);
        assert_eq!(Gts::new(1, 0, 0).absolute_index(7, 16), 7 * 16);
        assert_eq!(Gts::new(1, 2, 3).absolute_index(7, 16), 7 * 16 + 2 * 16 + 3);
    }

    #[test]
    #[should_panic]
    fn test_channel_out_of_bounds_is_fatal() {
        Gts::new(0, 0, 16).absolute_index(7, 16);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_bounds_is_fatal() {
        Gts::from_absolute_index(7 * 16 * 2, 7, 16, 2);
    }

    #[test]
    fn test_undefined_marker() {
        assert!(Gts::UNDEFINED.is_undefined());
        assert!(!Gts::new(0, 0, 0).is_undefined());
    }
}
