//! Fixed-capacity bit-set recording which beacon slots (SD indexes) are in use.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

const WORD_BITS: u16 = u32::BITS as u16;

/// The DSME beacon bitmap (IEEE 802.15.4-2015, 7.4.4.22).
///
/// One bit per beacon slot of a beacon interval. `sd_index` is the slot the
/// owner of the bitmap transmits its own beacon in. The length is fixed when
/// the bitmap is created and only changes through [`BeaconBitmap::set_length`],
/// which clears all bits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BeaconBitmap {
    sd_index: u16,
    len: u16,
    words: Vec<u32>,
}

impl BeaconBitmap {
    /// Creates an all-clear bitmap with `len` beacon slots.
    pub fn new(len: u16) -> Self {
        Self {
            sd_index: 0,
            len,
            words: vec![0; Self::words_for(len)],
        }
    }

    fn words_for(len: u16) -> usize {
        len.div_ceil(WORD_BITS) as usize
    }

    /// Resizes the bitmap to `len` slots and clears every bit.
    pub fn set_length(&mut self, len: u16) {
        self.len = len;
        self.words = vec![0; Self::words_for(len)];
    }

    /// Number of beacon slots tracked by this bitmap.
    pub fn len(&self) -> u16 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn sd_index(&self) -> u16 {
        self.sd_index
    }

    pub fn set_sd_index(&mut self, sd_index: u16) {
        self.sd_index = sd_index;
    }

    /// True if `index` addresses a slot of this bitmap.
    pub fn contains_index(&self, index: u16) -> bool {
        index < self.len
    }

    /// Marks slot `index` as occupied.
    ///
    /// # Panics
    /// If `index` is out of range. Callers validate indexes taken from received frames.
    pub fn set(&mut self, index: u16) {
        assert!(self.contains_index(index), "beacon slot {} out of range {}", index, self.len);
        self.words[(index / WORD_BITS) as usize] |= 1 << (index % WORD_BITS);
    }

    /// Returns whether slot `index` is occupied. Out-of-range slots read as free.
    pub fn get(&self, index: u16) -> bool {
        if !self.contains_index(index) {
            return false;
        }
        self.words[(index / WORD_BITS) as usize] & (1 << (index % WORD_BITS)) != 0
    }

    /// Scans left to right and returns the first free slot, if any.
    pub fn first_unset(&self) -> Option<u16> {
        for (i, word) in self.words.iter().enumerate() {
            if *word != u32::MAX {
                let index = i as u16 * WORD_BITS + (!word).trailing_zeros() as u16;
                // Padding bits of the last word are always zero.
                return (index < self.len).then_some(index);
            }
        }
        None
    }

    /// Merges the occupied slots of `other` into this bitmap.
    /// Slots beyond this bitmap's length are ignored.
    pub fn or_with(&mut self, other: &BeaconBitmap) {
        for (mine, theirs) in self.words.iter_mut().zip(other.words.iter()) {
            *mine |= *theirs;
        }
        self.mask_padding();
    }

    /// Number of occupied slots.
    pub fn count_set(&self) -> u16 {
        self.words.iter().map(|w| w.count_ones() as u16).sum()
    }

    fn mask_padding(&mut self) {
        let rem = self.len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u32 << rem) - 1;
            }
        }
    }
}

impl fmt::Display for BeaconBitmap {
    /// Formats the bitmap as a string of 0/1 from slot 0 upwards.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}
