use core::fmt;

// --- Primitive Types ---

/// Alias for an 8-bit MAC sequence number (DSN/BSN).
pub type SequenceNumber = u8;

/// Linear index of a slot within one multi-superframe.
pub type AbsSlotIndex = u16;

/// Channel number as used by the PHY (e.g., 11-26 for 2.4 GHz O-QPSK).
pub type ChannelNumber = u8;

// --- MAC Constants (IEEE 802.15.4-2015, Table 8-93) ---

/// The number of symbols forming a superframe slot when the superframe order is zero.
pub const A_BASE_SLOT_DURATION: u32 = 60;

/// The number of slots contained in any superframe.
pub const A_NUM_SUPERFRAME_SLOTS: u8 = 16;

/// The number of symbols forming a superframe when the superframe order is zero.
pub const A_BASE_SUPERFRAME_DURATION: u32 = A_BASE_SLOT_DURATION * A_NUM_SUPERFRAME_SLOTS as u32;

/// The number of consecutive lost beacons that cause a loss of synchronization.
pub const A_MAX_LOST_BEACONS: u8 = 4;

/// RX-to-TX or TX-to-RX turnaround time in symbol periods.
pub const A_TURNAROUND_TIME: u32 = 12;

/// The number of symbols forming the basic CSMA-CA time period.
pub const A_UNIT_BACKOFF_PERIOD: u32 = 20;

/// Broadcast short address and PAN identifier.
pub const BROADCAST_SHORT_ADDRESS: u16 = 0xFFFF;

/// Short address value signalling that the device has no short address.
pub const NO_SHORT_ADDRESS: u16 = 0xFFFE;

// --- Addressing ---

/// A 16-bit IEEE 802.15.4 short address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShortAddress(pub u16);

impl ShortAddress {
    pub const BROADCAST: ShortAddress = ShortAddress(BROADCAST_SHORT_ADDRESS);

    /// Checks if the address is the broadcast address (0xFFFF).
    pub fn is_broadcast(&self) -> bool {
        self.0 == BROADCAST_SHORT_ADDRESS
    }
}

impl fmt::Display for ShortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// A 64-bit IEEE EUI-64 extended address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtendedAddress(pub u64);

impl fmt::Display for ExtendedAddress {
    /// Formats the address as "XX:XX:XX:XX:XX:XX:XX:XX".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0.to_be_bytes();
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]
        )
    }
}

/// A 16-bit PAN identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanId(pub u16);

impl PanId {
    pub const BROADCAST: PanId = PanId(BROADCAST_SHORT_ADDRESS);

    pub fn is_broadcast(&self) -> bool {
        self.0 == BROADCAST_SHORT_ADDRESS
    }
}

/// Addressing mode of a source or destination address field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AddressingMode {
    /// Address field is not present.
    #[default]
    None = 0b00,
    /// 16-bit short address.
    Short = 0b10,
    /// 64-bit extended address.
    Extended = 0b11,
}

/// A MAC address as carried in a frame header. The variant defines the addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum MacAddress {
    #[default]
    None,
    Short(ShortAddress),
    Extended(ExtendedAddress),
}

impl MacAddress {
    /// The broadcast destination (short address 0xFFFF).
    pub const BROADCAST: MacAddress = MacAddress::Short(ShortAddress::BROADCAST);

    pub fn addressing_mode(&self) -> AddressingMode {
        match self {
            MacAddress::None => AddressingMode::None,
            MacAddress::Short(_) => AddressingMode::Short,
            MacAddress::Extended(_) => AddressingMode::Extended,
        }
    }

    /// Only a short address of 0xFFFF is a broadcast address.
    pub fn is_broadcast(&self) -> bool {
        matches!(self, MacAddress::Short(s) if s.is_broadcast())
    }

    pub fn short(&self) -> Option<ShortAddress> {
        match self {
            MacAddress::Short(s) => Some(*s),
            _ => None,
        }
    }
}

impl From<ShortAddress> for MacAddress {
    fn from(address: ShortAddress) -> Self {
        MacAddress::Short(address)
    }
}

impl From<ExtendedAddress> for MacAddress {
    fn from(address: ExtendedAddress) -> Self {
        MacAddress::Extended(address)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacAddress::None => write!(f, "<none>"),
            MacAddress::Short(s) => write!(f, "{}", s),
            MacAddress::Extended(e) => write!(f, "{}", e),
        }
    }
}
