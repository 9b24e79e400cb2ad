use crate::types::{AddressingMode, MacAddress, PanId, SequenceNumber};

/// Frame type subfield of the frame control field (IEEE 802.15.4-2015, Table 7-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FrameType {
    Beacon = 0b000,
    #[default]
    Data = 0b001,
    Acknowledgement = 0b010,
    Command = 0b011,
}

/// Frame version subfield. Enhanced beacons use `Ieee802154`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FrameVersion {
    Ieee802154_2003 = 0b00,
    #[default]
    Ieee802154_2006 = 0b01,
    Ieee802154 = 0b10,
}

/// The MAC header (MHR) fields the DSME core reads and writes.
///
/// The bit-exact layout is the concern of the framing component; this is the
/// decoded view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MacHeader {
    pub frame_type: FrameType,
    pub frame_version: FrameVersion,
    pub ack_request: bool,
    /// `None` when sequence number suppression is in effect.
    pub sequence_number: Option<SequenceNumber>,
    pub dst_pan_id: Option<PanId>,
    pub dst_addr: MacAddress,
    pub src_pan_id: Option<PanId>,
    pub src_addr: MacAddress,
}

impl MacHeader {
    /// Creates a header of the given type with a (not yet assigned) sequence number.
    pub fn new(frame_type: FrameType) -> Self {
        Self {
            frame_type,
            sequence_number: Some(0),
            ..Default::default()
        }
    }

    pub fn has_sequence_number(&self) -> bool {
        self.sequence_number.is_some()
    }

    pub fn dst_addr_mode(&self) -> AddressingMode {
        self.dst_addr.addressing_mode()
    }

    pub fn src_addr_mode(&self) -> AddressingMode {
        self.src_addr.addressing_mode()
    }

    /// The PAN the frame originates from. With PAN ID compression only the
    /// destination PAN ID is present.
    pub fn src_pan(&self) -> Option<PanId> {
        self.src_pan_id.or(self.dst_pan_id)
    }

    pub fn is_enhanced_beacon(&self) -> bool {
        self.frame_type == FrameType::Beacon && self.frame_version == FrameVersion::Ieee802154
    }

    /// An acknowledgment is only expected for unicast frames that request one.
    pub fn expects_ack(&self) -> bool {
        self.ack_request && !self.dst_addr.is_broadcast()
    }
}
