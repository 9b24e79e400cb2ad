//! Defines the owned frame handle passed between the MAC components.

pub mod command;
pub mod descriptor;
pub mod header;

pub use command::{CommandFrameIdentifier, MacCommand};
pub use descriptor::{
    DsmePanDescriptor, DsmeSuperframeSpecification, PanDescriptor, SuperframeSpecification,
    TimeSyncSpecification,
};
pub use header::{FrameType, FrameVersion, MacHeader};

use crate::types::{MacAddress, PanId, SequenceNumber};
use alloc::vec::Vec;

/// Decoded MAC payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FramePayload {
    #[default]
    Empty,
    /// MSDU of a data frame.
    Data(Vec<u8>),
    Command(MacCommand),
    /// Plain beacon carrying only a superframe specification.
    Beacon(SuperframeSpecification),
    /// Enhanced beacon of a DSME network.
    EnhancedBeacon(DsmePanDescriptor),
}

/// Reception metadata filled in by the radio driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RxInfo {
    /// Symbol counter at the start-of-frame delimiter.
    pub start_of_frame_symbol_counter: u32,
    pub link_quality: u8,
}

/// An in-flight MAC frame.
///
/// `Frame` is deliberately not `Clone`: exactly one component owns a frame at
/// any time and hands it on by moving it.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct Frame {
    pub header: MacHeader,
    pub payload: FramePayload,
    pub rx_info: RxInfo,
}

impl Frame {
    pub fn new(header: MacHeader, payload: FramePayload) -> Self {
        Self {
            header,
            payload,
            rx_info: RxInfo::default(),
        }
    }

    /// Builds a data frame from `src` to `dst` within `pan_id`.
    pub fn data(
        src: MacAddress,
        dst: MacAddress,
        pan_id: PanId,
        msdu: Vec<u8>,
        ack_request: bool,
    ) -> Self {
        let mut header = MacHeader::new(FrameType::Data);
        header.src_addr = src;
        header.dst_addr = dst;
        header.dst_pan_id = Some(pan_id);
        header.ack_request = ack_request;
        Self::new(header, FramePayload::Data(msdu))
    }

    /// Builds a MAC command frame. Broadcast commands never request an acknowledgment.
    pub fn command(command: MacCommand, src: MacAddress, dst: MacAddress, pan_id: PanId) -> Self {
        let mut header = MacHeader::new(FrameType::Command);
        header.src_addr = src;
        header.dst_addr = dst;
        header.dst_pan_id = Some(pan_id);
        header.ack_request = !dst.is_broadcast();
        Self::new(header, FramePayload::Command(command))
    }

    /// Turns `self` into an acknowledgment for sequence number `seq_num`.
    /// Used on frames taken from the message pool.
    pub fn make_ack(&mut self, seq_num: SequenceNumber, dst: MacAddress) {
        self.header = MacHeader {
            frame_type: FrameType::Acknowledgement,
            sequence_number: Some(seq_num),
            dst_addr: dst,
            ..Default::default()
        };
        self.payload = FramePayload::Empty;
        self.rx_info = RxInfo::default();
    }

    pub fn frame_type(&self) -> FrameType {
        self.header.frame_type
    }

    pub fn sequence_number(&self) -> Option<SequenceNumber> {
        self.header.sequence_number
    }

    /// Returns the MAC command carried by this frame, if any.
    pub fn command_payload(&self) -> Option<&MacCommand> {
        match &self.payload {
            FramePayload::Command(cmd) if self.header.frame_type == FrameType::Command => Some(cmd),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShortAddress;

    #[test]
    fn test_make_ack_resets_header_and_payload() {
        let mut frame = Frame::data(
            ShortAddress(1).into(),
            ShortAddress(2).into(),
            PanId(0x1234),
            alloc::vec![1, 2, 3],
            true,
        );
        frame.make_ack(42, ShortAddress(1).into());
        assert_eq!(frame.frame_type(), FrameType::Acknowledgement);
        assert_eq!(frame.sequence_number(), Some(42));
        assert!(!frame.header.ack_request);
        assert_eq!(frame.payload, FramePayload::Empty);
    }

    #[test]
    fn test_broadcast_command_does_not_request_ack() {
        let frame = Frame::command(
            MacCommand::BeaconAllocationNotification { beacon_sd_index: 3 },
            ShortAddress(1).into(),
            MacAddress::BROADCAST,
            PanId(0x1234),
        );
        assert!(!frame.header.ack_request);
        assert_eq!(
            frame.command_payload().map(|c| c.identifier()),
            Some(CommandFrameIdentifier::DsmeBeaconAllocationNotification)
        );
    }
}
