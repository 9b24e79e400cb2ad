/// MAC command frame identifiers used by the beacon manager
/// (IEEE 802.15.4e-2012, Table 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandFrameIdentifier {
    BeaconRequest = 0x07,
    DsmeBeaconAllocationNotification = 0x1A,
    DsmeBeaconCollisionNotification = 0x1B,
}

/// Decoded MAC command payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacCommand {
    /// (Enhanced) beacon request sent during an active scan.
    BeaconRequest,
    /// Announces that the sender takes the beacon slot `beacon_sd_index`.
    BeaconAllocationNotification { beacon_sd_index: u16 },
    /// Tells the receiver that its beacon slot `beacon_sd_index` collides.
    BeaconCollisionNotification { beacon_sd_index: u16 },
}

impl MacCommand {
    pub fn identifier(&self) -> CommandFrameIdentifier {
        match self {
            MacCommand::BeaconRequest => CommandFrameIdentifier::BeaconRequest,
            MacCommand::BeaconAllocationNotification { .. } => {
                CommandFrameIdentifier::DsmeBeaconAllocationNotification
            }
            MacCommand::BeaconCollisionNotification { .. } => {
                CommandFrameIdentifier::DsmeBeaconCollisionNotification
            }
        }
    }
}
