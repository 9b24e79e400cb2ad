use super::delivery::Delivery;
use super::{DsmeIndication, SendOrigin};
use crate::ack::{AckLayer, ReceiveOutcome, Rejected, SendCompletion};
use crate::beacon::{BeaconAction, BeaconManager, ScanDuration, ScanType};
use crate::frame::{Frame, FramePayload, FrameType, MacCommand, PanDescriptor};
use crate::hal::{DsmeError, Platform, TimerHandle};
use crate::pib::{MacPib, PhyPib, PibHelper};
use crate::types::ChannelNumber;
use alloc::vec::Vec;
use log::{debug, info, trace, warn};

/// The DSME MAC core of one device.
///
/// Owns the PIB, the acknowledgment layer, the beacon manager and the
/// platform. The host feeds radio, timer and superframe events in through the
/// `on_*` methods and receives `DsmeIndication`s back.
pub struct DsmeLayer<P: Platform> {
    mac: MacPib,
    phy: PhyPib,
    ack: AckLayer<SendOrigin>,
    beacons: BeaconManager,
    platform: P,
}

impl<P: Platform> DsmeLayer<P> {
    /// Validates the PIB and sets up the components.
    pub fn new(mut mac: MacPib, phy: PhyPib, platform: P) -> Result<Self, DsmeError> {
        mac.validate()?;
        phy.validate()?;
        let ack_wait_duration = PibHelper::new(&mac, &phy).ack_wait_duration();
        let mut beacons = BeaconManager::new();
        beacons.initialize(&mut mac, &phy);
        info!(
            "[DSME] Layer created for {} (PAN coordinator: {}, BO={} MO={} SO={})",
            mac.short_address,
            mac.is_pan_coord,
            mac.beacon_order,
            mac.multi_superframe_order,
            mac.superframe_order
        );
        Ok(Self {
            mac,
            phy,
            ack: AckLayer::new(ack_wait_duration),
            beacons,
            platform,
        })
    }

    pub fn mac_pib(&self) -> &MacPib {
        &self.mac
    }

    pub fn phy_pib(&self) -> &PhyPib {
        &self.phy
    }

    pub fn ack_layer(&self) -> &AckLayer<SendOrigin> {
        &self.ack
    }

    pub fn beacon_manager(&self) -> &BeaconManager {
        &self.beacons
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Sends `frame` directly through the acknowledgment layer. The outcome
    /// arrives later as `DsmeIndication::SendConfirm`. A busy layer hands the
    /// frame back.
    pub fn send(&mut self, frame: Frame) -> Result<(), Rejected<SendOrigin>> {
        self.ack.send_but_keep(frame, SendOrigin::Upper, &mut self.platform)
    }

    /// Entry point for every frame the radio receives.
    pub fn on_frame_received(&mut self, frame: Frame) -> Vec<DsmeIndication> {
        let mut indications = Vec::new();
        let mut delivery = Delivery::new(&mut self.platform);
        let outcome = self.ack.receive(frame, &self.mac, &mut delivery);
        let delivered = delivery.take();

        match outcome {
            ReceiveOutcome::AckMatched(completion) => self.complete(completion, &mut indications),
            ReceiveOutcome::AckNotSent(e) => {
                warn!("[DSME] Frame delivered without acknowledgment: {}", e)
            }
            other => trace!("[DSME] Reception outcome: {:?}", other),
        }
        if let Some(frame) = delivered {
            self.route(frame, &mut indications);
        }
        indications
    }

    /// The radio finished a transmission started by the acknowledgment layer.
    pub fn on_send_done(&mut self, success: bool) -> Vec<DsmeIndication> {
        let mut indications = Vec::new();
        if let Some(completion) = self.ack.send_done(success, &mut self.platform) {
            self.complete(completion, &mut indications);
        }
        indications
    }

    /// The acknowledgment timer armed with `handle` expired.
    pub fn on_ack_timer(&mut self, handle: TimerHandle) -> Vec<DsmeIndication> {
        let mut indications = Vec::new();
        if let Some(completion) = self.ack.dispatch_timer(handle, &mut self.platform) {
            self.complete(completion, &mut indications);
        }
        indications
    }

    /// Start of a superframe. `lateness` is the delay of this call after the
    /// scheduled start, in symbols.
    pub fn on_superframe(
        &mut self,
        superframe: u16,
        multi_superframe: u16,
        lateness: u32,
    ) -> Vec<DsmeIndication> {
        let now = self.platform.symbol_counter();
        let actions = self.beacons.superframe_event(
            superframe,
            multi_superframe,
            lateness,
            now,
            &mut self.mac,
            &self.phy,
        );
        self.apply(actions)
    }

    pub fn on_start_of_cfp(&mut self) -> Vec<DsmeIndication> {
        let actions = self.beacons.handle_start_of_cfp(&self.mac);
        self.apply(actions)
    }

    /// A frame queued with `Platform::send_in_cap` left the CAP queue.
    /// The frame returns to the pool.
    pub fn on_cap_sent(&mut self, frame: Frame, success: bool) {
        self.beacons.on_cap_sent(&frame, success, &mut self.mac);
        self.platform.release_message(frame);
    }

    /// Converts an MLME-SCAN duration exponent into the per-channel scan
    /// time under the current superframe structure.
    pub fn scan_duration(&self, exponent: u8) -> Result<ScanDuration, DsmeError> {
        ScanDuration::from_exponent(exponent, &PibHelper::new(&self.mac, &self.phy))
    }

    /// Starts a scan spending `duration` on each of `channels`.
    pub fn start_scan(
        &mut self,
        scan_type: ScanType,
        duration: ScanDuration,
        channels: &[ChannelNumber],
    ) -> Result<Vec<DsmeIndication>, DsmeError> {
        let duration = duration.superframes();
        let actions = match scan_type {
            ScanType::Passive => {
                self.beacons
                    .start_scan_passive(duration, channels, &mut self.mac, &self.phy)?
            }
            ScanType::EnhancedActive => {
                self.beacons
                    .start_scan_enhanced_active(duration, channels, &mut self.mac, &self.phy)?
            }
        };
        Ok(self.apply(actions))
    }

    /// Synchronizes to the coordinator described by `descriptor`.
    pub fn start_tracking(
        &mut self,
        descriptor: &PanDescriptor,
    ) -> Result<Vec<DsmeIndication>, DsmeError> {
        let actions = self
            .beacons
            .start_tracking(descriptor, &mut self.mac, &self.phy)?;
        Ok(self.apply(actions))
    }

    fn route(&mut self, frame: Frame, indications: &mut Vec<DsmeIndication>) {
        let actions = match frame.frame_type() {
            FrameType::Data => {
                indications.push(DsmeIndication::DataReceived(frame));
                return;
            }
            FrameType::Beacon => match &frame.payload {
                FramePayload::EnhancedBeacon(descriptor) => {
                    self.beacons
                        .handle_enhanced_beacon(&frame, descriptor, &self.mac, &self.phy)
                }
                _ => self.beacons.handle_beacon(&frame, &self.mac, &self.phy),
            },
            FrameType::Command => match frame.command_payload() {
                Some(MacCommand::BeaconRequest) => {
                    let now = self.platform.symbol_counter();
                    self.beacons
                        .handle_beacon_request(&frame, now, &self.mac, &self.phy)
                }
                Some(MacCommand::BeaconAllocationNotification { .. }) => {
                    self.beacons.handle_beacon_allocation(&frame, &self.mac)
                }
                Some(MacCommand::BeaconCollisionNotification { .. }) => {
                    self.beacons.handle_beacon_collision(&frame, &self.mac)
                }
                None => Vec::new(),
            },
            FrameType::Acknowledgement => Vec::new(),
        };
        self.platform.release_message(frame);
        indications.extend(self.apply(actions));
    }

    fn complete(&mut self, completion: SendCompletion<SendOrigin>, indications: &mut Vec<DsmeIndication>) {
        match completion.origin {
            SendOrigin::Upper => indications.push(DsmeIndication::SendConfirm {
                response: completion.response,
                frame: completion.frame,
            }),
            SendOrigin::Beacon => {
                debug!("[DSME] Beacon transmission: {:?}", completion.response);
                self.platform.release_message(completion.frame);
            }
        }
    }

    fn apply(&mut self, actions: Vec<BeaconAction>) -> Vec<DsmeIndication> {
        let mut indications = Vec::new();
        for action in actions {
            match action {
                BeaconAction::SetChannel(channel) => {
                    self.phy.current_channel = channel;
                    self.platform.set_channel(channel);
                }
                BeaconAction::SendBeacon(frame) => {
                    if let Err(rejected) =
                        self.ack.send_but_keep(frame, SendOrigin::Beacon, &mut self.platform)
                    {
                        warn!("[DSME] Beacon not sent: {:?}", rejected.reason);
                        self.platform.release_message(rejected.frame);
                    }
                }
                BeaconAction::SendInCap(frame) => {
                    if let Err(e) = self.platform.send_in_cap(frame) {
                        warn!("[DSME] CAP transmission refused: {}", e);
                    }
                }
                BeaconAction::Resynchronize {
                    beacon_interval_start,
                    superframe,
                    multi_superframe,
                } => indications.push(DsmeIndication::Resynchronized {
                    beacon_interval_start,
                    superframe,
                    multi_superframe,
                }),
                BeaconAction::ScanComplete(confirm) => {
                    indications.push(DsmeIndication::ScanConfirm(confirm))
                }
                BeaconAction::SyncLoss(reason) => indications.push(DsmeIndication::SyncLoss(reason)),
            }
        }
        indications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ack::{AckLayerResponse, AckState, RejectReason};
    use crate::test_utils::MockPlatform;
    use crate::types::{MacAddress, PanId, ShortAddress};
    use alloc::vec;

    const PAN: PanId = PanId(0x1234);

    fn coordinator() -> DsmeLayer<MockPlatform> {
        let mac = MacPib {
            short_address: ShortAddress(0),
            pan_id: PAN,
            is_pan_coord: true,
            is_coord: true,
            ..Default::default()
        };
        DsmeLayer::new(mac, PhyPib::default(), MockPlatform::new()).unwrap()
    }

    #[test]
    fn test_invalid_pib_is_rejected() {
        let mac = MacPib {
            superframe_order: 7,
            ..Default::default()
        };
        assert!(matches!(
            DsmeLayer::new(mac, PhyPib::default(), MockPlatform::new()),
            Err(DsmeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_send_confirm_after_ack() {
        let mut layer = coordinator();
        let frame = Frame::data(
            ShortAddress(0).into(),
            ShortAddress(3).into(),
            PAN,
            vec![1],
            true,
        );
        layer.send(frame).unwrap();
        assert!(layer.on_send_done(true).is_empty());

        let mut ack = Frame::default();
        ack.make_ack(0, ShortAddress(0).into());
        let indications = layer.on_frame_received(ack);
        assert!(matches!(
            indications.as_slice(),
            [DsmeIndication::SendConfirm {
                response: AckLayerResponse::AckSuccessful,
                ..
            }]
        ));
    }

    #[test]
    fn test_send_while_busy_returns_frame() {
        let mut layer = coordinator();
        let frame = || Frame::data(ShortAddress(0).into(), ShortAddress(3).into(), PAN, vec![], true);
        layer.send(frame()).unwrap();
        let rejected = layer.send(frame()).unwrap_err();
        assert_eq!(rejected.reason, RejectReason::Busy);
    }

    #[test]
    fn test_data_frame_is_indicated_and_acknowledged() {
        let mut layer = coordinator();
        let frame = Frame::data(ShortAddress(3).into(), ShortAddress(0).into(), PAN, vec![9], true);
        let indications = layer.on_frame_received(frame);
        assert!(matches!(indications.as_slice(), [DsmeIndication::DataReceived(_)]));
        assert_eq!(layer.platform().delayed_acks.len(), 1);
        assert_eq!(layer.ack_layer().state(), AckState::TxAck);
        assert!(layer.on_send_done(true).is_empty());
        assert_eq!(layer.ack_layer().state(), AckState::Idle);
    }

    #[test]
    fn test_beacon_is_sent_and_released() {
        let mut layer = coordinator();
        layer.platform_mut().symbol_counter = 1_000;
        assert!(layer.on_superframe(0, 0, 0).is_empty());
        assert_eq!(layer.platform().direct_sent.len(), 1);
        assert!(layer.platform().direct_sent[0].is_enhanced_beacon());

        // Beacons are broadcast: no ack, the frame goes back to the pool.
        assert!(layer.on_send_done(true).is_empty());
        assert_eq!(layer.platform().released.len(), 1);
        assert!(!layer.ack_layer().is_busy());
    }

    #[test]
    fn test_allocation_of_own_slot_queues_collision_notification() {
        let mut layer = coordinator();
        let announce = Frame::command(
            MacCommand::BeaconAllocationNotification { beacon_sd_index: 0 },
            ShortAddress(4).into(),
            MacAddress::BROADCAST,
            PAN,
        );
        assert!(layer.on_frame_received(announce).is_empty());
        let queued = &layer.platform().cap_queue;
        assert_eq!(queued.len(), 1);
        assert_eq!(
            queued[0].command_payload(),
            Some(&MacCommand::BeaconCollisionNotification { beacon_sd_index: 0 })
        );
        // The notification itself was released after processing.
        assert_eq!(layer.platform().released.len(), 1);
    }

    #[test]
    fn test_scan_tunes_radio_and_reports() {
        let mut layer = coordinator();
        let duration = layer.scan_duration(0).unwrap();
        assert_eq!(duration, ScanDuration(1));
        let indications = layer.start_scan(ScanType::Passive, duration, &[20]).unwrap();
        assert!(indications.is_empty());
        assert_eq!(layer.phy_pib().current_channel, 20);

        let indications = layer.on_superframe(0, 0, 0);
        assert!(matches!(indications.as_slice(), [DsmeIndication::ScanConfirm(_)]));
        assert_eq!(layer.platform().channels, vec![20, 11]);
        assert_eq!(layer.mac_pib().pan_id, PAN);
    }

    #[test]
    fn test_scan_duration_exponent_is_validated() {
        let mut layer = coordinator();
        assert!(matches!(
            layer.scan_duration(15),
            Err(DsmeError::InvalidParameter(_))
        ));
        // 960 * (2^3 + 1) = 8640 symbols -> two superframes of 7680.
        let duration = layer.scan_duration(3).unwrap();
        layer.start_scan(ScanType::Passive, duration, &[20]).unwrap();
        assert_eq!(
            layer.beacon_manager().scan_state().map(|s| s.superframes_left),
            Some(2)
        );
    }

    #[test]
    fn test_cap_completion_releases_frame() {
        let mut layer = coordinator();
        let frame = Frame::command(
            MacCommand::BeaconRequest,
            ShortAddress(0).into(),
            MacAddress::BROADCAST,
            PanId::BROADCAST,
        );
        layer.on_cap_sent(frame, true);
        assert_eq!(layer.platform().released.len(), 1);
    }
}
