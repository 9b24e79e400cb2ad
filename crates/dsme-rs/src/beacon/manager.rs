use super::counters::LostBeaconCounter;
use super::scan::{ScanState, ScanType};
use super::{BeaconAction, ClaimState, SyncLossReason, SyncState};
use crate::bitmap::BeaconBitmap;
use crate::frame::{
    DsmePanDescriptor, DsmeSuperframeSpecification, Frame, FramePayload, FrameType, FrameVersion,
    MacCommand, MacHeader, PanDescriptor, SuperframeSpecification, TimeSyncSpecification,
};
use crate::hal::DsmeError;
use crate::log::{LogContext, my_debug, my_info, my_trace, my_warn};
use crate::pib::{MAX_ORDER, MacPib, PhyPib, PibHelper};
use crate::types::{ChannelNumber, MacAddress, NO_SHORT_ADDRESS, PanId};
use alloc::vec;
use alloc::vec::Vec;

/// Maintains this device's view of the network timeline and of the beacon
/// slots in use around it.
///
/// The manager never talks to the radio itself. Every operation returns the
/// `BeaconAction`s the orchestrating layer has to carry out. Frames are only
/// borrowed; the caller keeps ownership.
#[derive(Debug, Default)]
pub struct BeaconManager {
    sync: SyncState,
    claim: ClaimState,
    scan: Option<ScanState>,
    heard_beacons: BeaconBitmap,
    neighbor_or_own_heard_beacons: BeaconBitmap,
    last_known_beacon_interval_start: u32,
    last_heard_beacon_timestamp: u32,
    /// The parent's beacon was heard in the current beacon interval.
    parent_heard: bool,
    lost_beacons: LostBeaconCounter,
    num_beacon_collisions: u32,
    superframe_ticks: u32,
    last_request_answered: Option<u32>,
}

impl BeaconManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes the bitmaps for the configured beacon interval and resets all
    /// synchronization state. A PAN coordinator owns beacon slot 0 and is
    /// synchronized to its own timeline.
    pub fn initialize(&mut self, mac: &mut MacPib, phy: &PhyPib) {
        let len = PibHelper::new(mac, phy).superframes_per_beacon_interval();
        self.heard_beacons.set_length(len);
        self.neighbor_or_own_heard_beacons.set_length(len);
        self.lost_beacons = LostBeaconCounter::new(mac.max_lost_beacons);
        self.scan = None;
        self.parent_heard = false;
        self.last_request_answered = None;

        if mac.is_pan_coord {
            mac.sd_index = 0;
            self.claim = ClaimState::Allocated(0);
            self.sync = SyncState::Synchronized { parent: None };
            self.heard_beacons.set(0);
            self.neighbor_or_own_heard_beacons.set(0);
            my_info!(ctx(mac), "PAN coordinator owns beacon slot 0 of {}", len);
        } else {
            self.claim = ClaimState::Unclaimed;
            self.sync = SyncState::Unsynchronized;
        }
        self.heard_beacons.set_sd_index(mac.sd_index);
        self.neighbor_or_own_heard_beacons.set_sd_index(mac.sd_index);
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    pub fn claim_state(&self) -> ClaimState {
        self.claim
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.is_some()
    }

    pub fn scan_state(&self) -> Option<&ScanState> {
        self.scan.as_ref()
    }

    pub fn last_known_beacon_interval_start(&self) -> u32 {
        self.last_known_beacon_interval_start
    }

    pub fn last_heard_beacon_timestamp(&self) -> u32 {
        self.last_heard_beacon_timestamp
    }

    pub fn heard_beacons(&self) -> &BeaconBitmap {
        &self.heard_beacons
    }

    pub fn neighbor_or_own_heard_beacons(&self) -> &BeaconBitmap {
        &self.neighbor_or_own_heard_beacons
    }

    pub fn num_heard_beacons(&self) -> u16 {
        self.heard_beacons.count_set()
    }

    pub fn num_beacon_collisions(&self) -> u32 {
        self.num_beacon_collisions
    }

    pub fn missed_beacons(&self) -> u8 {
        self.lost_beacons.missed()
    }

    // --- Scanning ---

    pub fn start_scan_passive(
        &mut self,
        duration: u16,
        channels: &[ChannelNumber],
        mac: &mut MacPib,
        phy: &PhyPib,
    ) -> Result<Vec<BeaconAction>, DsmeError> {
        self.start_scan(ScanType::Passive, duration, channels, mac, phy)
    }

    /// Enhanced active scan (IEEE 802.15.4e-2012, 6.2.10.1): an enhanced
    /// beacon request is sent on every channel before listening.
    pub fn start_scan_enhanced_active(
        &mut self,
        duration: u16,
        channels: &[ChannelNumber],
        mac: &mut MacPib,
        phy: &PhyPib,
    ) -> Result<Vec<BeaconAction>, DsmeError> {
        self.start_scan(ScanType::EnhancedActive, duration, channels, mac, phy)
    }

    fn start_scan(
        &mut self,
        scan_type: ScanType,
        duration: u16,
        channels: &[ChannelNumber],
        mac: &mut MacPib,
        phy: &PhyPib,
    ) -> Result<Vec<BeaconAction>, DsmeError> {
        if channels.is_empty() {
            return Err(DsmeError::InvalidParameter("empty scan channel list"));
        }
        if duration == 0 {
            return Err(DsmeError::InvalidParameter("scan duration must be positive"));
        }
        if let Some(previous) = self.scan.take() {
            my_warn!(ctx(mac), "Aborting running {:?} scan", previous.scan_type);
            mac.pan_id = previous.stored_pan_id;
        }

        let scan = ScanState {
            scan_type,
            channels: channels.to_vec(),
            current_channel_index: 0,
            superframes_per_channel: duration,
            superframes_left: duration,
            pan_descriptors: Vec::new(),
            stored_pan_id: mac.pan_id,
            stored_channel: phy.current_channel,
        };
        // Beacons of every PAN are accepted while scanning.
        mac.pan_id = PanId::BROADCAST;

        my_info!(
            ctx(mac),
            "Starting {:?} scan over {} channel(s), {} superframe(s) each",
            scan_type,
            channels.len(),
            duration
        );
        let mut actions = vec![BeaconAction::SetChannel(channels[0])];
        if scan_type == ScanType::EnhancedActive {
            actions.push(BeaconAction::SendInCap(beacon_request(mac)));
        }
        self.scan = Some(scan);
        Ok(actions)
    }

    fn advance_scan(&mut self, mac: &mut MacPib, actions: &mut Vec<BeaconAction>) {
        let Some(scan) = self.scan.as_mut() else {
            return;
        };
        if !scan.tick() {
            return;
        }
        if let Some(channel) = scan.advance() {
            my_debug!(ctx(mac), "Scanning channel {}", channel);
            actions.push(BeaconAction::SetChannel(channel));
            if scan.scan_type == ScanType::EnhancedActive {
                actions.push(BeaconAction::SendInCap(beacon_request(mac)));
            }
            return;
        }

        let Some(scan) = self.scan.take() else {
            return;
        };
        mac.pan_id = scan.stored_pan_id;
        actions.push(BeaconAction::SetChannel(scan.stored_channel));
        let confirm = scan.into_confirm();
        my_info!(
            ctx(mac),
            "{:?} scan complete: {:?} with {} PAN descriptor(s)",
            confirm.scan_type,
            confirm.status,
            confirm.pan_descriptors.len()
        );
        actions.push(BeaconAction::ScanComplete(confirm));
    }

    fn record_scan_result(
        &mut self,
        frame: &Frame,
        superframe_spec: SuperframeSpecification,
        dsme: Option<DsmePanDescriptor>,
        mac: &MacPib,
    ) {
        let Some(scan) = self.scan.as_mut() else {
            return;
        };
        let Some(channel) = scan.current_channel() else {
            return;
        };
        let link_quality = frame.rx_info.link_quality;
        if link_quality < mac.scan_min_link_quality {
            my_trace!(
                ctx(mac),
                "Ignoring weak beacon of {} (LQI {})",
                frame.header.src_addr,
                link_quality
            );
            return;
        }
        let descriptor = PanDescriptor {
            coord_address: frame.header.src_addr,
            coord_pan_id: frame.header.src_pan().unwrap_or(PanId::BROADCAST),
            channel_number: channel,
            superframe_spec,
            link_quality,
            timestamp: frame.rx_info.start_of_frame_symbol_counter,
            dsme,
        };
        let (coord, pan_id) = (descriptor.coord_address, descriptor.coord_pan_id);
        if scan.record(descriptor) {
            my_debug!(ctx(mac), "Found PAN {:?} of {} on channel {}", pan_id, coord, channel);
        }
    }

    // --- Beacon reception ---

    /// Handles a plain (non-enhanced) beacon. Outside of a scan only the
    /// parent's beacon matters; it is taken as the start of the beacon interval.
    pub fn handle_beacon(&mut self, frame: &Frame, mac: &MacPib, phy: &PhyPib) -> Vec<BeaconAction> {
        let FramePayload::Beacon(superframe_spec) = &frame.payload else {
            my_trace!(ctx(mac), "Dropping malformed beacon of {}", frame.header.src_addr);
            return Vec::new();
        };
        if self.scan.is_some() {
            self.record_scan_result(frame, *superframe_spec, None, mac);
            return Vec::new();
        }
        if !is_own_pan(frame, mac) {
            my_trace!(ctx(mac), "Dropping beacon of foreign PAN {:?}", frame.header.src_pan());
            return Vec::new();
        }
        if self.is_parent(frame) {
            return self.track_parent(frame.rx_info.start_of_frame_symbol_counter, 0, 0, mac, phy);
        }
        Vec::new()
    }

    pub fn handle_enhanced_beacon(
        &mut self,
        frame: &Frame,
        descriptor: &DsmePanDescriptor,
        mac: &MacPib,
        phy: &PhyPib,
    ) -> Vec<BeaconAction> {
        let mut actions = Vec::new();
        let Some(sd_index) = announced_sd_index(descriptor) else {
            my_trace!(
                ctx(mac),
                "Dropping beacon of {} with invalid slot {}",
                frame.header.src_addr,
                descriptor.beacon_bitmap.sd_index()
            );
            return actions;
        };
        if self.scan.is_none()
            && sd_index >= PibHelper::new(mac, phy).superframes_per_beacon_interval()
        {
            my_trace!(
                ctx(mac),
                "Dropping beacon of {}: slot {} outside our beacon interval",
                frame.header.src_addr,
                sd_index
            );
            return actions;
        }

        if self.scan.is_some() {
            self.record_scan_result(frame, descriptor.superframe_spec, Some(descriptor.clone()), mac);
        } else if !is_own_pan(frame, mac) {
            my_trace!(ctx(mac), "Dropping beacon of foreign PAN {:?}", frame.header.src_pan());
            return actions;
        } else if self.is_parent(frame) {
            actions.extend(self.track_parent(
                frame.rx_info.start_of_frame_symbol_counter,
                u32::from(descriptor.time_sync.beacon_offset_timestamp),
                sd_index,
                mac,
                phy,
            ));
        }

        self.mark_heard(sd_index);
        self.neighbor_or_own_heard_beacons.or_with(&descriptor.beacon_bitmap);

        if self.scan.is_none() && self.claim == ClaimState::Allocated(sd_index) {
            my_warn!(
                ctx(mac),
                "Beacon of {} in our slot {}, notifying collision",
                frame.header.src_addr,
                sd_index
            );
            actions.push(BeaconAction::SendInCap(collision_notification(
                sd_index,
                frame.header.src_addr,
                mac,
            )));
        }
        actions
    }

    fn track_parent(
        &mut self,
        rx_symbol_counter: u32,
        beacon_offset: u32,
        sd_index: u16,
        mac: &MacPib,
        phy: &PhyPib,
    ) -> Vec<BeaconAction> {
        let helper = PibHelper::new(mac, phy);
        let beacon_interval_start = rx_symbol_counter
            .wrapping_sub(beacon_offset)
            .wrapping_sub(u32::from(sd_index) * helper.symbols_per_superframe());
        self.last_known_beacon_interval_start = beacon_interval_start;
        self.last_heard_beacon_timestamp = rx_symbol_counter;
        self.lost_beacons.reset();
        self.parent_heard = true;

        let per_msf = helper.superframes_per_multi_superframe();
        my_trace!(
            ctx(mac),
            "Parent beacon in slot {}, interval start {}",
            sd_index,
            beacon_interval_start
        );
        vec![BeaconAction::Resynchronize {
            beacon_interval_start,
            superframe: sd_index % per_msf,
            multi_superframe: sd_index / per_msf,
        }]
    }

    fn is_parent(&self, frame: &Frame) -> bool {
        matches!(self.sync, SyncState::Synchronized { parent: Some(p) } if p == frame.header.src_addr)
    }

    fn mark_heard(&mut self, sd_index: u16) {
        if self.heard_beacons.contains_index(sd_index) {
            self.heard_beacons.set(sd_index);
            self.neighbor_or_own_heard_beacons.set(sd_index);
        }
    }

    // --- Beacon slot arbitration ---

    /// Another device reports that our beacon slot collides with its own.
    pub fn handle_beacon_collision(&mut self, frame: &Frame, mac: &MacPib) -> Vec<BeaconAction> {
        let Some(MacCommand::BeaconCollisionNotification { beacon_sd_index }) =
            frame.command_payload()
        else {
            return Vec::new();
        };
        let sd_index = *beacon_sd_index;
        if mac.is_pan_coord || self.claim.sd_index() != Some(sd_index) {
            my_trace!(ctx(mac), "Ignoring collision notification for slot {}", sd_index);
            return Vec::new();
        }

        self.num_beacon_collisions = self.num_beacon_collisions.saturating_add(1);
        self.claim = ClaimState::Unclaimed;
        if self.neighbor_or_own_heard_beacons.contains_index(sd_index) {
            // The slot stays taken by the other device.
            self.neighbor_or_own_heard_beacons.set(sd_index);
        }
        my_warn!(
            ctx(mac),
            "Beacon slot {} collides (reported by {}), reallocating",
            sd_index,
            frame.header.src_addr
        );
        self.allocate_free_slot(mac).into_iter().collect()
    }

    /// A neighbor announces the beacon slot it takes.
    pub fn handle_beacon_allocation(&mut self, frame: &Frame, mac: &MacPib) -> Vec<BeaconAction> {
        let Some(MacCommand::BeaconAllocationNotification { beacon_sd_index }) =
            frame.command_payload()
        else {
            return Vec::new();
        };
        let sd_index = *beacon_sd_index;
        if self.claim == ClaimState::Allocated(sd_index) {
            my_warn!(
                ctx(mac),
                "{} announced our beacon slot {}",
                frame.header.src_addr,
                sd_index
            );
            return vec![BeaconAction::SendInCap(collision_notification(
                sd_index,
                frame.header.src_addr,
                mac,
            ))];
        }
        my_debug!(ctx(mac), "{} allocated beacon slot {}", frame.header.src_addr, sd_index);
        self.mark_heard(sd_index);
        Vec::new()
    }

    /// Answers an (enhanced) beacon request with our beacon, at most once per superframe.
    pub fn handle_beacon_request(
        &mut self,
        frame: &Frame,
        now: u32,
        mac: &MacPib,
        phy: &PhyPib,
    ) -> Vec<BeaconAction> {
        if frame.command_payload() != Some(&MacCommand::BeaconRequest) {
            return Vec::new();
        }
        let ClaimState::Allocated(sd_index) = self.claim else {
            return Vec::new();
        };
        if self.scan.is_some() || self.sync == SyncState::Unsynchronized {
            return Vec::new();
        }
        if self.last_request_answered == Some(self.superframe_ticks) {
            my_trace!(ctx(mac), "Beacon request of {} rate limited", frame.header.src_addr);
            return Vec::new();
        }

        // Receivers derive the interval start from the offset to our slot.
        let slot_start = self.last_known_beacon_interval_start.wrapping_add(
            u32::from(sd_index) * PibHelper::new(mac, phy).symbols_per_superframe(),
        );
        let Ok(offset) = u16::try_from(now.wrapping_sub(slot_start)) else {
            my_debug!(ctx(mac), "Beacon request too far from our beacon slot");
            return Vec::new();
        };
        self.last_request_answered = Some(self.superframe_ticks);
        my_debug!(ctx(mac), "Answering beacon request of {}", frame.header.src_addr);
        vec![BeaconAction::SendInCap(self.enhanced_beacon(slot_start, offset, mac, phy))]
    }

    /// Start of the contention free period: a synchronized coordinator without
    /// a beacon slot announces the first free one.
    pub fn handle_start_of_cfp(&mut self, mac: &MacPib) -> Vec<BeaconAction> {
        if self.scan.is_some() || mac.is_pan_coord || !mac.is_coord {
            return Vec::new();
        }
        if !matches!(self.sync, SyncState::Synchronized { parent: Some(_) })
            || self.claim != ClaimState::Unclaimed
        {
            return Vec::new();
        }
        self.allocate_free_slot(mac).into_iter().collect()
    }

    /// Completion of a frame this manager queued for the CAP.
    pub fn on_cap_sent(&mut self, frame: &Frame, success: bool, mac: &mut MacPib) {
        let Some(MacCommand::BeaconAllocationNotification { beacon_sd_index }) =
            frame.command_payload()
        else {
            return;
        };
        let sd_index = *beacon_sd_index;
        if self.claim != ClaimState::AllocationSent(sd_index) {
            my_trace!(ctx(mac), "Stale allocation notification for slot {}", sd_index);
            return;
        }
        if success {
            self.claim = ClaimState::Allocated(sd_index);
            mac.sd_index = sd_index;
            self.neighbor_or_own_heard_beacons.set(sd_index);
            self.neighbor_or_own_heard_beacons.set_sd_index(sd_index);
            self.heard_beacons.set_sd_index(sd_index);
            my_info!(ctx(mac), "Allocated beacon slot {}", sd_index);
        } else {
            self.claim = ClaimState::Unclaimed;
            my_debug!(ctx(mac), "Allocation notification for slot {} failed", sd_index);
        }
    }

    fn allocate_free_slot(&mut self, mac: &MacPib) -> Option<BeaconAction> {
        let Some(sd_index) = self.neighbor_or_own_heard_beacons.first_unset() else {
            my_warn!(
                ctx(mac),
                "No free beacon slot: {}",
                self.neighbor_or_own_heard_beacons
            );
            return None;
        };
        self.claim = ClaimState::AllocationSent(sd_index);
        my_debug!(ctx(mac), "Announcing beacon slot {}", sd_index);
        let frame = Frame::command(
            MacCommand::BeaconAllocationNotification {
                beacon_sd_index: sd_index,
            },
            own_address(mac),
            MacAddress::BROADCAST,
            mac.pan_id,
        );
        Some(BeaconAction::SendInCap(frame))
    }

    // --- Timeline ---

    /// Adopts a coordinator found by a scan as parent (MLME-SYNC). The
    /// superframe structure announced in its beacon replaces the local one.
    pub fn start_tracking(
        &mut self,
        descriptor: &PanDescriptor,
        mac: &mut MacPib,
        phy: &PhyPib,
    ) -> Result<Vec<BeaconAction>, DsmeError> {
        if self.scan.is_some() {
            return Err(DsmeError::NotReady);
        }
        if mac.is_pan_coord {
            return Err(DsmeError::InvalidParameter("PAN coordinator cannot track a parent"));
        }
        let Some(dsme) = &descriptor.dsme else {
            return Err(DsmeError::InvalidParameter("descriptor of a non-DSME network"));
        };
        let Some(sd_index) = announced_sd_index(dsme) else {
            return Err(DsmeError::InvalidParameter("coordinator beacon slot outside its beacon interval"));
        };

        let mut candidate = mac.clone();
        match descriptor.coord_address {
            MacAddress::Short(addr) => candidate.coord_short_address = addr,
            MacAddress::Extended(addr) => candidate.coord_extended_address = addr,
            MacAddress::None => {
                return Err(DsmeError::InvalidParameter("descriptor without coordinator address"));
            }
        }
        candidate.pan_id = descriptor.coord_pan_id;
        candidate.beacon_order = dsme.superframe_spec.beacon_order;
        candidate.superframe_order = dsme.superframe_spec.superframe_order;
        candidate.multi_superframe_order = dsme.dsme_superframe_spec.multi_superframe_order;
        candidate.cap_reduction = dsme.dsme_superframe_spec.cap_reduction;
        candidate.sd_index = 0;
        candidate
            .validate()
            .map_err(|_| DsmeError::InvalidParameter("coordinator announces an invalid superframe structure"))?;
        *mac = candidate;

        self.initialize(mac, phy);
        self.sync = SyncState::Synchronized {
            parent: Some(descriptor.coord_address),
        };
        self.mark_heard(sd_index);
        self.neighbor_or_own_heard_beacons.or_with(&dsme.beacon_bitmap);

        my_info!(
            ctx(mac),
            "Tracking beacons of {} on channel {} (PAN {:?})",
            descriptor.coord_address,
            descriptor.channel_number,
            descriptor.coord_pan_id
        );
        let mut actions = vec![BeaconAction::SetChannel(descriptor.channel_number)];
        actions.extend(self.track_parent(
            descriptor.timestamp,
            u32::from(dsme.time_sync.beacon_offset_timestamp),
            sd_index,
            mac,
            phy,
        ));
        Ok(actions)
    }

    /// Per-superframe tick. `superframe` counts within the multi-superframe,
    /// `multi_superframe` within the beacon interval. `lateness` is the delay
    /// of this call after the scheduled superframe start and `now` the current
    /// symbol counter.
    pub fn superframe_event(
        &mut self,
        superframe: u16,
        multi_superframe: u16,
        lateness: u32,
        now: u32,
        mac: &mut MacPib,
        phy: &PhyPib,
    ) -> Vec<BeaconAction> {
        let mut actions = Vec::new();
        self.superframe_ticks = self.superframe_ticks.wrapping_add(1);

        if self.scan.is_some() {
            self.advance_scan(mac, &mut actions);
            return actions;
        }

        let helper = PibHelper::new(mac, phy);
        let per_msf = helper.superframes_per_multi_superframe();
        let sd_index = multi_superframe
            .wrapping_mul(per_msf)
            .wrapping_add(superframe)
            % helper.superframes_per_beacon_interval();
        let scheduled = now.wrapping_sub(lateness);

        if sd_index == 0 {
            if mac.is_pan_coord {
                self.last_known_beacon_interval_start = scheduled;
            } else if matches!(self.sync, SyncState::Synchronized { parent: Some(_) }) {
                self.check_parent_heard(mac, &mut actions);
            }
        }

        if self.sync != SyncState::Unsynchronized && self.claim == ClaimState::Allocated(sd_index) {
            let offset = u16::try_from(lateness).unwrap_or(u16::MAX);
            actions.push(BeaconAction::SendBeacon(self.enhanced_beacon(scheduled, offset, mac, phy)));
        }
        actions
    }

    fn check_parent_heard(&mut self, mac: &MacPib, actions: &mut Vec<BeaconAction>) {
        if self.parent_heard {
            self.parent_heard = false;
            return;
        }
        if self.lost_beacons.record_miss() {
            my_warn!(
                ctx(mac),
                "More than {} beacons of the parent lost, synchronization lost",
                mac.max_lost_beacons
            );
            self.sync = SyncState::Unsynchronized;
            if self.claim != ClaimState::Unclaimed {
                my_debug!(ctx(mac), "Giving up beacon slot {:?}", self.claim.sd_index());
                self.claim = ClaimState::Unclaimed;
            }
            actions.push(BeaconAction::SyncLoss(SyncLossReason::BeaconLost));
        } else {
            my_debug!(ctx(mac), "Missed parent beacon ({} in a row)", self.lost_beacons.missed());
        }
    }

    fn enhanced_beacon(
        &self,
        scheduled: u32,
        offset: u16,
        mac: &MacPib,
        phy: &PhyPib,
    ) -> Frame {
        let helper = PibHelper::new(mac, phy);
        let mut beacon_bitmap = self.neighbor_or_own_heard_beacons.clone();
        beacon_bitmap.set_sd_index(mac.sd_index);
        let descriptor = DsmePanDescriptor {
            superframe_spec: SuperframeSpecification {
                beacon_order: mac.beacon_order,
                superframe_order: mac.superframe_order,
                final_cap_slot: helper.final_cap_slot(0),
                pan_coordinator: mac.is_pan_coord,
                association_permit: mac.is_coord,
            },
            dsme_superframe_spec: DsmeSuperframeSpecification {
                multi_superframe_order: mac.multi_superframe_order,
                channel_diversity_mode: false,
                cap_reduction: mac.cap_reduction,
            },
            time_sync: TimeSyncSpecification {
                beacon_timestamp: scheduled,
                beacon_offset_timestamp: offset,
            },
            beacon_bitmap,
        };

        let mut header = MacHeader::new(FrameType::Beacon);
        header.frame_version = FrameVersion::Ieee802154;
        header.src_addr = own_address(mac);
        header.src_pan_id = Some(mac.pan_id);
        Frame::new(header, FramePayload::EnhancedBeacon(descriptor))
    }
}

fn ctx(mac: &MacPib) -> LogContext {
    LogContext::new("BEACON", mac.short_address)
}

/// The short address if one is assigned, the extended address otherwise.
fn own_address(mac: &MacPib) -> MacAddress {
    if mac.short_address.0 >= NO_SHORT_ADDRESS {
        MacAddress::Extended(mac.extended_address)
    } else {
        MacAddress::Short(mac.short_address)
    }
}

/// The sender's beacon slot, if it lies within the beacon interval announced
/// by the same descriptor.
fn announced_sd_index(descriptor: &DsmePanDescriptor) -> Option<u16> {
    let spec = &descriptor.superframe_spec;
    if spec.beacon_order > MAX_ORDER || spec.superframe_order > spec.beacon_order {
        return None;
    }
    let sd_index = descriptor.beacon_bitmap.sd_index();
    (sd_index < 1 << (spec.beacon_order - spec.superframe_order)).then_some(sd_index)
}

fn is_own_pan(frame: &Frame, mac: &MacPib) -> bool {
    frame.header.src_pan() == Some(mac.pan_id)
}

fn beacon_request(mac: &MacPib) -> Frame {
    Frame::command(
        MacCommand::BeaconRequest,
        own_address(mac),
        MacAddress::BROADCAST,
        PanId::BROADCAST,
    )
}

fn collision_notification(sd_index: u16, dst: MacAddress, mac: &MacPib) -> Frame {
    Frame::command(
        MacCommand::BeaconCollisionNotification {
            beacon_sd_index: sd_index,
        },
        own_address(mac),
        dst,
        mac.pan_id,
    )
}
