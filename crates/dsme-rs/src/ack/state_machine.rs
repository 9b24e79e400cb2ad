use super::admission::AdmissionGate;
use super::events::{
    AckEvent, AckLayerResponse, ReceiveOutcome, RejectReason, Rejected, SendCompletion,
};
use crate::frame::{Frame, FrameType, MacHeader};
use crate::hal::{DsmeError, Platform, TimerHandle};
use crate::pib::MacPib;
use crate::types::{MacAddress, SequenceNumber};
use core::mem;
use log::{debug, error, trace, warn};

/// Observable state of the acknowledgment layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckState {
    #[default]
    Idle,
    /// A frame is being transmitted.
    Tx,
    /// The frame was sent and the acknowledgment timer is running.
    WaitForAck,
    /// An acknowledgment for a received frame is being transmitted.
    TxAck,
}

#[derive(Debug)]
struct Pending<T> {
    frame: Frame,
    origin: T,
}

/// Internal state. Each state owns exactly the frames it is responsible for.
#[derive(Debug)]
enum Exchange<T> {
    Idle,
    Tx(Pending<T>),
    WaitForAck { pending: Pending<T>, timer: TimerHandle },
    TxAck { ack: Frame },
}

impl<T> Exchange<T> {
    fn kind(&self) -> AckState {
        match self {
            Exchange::Idle => AckState::Idle,
            Exchange::Tx(_) => AckState::Tx,
            Exchange::WaitForAck { .. } => AckState::WaitForAck,
            Exchange::TxAck { .. } => AckState::TxAck,
        }
    }
}

/// What a single dispatch produced for the caller.
enum Effect<T> {
    None,
    Completed(SendCompletion<T>),
    Refused(Rejected<T>),
    Received(ReceiveOutcome<T>),
}

/// Per-frame acknowledgment state machine (IEEE 802.15.4-2015, 6.7.4).
///
/// At most one exchange is in flight: either an outbound frame awaiting its
/// transmission and acknowledgment, or an acknowledgment being sent for a
/// received frame. `T` tags each outbound frame with whoever requested it so
/// the completion can be routed back.
#[derive(Debug)]
pub struct AckLayer<T> {
    exchange: Exchange<T>,
    gate: AdmissionGate,
    next_sequence_number: SequenceNumber,
    timer_generation: u32,
    ack_wait_duration: u32,
}

impl<T> AckLayer<T> {
    /// Creates an idle layer. `ack_wait_duration` is macAckWaitDuration in symbols.
    pub fn new(ack_wait_duration: u32) -> Self {
        Self {
            exchange: Exchange::Idle,
            gate: AdmissionGate::new(),
            next_sequence_number: 0,
            timer_generation: 0,
            ack_wait_duration,
        }
    }

    pub fn state(&self) -> AckState {
        self.exchange.kind()
    }

    /// Returns `true` while an exchange is outstanding.
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn next_sequence_number(&self) -> SequenceNumber {
        self.next_sequence_number
    }

    pub fn set_next_sequence_number(&mut self, seq_num: SequenceNumber) {
        self.next_sequence_number = seq_num;
    }

    pub fn ack_wait_duration(&self) -> u32 {
        self.ack_wait_duration
    }

    /// Starts an outbound exchange. The layer keeps the frame until the
    /// exchange completes and hands it back in the `SendCompletion`.
    ///
    /// A frame that cannot be sent is returned inside the `Rejected` value.
    pub fn send_but_keep<P: Platform>(
        &mut self,
        frame: Frame,
        origin: T,
        env: &mut P,
    ) -> Result<(), Rejected<T>> {
        if !self.gate.try_acquire() {
            debug!("[ACK] Send request rejected: exchange in progress ({:?})", self.state());
            return Err(Rejected {
                reason: RejectReason::Busy,
                frame,
                origin,
            });
        }
        match self.dispatch(AckEvent::SendRequest { frame, origin }, env) {
            Effect::Refused(rejected) => Err(rejected),
            _ => Ok(()),
        }
    }

    /// Entry point for every frame received from the radio.
    ///
    /// Acknowledgments are consumed here. Other frames addressed to this
    /// device are passed upwards through
    /// `Platform::handle_received_message_from_ack_layer`, everything else is
    /// released to the pool.
    pub fn receive<P: Platform>(
        &mut self,
        frame: Frame,
        mac: &MacPib,
        env: &mut P,
    ) -> ReceiveOutcome<T> {
        if frame.frame_type() == FrameType::Acknowledgement {
            let seq_num = frame.sequence_number();
            env.release_message(frame);
            let Some(seq_num) = seq_num else {
                trace!("[ACK] Dropping acknowledgment without sequence number");
                return ReceiveOutcome::AckIgnored;
            };
            debug!("[ACK] Acknowledgment received with seq num {}", seq_num);
            return match self.dispatch(AckEvent::AckReceived { seq_num }, env) {
                Effect::Completed(completion) => ReceiveOutcome::AckMatched(completion),
                _ => ReceiveOutcome::AckIgnored,
            };
        }

        if !is_for_this_device(&frame.header, mac) {
            trace!("[ACK] Dropping frame for {}", frame.header.dst_addr);
            env.release_message(frame);
            return ReceiveOutcome::NotForThisDevice;
        }

        if !self.gate.try_acquire() {
            trace!("[ACK] Dropping frame from {}: busy", frame.header.src_addr);
            env.release_message(frame);
            return ReceiveOutcome::Busy;
        }

        match self.dispatch(AckEvent::ReceiveRequest { frame }, env) {
            Effect::Received(outcome) => outcome,
            _ => ReceiveOutcome::Busy,
        }
    }

    /// Reports the end of a transmission started by this layer.
    pub fn send_done<P: Platform>(
        &mut self,
        success: bool,
        env: &mut P,
    ) -> Option<SendCompletion<T>> {
        match self.dispatch(AckEvent::SendDone { success }, env) {
            Effect::Completed(completion) => Some(completion),
            _ => None,
        }
    }

    /// Reports an expired acknowledgment timer. Handles of timers that are no
    /// longer armed are ignored.
    pub fn dispatch_timer<P: Platform>(
        &mut self,
        handle: TimerHandle,
        env: &mut P,
    ) -> Option<SendCompletion<T>> {
        match self.dispatch(AckEvent::TimerFired { handle }, env) {
            Effect::Completed(completion) => Some(completion),
            _ => None,
        }
    }

    fn dispatch<P: Platform>(&mut self, event: AckEvent<T>, env: &mut P) -> Effect<T> {
        let previous = self.state();
        let current = mem::replace(&mut self.exchange, Exchange::Idle);
        let (next, effect) = match current {
            Exchange::Idle => self.state_idle(event, env),
            Exchange::Tx(pending) => self.state_tx(pending, event, env),
            Exchange::WaitForAck { pending, timer } => {
                Self::state_wait_for_ack(pending, timer, event, env)
            }
            Exchange::TxAck { ack } => Self::state_tx_ack(ack, event, env),
        };
        self.exchange = next;

        let state = self.state();
        if state == AckState::Idle {
            self.gate.release();
        }
        if state != previous {
            trace!("[ACK] {:?} -> {:?}", previous, state);
        }
        effect
    }

    fn state_idle<P: Platform>(
        &mut self,
        event: AckEvent<T>,
        env: &mut P,
    ) -> (Exchange<T>, Effect<T>) {
        match event {
            AckEvent::SendRequest { mut frame, origin } => {
                if frame.header.has_sequence_number() {
                    frame.header.sequence_number = Some(self.next_sequence_number);
                    self.next_sequence_number = self.next_sequence_number.wrapping_add(1);
                }
                match env.send_direct_but_keep(&frame) {
                    Ok(()) => (Exchange::Tx(Pending { frame, origin }), Effect::None),
                    Err(e) => {
                        warn!("[ACK] Platform refused frame to {}: {}", frame.header.dst_addr, e);
                        let rejected = Rejected {
                            reason: RejectReason::PlatformRefused,
                            frame,
                            origin,
                        };
                        (Exchange::Idle, Effect::Refused(rejected))
                    }
                }
            }
            AckEvent::ReceiveRequest { frame } => {
                // 802.15.4 asks for an ack even on broadcast, but that breaks GTS replies
                // which set the AR bit. Broadcasts are never acknowledged.
                if !frame.header.expects_ack() {
                    env.handle_received_message_from_ack_layer(frame);
                    return (Exchange::Idle, Effect::Received(ReceiveOutcome::Delivered));
                }

                let Some(mut ack) = env.get_empty_message() else {
                    error!(
                        "[ACK] No empty message for the acknowledgment to {}",
                        frame.header.src_addr
                    );
                    env.handle_received_message_from_ack_layer(frame);
                    let outcome = ReceiveOutcome::AckNotSent(DsmeError::MessagePoolExhausted);
                    return (Exchange::Idle, Effect::Received(outcome));
                };

                let seq_num = frame.sequence_number().unwrap_or_default();
                ack.make_ack(seq_num, frame.header.src_addr);
                debug!("[ACK] Sending acknowledgment for seq num {}", seq_num);

                match env.send_delayed_ack(&ack, &frame) {
                    Ok(()) => {
                        // The upper layer handles the frame while the ack is on air.
                        env.handle_received_message_from_ack_layer(frame);
                        (
                            Exchange::TxAck { ack },
                            Effect::Received(ReceiveOutcome::AckScheduled),
                        )
                    }
                    Err(e) => {
                        warn!("[ACK] Platform refused acknowledgment: {}", e);
                        env.release_message(ack);
                        env.handle_received_message_from_ack_layer(frame);
                        (Exchange::Idle, Effect::Received(ReceiveOutcome::AckNotSent(e)))
                    }
                }
            }
            other => Self::catch_all(Exchange::Idle, other, env),
        }
    }

    fn state_tx<P: Platform>(
        &mut self,
        pending: Pending<T>,
        event: AckEvent<T>,
        env: &mut P,
    ) -> (Exchange<T>, Effect<T>) {
        match event {
            AckEvent::SendDone { success: false } => {
                debug!("[ACK] Transmission to {} failed", pending.frame.header.dst_addr);
                (Exchange::Idle, complete(AckLayerResponse::SendFailed, pending))
            }
            AckEvent::SendDone { success: true } => {
                if !pending.frame.header.expects_ack() {
                    return (Exchange::Idle, complete(AckLayerResponse::NoAckRequested, pending));
                }
                self.timer_generation = self.timer_generation.wrapping_add(1);
                let timer = TimerHandle(self.timer_generation);
                env.setup_ack_timer(self.ack_wait_duration, timer);
                (Exchange::WaitForAck { pending, timer }, Effect::None)
            }
            other => Self::catch_all(Exchange::Tx(pending), other, env),
        }
    }

    fn state_wait_for_ack<P: Platform>(
        pending: Pending<T>,
        timer: TimerHandle,
        event: AckEvent<T>,
        env: &mut P,
    ) -> (Exchange<T>, Effect<T>) {
        match event {
            AckEvent::AckReceived { seq_num } => {
                if pending.frame.sequence_number() == Some(seq_num) {
                    env.stop_ack_timer();
                    (Exchange::Idle, complete(AckLayerResponse::AckSuccessful, pending))
                } else {
                    debug!(
                        "[ACK] Ignoring acknowledgment {} while waiting for {:?}",
                        seq_num,
                        pending.frame.sequence_number()
                    );
                    (Exchange::WaitForAck { pending, timer }, Effect::None)
                }
            }
            AckEvent::TimerFired { handle } if handle == timer => {
                debug!(
                    "[ACK] Ack timer fired for seq num {:?} dst {}",
                    pending.frame.sequence_number(),
                    pending.frame.header.dst_addr
                );
                (Exchange::Idle, complete(AckLayerResponse::AckFailed, pending))
            }
            other => Self::catch_all(Exchange::WaitForAck { pending, timer }, other, env),
        }
    }

    fn state_tx_ack<P: Platform>(
        ack: Frame,
        event: AckEvent<T>,
        env: &mut P,
    ) -> (Exchange<T>, Effect<T>) {
        match event {
            AckEvent::SendDone { success } => {
                if !success {
                    debug!("[ACK] Acknowledgment transmission failed");
                }
                env.release_message(ack);
                (Exchange::Idle, Effect::None)
            }
            other => Self::catch_all(Exchange::TxAck { ack }, other, env),
        }
    }

    /// Handles every signal the current state does not expect.
    fn catch_all<P: Platform>(
        state: Exchange<T>,
        event: AckEvent<T>,
        env: &mut P,
    ) -> (Exchange<T>, Effect<T>) {
        match event {
            AckEvent::AckReceived { .. } => (state, Effect::None),
            AckEvent::TimerFired { handle } => {
                trace!("[ACK] Ignoring stale ack timer {:?}", handle);
                (state, Effect::None)
            }
            AckEvent::SendRequest { frame, origin } => {
                error!("[ACK] Send request in state {:?}", state.kind());
                debug_assert!(false, "send request while the ack layer is busy");
                let rejected = Rejected {
                    reason: RejectReason::Busy,
                    frame,
                    origin,
                };
                (state, Effect::Refused(rejected))
            }
            AckEvent::ReceiveRequest { frame } => {
                error!("[ACK] Receive request in state {:?}", state.kind());
                debug_assert!(false, "receive request while the ack layer is busy");
                env.release_message(frame);
                (state, Effect::Received(ReceiveOutcome::Busy))
            }
            AckEvent::SendDone { success } => {
                error!(
                    "[ACK] Unexpected send done (success: {}) in state {:?}",
                    success,
                    state.kind()
                );
                debug_assert!(false, "send done without a transmission");
                (state, Effect::None)
            }
        }
    }
}

fn complete<T>(response: AckLayerResponse, pending: Pending<T>) -> Effect<T> {
    Effect::Completed(SendCompletion {
        response,
        frame: pending.frame,
        origin: pending.origin,
    })
}

/// Destination address filter. Frames without a destination address are
/// accepted (beacons, frames for the PAN coordinator).
fn is_for_this_device(header: &MacHeader, mac: &MacPib) -> bool {
    match header.dst_addr {
        MacAddress::None => true,
        MacAddress::Short(addr) => addr.is_broadcast() || addr == mac.short_address,
        MacAddress::Extended(addr) => addr == mac.extended_address,
    }
}
