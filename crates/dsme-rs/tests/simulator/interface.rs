// crates/dsme-rs/tests/simulator/interface.rs
use dsme_rs::frame::Frame;
use dsme_rs::hal::{DsmeError, Platform, SymbolClock, TimerHandle};
use dsme_rs::types::ChannelNumber;
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

/// How a frame was handed to the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Direct,
    DelayedAck,
    Cap,
}

/// A frame waiting to go on air. Direct frames and acks stay owned by the
/// DSME layer, so only a copy is queued.
#[derive(Debug)]
pub struct Transmission {
    pub frame: Frame,
    pub channel: ChannelNumber,
    pub kind: TxKind,
}

/// Rebuilds a frame from another one, as a receiver would decode it.
pub fn on_air_copy(frame: &Frame) -> Frame {
    Frame {
        header: frame.header.clone(),
        payload: frame.payload.clone(),
        rx_info: Default::default(),
    }
}

/// A simulated radio, message pool and ack timer sharing the network clock.
pub struct SimulatedRadio {
    clock: Rc<Cell<u32>>,
    channel: ChannelNumber,
    tx_queue: VecDeque<Transmission>,
    /// Frames owned by the CAP queue until their completion is reported.
    cap_frames: VecDeque<Frame>,
    ack_timer: Option<(u32, TimerHandle)>,
    pub released: usize,
}

impl SimulatedRadio {
    pub fn new(clock: Rc<Cell<u32>>, channel: ChannelNumber) -> Self {
        Self {
            clock,
            channel,
            tx_queue: VecDeque::new(),
            cap_frames: VecDeque::new(),
            ack_timer: None,
            released: 0,
        }
    }

    pub fn channel(&self) -> ChannelNumber {
        self.channel
    }

    /// Extracts all pending transmissions.
    pub fn take_tx(&mut self) -> Vec<Transmission> {
        self.tx_queue.drain(..).collect()
    }

    pub fn pop_cap_frame(&mut self) -> Option<Frame> {
        self.cap_frames.pop_front()
    }

    /// Returns the handle of the ack timer if it expired at `now`.
    pub fn expired_ack_timer(&mut self, now: u32) -> Option<TimerHandle> {
        match self.ack_timer {
            Some((deadline, handle)) if deadline <= now => {
                self.ack_timer = None;
                Some(handle)
            }
            _ => None,
        }
    }
}

impl SymbolClock for SimulatedRadio {
    fn symbol_counter(&self) -> u32 {
        self.clock.get()
    }
}

impl Platform for SimulatedRadio {
    fn send_direct_but_keep(&mut self, frame: &Frame) -> Result<(), DsmeError> {
        self.tx_queue.push_back(Transmission {
            frame: on_air_copy(frame),
            channel: self.channel,
            kind: TxKind::Direct,
        });
        Ok(())
    }

    fn send_delayed_ack(&mut self, ack: &Frame, _trigger: &Frame) -> Result<(), DsmeError> {
        self.tx_queue.push_back(Transmission {
            frame: on_air_copy(ack),
            channel: self.channel,
            kind: TxKind::DelayedAck,
        });
        Ok(())
    }

    fn get_empty_message(&mut self) -> Option<Frame> {
        Some(Frame::default())
    }

    fn release_message(&mut self, _frame: Frame) {
        self.released += 1;
    }

    fn handle_received_message_from_ack_layer(&mut self, frame: Frame) {
        self.release_message(frame);
    }

    fn setup_ack_timer(&mut self, duration_symbols: u32, handle: TimerHandle) {
        self.ack_timer = Some((self.clock.get() + duration_symbols, handle));
    }

    fn stop_ack_timer(&mut self) {
        self.ack_timer = None;
    }

    fn send_in_cap(&mut self, frame: Frame) -> Result<(), DsmeError> {
        self.tx_queue.push_back(Transmission {
            frame: on_air_copy(&frame),
            channel: self.channel,
            kind: TxKind::Cap,
        });
        self.cap_frames.push_back(frame);
        Ok(())
    }

    fn set_channel(&mut self, channel: ChannelNumber) {
        self.channel = channel;
    }
}
