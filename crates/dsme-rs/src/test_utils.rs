//! Test utilities shared by the unit tests of the MAC components.

#![cfg(test)]

use crate::frame::{Frame, MacHeader};
use crate::hal::{DsmeError, Platform, SymbolClock, TimerHandle};
use crate::types::{ChannelNumber, SequenceNumber};
use alloc::vec::Vec;

/// A recording platform. Every call is captured so tests can assert on it.
#[derive(Debug, Default)]
pub(crate) struct MockPlatform {
    pub symbol_counter: u32,
    /// Headers of frames handed to `send_direct_but_keep`.
    pub direct_sent: Vec<MacHeader>,
    /// (ack header, sequence number of the triggering frame).
    pub delayed_acks: Vec<(MacHeader, Option<SequenceNumber>)>,
    pub delivered: Vec<Frame>,
    pub released: Vec<Frame>,
    pub timers_armed: Vec<(u32, TimerHandle)>,
    pub timers_stopped: usize,
    pub cap_queue: Vec<Frame>,
    pub channels: Vec<ChannelNumber>,
    /// Number of empty frames the pool can still hand out.
    pub pool_available: usize,
    pub refuse_direct: bool,
    pub refuse_ack: bool,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            pool_available: 4,
            ..Default::default()
        }
    }
}

impl SymbolClock for MockPlatform {
    fn symbol_counter(&self) -> u32 {
        self.symbol_counter
    }
}

impl Platform for MockPlatform {
    fn send_direct_but_keep(&mut self, frame: &Frame) -> Result<(), DsmeError> {
        if self.refuse_direct {
            return Err(DsmeError::PlatformRefused);
        }
        self.direct_sent.push(frame.header.clone());
        Ok(())
    }

    fn send_delayed_ack(&mut self, ack: &Frame, trigger: &Frame) -> Result<(), DsmeError> {
        if self.refuse_ack {
            return Err(DsmeError::PlatformRefused);
        }
        self.delayed_acks
            .push((ack.header.clone(), trigger.sequence_number()));
        Ok(())
    }

    fn get_empty_message(&mut self) -> Option<Frame> {
        if self.pool_available == 0 {
            return None;
        }
        self.pool_available -= 1;
        Some(Frame::default())
    }

    fn release_message(&mut self, frame: Frame) {
        self.released.push(frame);
    }

    fn handle_received_message_from_ack_layer(&mut self, frame: Frame) {
        self.delivered.push(frame);
    }

    fn setup_ack_timer(&mut self, duration_symbols: u32, handle: TimerHandle) {
        self.timers_armed.push((duration_symbols, handle));
    }

    fn stop_ack_timer(&mut self) {
        self.timers_stopped += 1;
    }

    fn send_in_cap(&mut self, frame: Frame) -> Result<(), DsmeError> {
        self.cap_queue.push(frame);
        Ok(())
    }

    fn set_channel(&mut self, channel: ChannelNumber) {
        self.channels.push(channel);
    }
}
