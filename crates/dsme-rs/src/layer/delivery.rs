use crate::frame::Frame;
use crate::hal::{DsmeError, Platform, SymbolClock, TimerHandle};
use crate::types::ChannelNumber;

/// Platform wrapper that captures the frame the acknowledgment layer passes
/// upwards, so the DSME layer can route it. Every other call is forwarded.
pub(crate) struct Delivery<'a, P: Platform> {
    inner: &'a mut P,
    delivered: Option<Frame>,
}

impl<'a, P: Platform> Delivery<'a, P> {
    pub(crate) fn new(inner: &'a mut P) -> Self {
        Self {
            inner,
            delivered: None,
        }
    }

    pub(crate) fn take(&mut self) -> Option<Frame> {
        self.delivered.take()
    }
}

impl<P: Platform> SymbolClock for Delivery<'_, P> {
    fn symbol_counter(&self) -> u32 {
        self.inner.symbol_counter()
    }
}

impl<P: Platform> Platform for Delivery<'_, P> {
    fn send_direct_but_keep(&mut self, frame: &Frame) -> Result<(), DsmeError> {
        self.inner.send_direct_but_keep(frame)
    }

    fn send_delayed_ack(&mut self, ack: &Frame, trigger: &Frame) -> Result<(), DsmeError> {
        self.inner.send_delayed_ack(ack, trigger)
    }

    fn get_empty_message(&mut self) -> Option<Frame> {
        self.inner.get_empty_message()
    }

    fn release_message(&mut self, frame: Frame) {
        self.inner.release_message(frame)
    }

    fn handle_received_message_from_ack_layer(&mut self, frame: Frame) {
        // At most one frame per reception.
        debug_assert!(self.delivered.is_none());
        if let Some(previous) = self.delivered.replace(frame) {
            self.inner.release_message(previous);
        }
    }

    fn setup_ack_timer(&mut self, duration_symbols: u32, handle: TimerHandle) {
        self.inner.setup_ack_timer(duration_symbols, handle)
    }

    fn stop_ack_timer(&mut self) {
        self.inner.stop_ack_timer()
    }

    fn send_in_cap(&mut self, frame: Frame) -> Result<(), DsmeError> {
        self.inner.send_in_cap(frame)
    }

    fn set_channel(&mut self, channel: ChannelNumber) {
        self.inner.set_channel(channel)
    }
}
