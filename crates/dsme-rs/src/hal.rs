use crate::frame::Frame;
use crate::types::ChannelNumber;
use core::fmt;

/// Defines a portable, descriptive Error type for the DSME stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DsmeError {
    /// A request parameter is outside its valid range (e.g., empty channel list).
    InvalidParameter(&'static str),
    /// The PIB holds a combination of attributes the stack cannot operate with.
    InvalidConfiguration(&'static str),
    /// The platform's message pool could not provide an empty frame.
    MessagePoolExhausted,
    /// The platform refused to hand a frame to the radio.
    PlatformRefused,
    /// The requested operation is not possible in the current synchronization state.
    NotReady,
}

impl fmt::Display for DsmeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(s) => write!(f, "Invalid parameter: {}", s),
            Self::InvalidConfiguration(s) => write!(f, "Invalid PIB configuration: {}", s),
            Self::MessagePoolExhausted => write!(f, "No empty message available in the pool"),
            Self::PlatformRefused => write!(f, "The platform refused to transmit the frame"),
            Self::NotReady => write!(f, "Device is not ready or not synchronized"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DsmeError {}

/// Identifies one arming of the acknowledgment timer.
///
/// The event dispatcher hands the handle back when the timer fires, so a
/// timer that was logically cancelled can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u32);

/// Access to the free-running radio symbol counter.
pub trait SymbolClock {
    /// Returns the current value of the symbol counter (wrapping).
    fn symbol_counter(&self) -> u32;
}

/// Hardware Abstraction Layer (HAL) for the radio, message pool and timers.
///
/// This trait abstracts everything the DSME core needs from its host, enabling
/// the protocol logic to remain platform-agnostic (no_std).
pub trait Platform: SymbolClock {
    /// Transmits `frame` immediately without taking ownership of it.
    /// Completion is reported later through `DsmeLayer::on_send_done`.
    fn send_direct_but_keep(&mut self, frame: &Frame) -> Result<(), DsmeError>;

    /// Transmits the acknowledgment `ack` for `trigger`.
    /// The platform is responsible for waiting `aTurnaroundTime` after the reception.
    fn send_delayed_ack(&mut self, ack: &Frame, trigger: &Frame) -> Result<(), DsmeError>;

    /// Returns an empty frame from the message pool, or `None` if it is exhausted.
    fn get_empty_message(&mut self) -> Option<Frame>;

    /// Returns a frame to the message pool.
    fn release_message(&mut self, frame: Frame);

    /// Hands a received frame to the upper layers. Ownership moves to the callee.
    fn handle_received_message_from_ack_layer(&mut self, frame: Frame);

    /// Arms the single-shot acknowledgment timer. On expiry the dispatcher must
    /// pass `handle` back to the acknowledgment layer.
    fn setup_ack_timer(&mut self, duration_symbols: u32, handle: TimerHandle);

    /// Cancels the acknowledgment timer.
    fn stop_ack_timer(&mut self);

    /// Queues a frame for transmission in the contention access period (CSMA/CA).
    /// Ownership always moves to the platform; a refused frame is released by it.
    /// Completion is reported later through `DsmeLayer::on_cap_sent`.
    fn send_in_cap(&mut self, frame: Frame) -> Result<(), DsmeError>;

    /// Tunes the radio to `channel`.
    fn set_channel(&mut self, channel: ChannelNumber);
}
