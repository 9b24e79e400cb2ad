#![cfg_attr(not(feature = "std"), no_std)]

// 'alloc' is used for dynamic allocation (e.g., Vec<u8> payloads, bitmaps)
extern crate alloc;

// --- Foundation Modules ---
pub mod types;
pub mod hal;
pub(crate) mod log;
pub mod pib;

// --- Frames and Slot Structure ---
pub mod frame;
pub mod gts;
pub mod bitmap;

// --- MAC Components ---
pub mod ack;
pub mod beacon;

// --- Layer Abstraction ---
pub mod layer;

#[cfg(test)]
mod test_utils;

// --- Top-level Exports ---
pub use types::{ExtendedAddress, MacAddress, PanId, SequenceNumber, ShortAddress};
pub use hal::{DsmeError, Platform, SymbolClock, TimerHandle};
pub use pib::{MacPib, PhyPib, PibHelper};
pub use frame::{Frame, FramePayload, MacHeader};
pub use gts::Gts;
pub use bitmap::BeaconBitmap;
pub use ack::{AckLayer, AckLayerResponse, ReceiveOutcome, SendCompletion};
pub use beacon::{BeaconAction, BeaconManager, ScanConfirm, ScanStatus, ScanType};
pub use layer::{DsmeIndication, DsmeLayer, SendOrigin};
