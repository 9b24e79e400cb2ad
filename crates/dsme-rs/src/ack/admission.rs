use core::sync::atomic::{AtomicBool, Ordering};

/// Single-flag admission control for the acknowledgment layer.
///
/// Acquisition is a compare-and-swap, so two contexts racing for admission
/// (e.g., a reception interrupt and an application send) can never both win.
#[derive(Debug, Default)]
pub struct AdmissionGate {
    busy: AtomicBool,
}

impl AdmissionGate {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Tries to start an exchange. Returns `false` if one is already in progress.
    pub fn try_acquire(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Ends the current exchange.
    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
