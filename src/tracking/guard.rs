//! Single-flight guard for publish cycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Proof that the holder is the only cycle in flight.
///
/// Released on drop, including when the owning task is cancelled.
#[derive(Debug)]
pub(crate) struct TickPermit {
    flag: Arc<AtomicBool>,
}

impl TickPermit {
    /// Takes the permit, or returns `None` if another cycle holds it.
    pub(crate) fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for TickPermit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
