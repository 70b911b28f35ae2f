use std::sync::atomic::{AtomicBool, Ordering};

/// Holds the session's single upload slot until dropped.
#[derive(Debug)]
pub(crate) struct UploadGuard<'a> {
    in_flight: &'a AtomicBool,
}

impl<'a> UploadGuard<'a> {
    /// Claims the slot, or returns `None` if an upload already holds it.
    pub(crate) fn try_acquire(in_flight: &'a AtomicBool) -> Option<Self> {
        in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { in_flight })
    }
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
