use std::sync::Arc;

/// Something that can be woken up to run an out-of-cycle scan.
///
/// Implementations must never block: a burst of calls collapses into at most
/// one pending wake-up.
pub trait ArchiverNotifier: Send + Sync {
    fn notify(&self);
}

impl<T: ArchiverNotifier + ?Sized> ArchiverNotifier for Arc<T> {
    fn notify(&self) {
        (**self).notify();
    }
}
