use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide single in-flight flag shared by the take/return submission
/// and the log clear. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct SubmitLock {
    in_flight: Arc<AtomicBool>,
}

/// Held for the duration of one operation; dropping it releases the lock on
/// every exit path.
#[derive(Debug)]
pub struct SubmitGuard {
    in_flight: Arc<AtomicBool>,
}

impl SubmitLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the lock, or `None` when another operation already holds it.
    pub fn try_acquire(&self) -> Option<SubmitGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    /// Drives the disabled state of the submit control.
    pub fn is_held(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let lock = SubmitLock::new();
        let guard = lock.try_acquire().expect("first acquire");
        assert!(lock.is_held());
        assert!(lock.try_acquire().is_none());
        assert!(lock.clone().try_acquire().is_none());

        drop(guard);
        assert!(!lock.is_held());
        assert!(lock.try_acquire().is_some());
    }
}
