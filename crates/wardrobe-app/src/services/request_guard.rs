//! Per-service request guards.
//!
//! [`BusyFlag`] rejects a second mutation while one is outstanding.
//! [`ViewScope`] tells a finished request whether the view that issued it is
//! still attached; if not, the response is dropped without touching state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use wardrobe_core::{Error, Result};

/// Single-flight flag for mutating calls.
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: AtomicBool,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag for `operation`, or fail with [`Error::Busy`].
    ///
    /// The flag is released when the returned guard is dropped, on success
    /// and failure alike.
    pub fn try_acquire(&self, operation: &str) -> Result<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy(format!(
                "{} rejected while another request is in flight",
                operation
            )));
        }
        Ok(BusyGuard { flag: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases a [`BusyFlag`] on drop.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Generation counter for the view a service is serving.
#[derive(Debug, Default)]
pub struct ViewScope {
    generation: AtomicU64,
}

/// The generation a request was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTicket(u64);

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current generation before issuing a request.
    pub fn ticket(&self) -> ViewTicket {
        ViewTicket(self.generation.load(Ordering::Acquire))
    }

    /// Whether a response for `ticket` may still be applied.
    pub fn is_current(&self, ticket: ViewTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }

    /// The view went away; every outstanding ticket becomes stale.
    pub fn detach(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_flag_rejects_second_acquire() {
        let flag = BusyFlag::new();
        let guard = flag.try_acquire("save").unwrap();
        assert!(flag.is_busy());

        let err = flag.try_acquire("save").unwrap_err();
        assert!(matches!(err, Error::Busy(_)));

        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_acquire("save").is_ok());
    }

    #[test]
    fn test_busy_flag_released_on_early_return() {
        fn failing(flag: &BusyFlag) -> Result<()> {
            let _guard = flag.try_acquire("delete")?;
            Err(Error::Remote("boom".to_string()))
        }

        let flag = BusyFlag::new();
        assert!(failing(&flag).is_err());
        assert!(!flag.is_busy());
    }

    #[test]
    fn test_view_scope_detach_invalidates_tickets() {
        let scope = ViewScope::new();
        let before = scope.ticket();
        assert!(scope.is_current(before));

        scope.detach();
        assert!(!scope.is_current(before));

        let after = scope.ticket();
        assert!(scope.is_current(after));
        assert_ne!(before, after);
    }
}
