//! Scheduler critical sections for POSIX
//!
//! Host threads stand in for the tasks of a preemptive scheduler. Unlike
//! embedded targets, exclusion comes from an OS mutex rather than from
//! masking interrupts.

use std::cell::Cell;

use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;
use swrtc_clock::{SchedulerCritical, SchedulerPort};

thread_local! {
    /// Thread-local nesting counter for critical sections
    static NESTING_LEVEL: Cell<usize> = const { Cell::new(0) };
}

/// [`SchedulerPort`] backed by a raw mutex.
///
/// Critical sections must not nest on one thread, matching the scheduler
/// primitives this stands in for.
pub struct MutexPort {
    raw: RawMutex,
}

impl MutexPort {
    pub const fn new() -> Self {
        Self {
            raw: RawMutex::INIT,
        }
    }

    /// `true` while some thread holds the critical section
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }
}

impl Default for MutexPort {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerPort for MutexPort {
    fn enter_critical(&self) {
        let nesting = NESTING_LEVEL.with(|n| {
            let current = n.get();
            n.set(current + 1);
            current
        });
        assert_eq!(nesting, 0, "Critical sections must not nest in the POSIX port");

        self.raw.lock();
    }

    fn exit_critical(&self) {
        NESTING_LEVEL.with(|n| {
            let current = n.get();
            assert!(current > 0, "Critical section underflow");
            n.set(current - 1);
        });
        // SAFETY: the nesting counter shows this thread entered, and thus
        // holds the lock.
        unsafe { self.raw.unlock() };
    }
}

/// Synchronization strategy for clocks shared between host threads
pub type HostCritical = SchedulerCritical<MutexPort>;

/// `const` constructor for use in `static` clock state
pub const fn host_critical() -> HostCritical {
    SchedulerCritical::new(MutexPort::new())
}
