//! POSIX port of the software RTC.
//!
//! Host threads play the part of the hardware: [`ThreadTimer`] provides
//! periodic timer channels driven by ticker threads, and [`MutexPort`] stands
//! in for a preemptive scheduler's critical section. Useful for simulations
//! and for testing clock code off-target.

pub mod critical;
pub mod timer;

pub use critical::{host_critical, HostCritical, MutexPort};
pub use timer::{PortError, ThreadTimer};

use swrtc_clock::{InterruptFree, SoftRtc, SyncStrategy};

/// Software RTC running on host timer threads
pub type HostRtc<S = InterruptFree> = SoftRtc<ThreadTimer, S>;

/// Leak a clock state so it can be handed to a timer thread.
///
/// Clock state normally lives in a `static`; this is for clocks built at
/// runtime, e.g. with a threshold read from configuration.
pub fn leak_clock<S>(sync: S, ticks_per_second: u32) -> &'static swrtc_clock::ClockState<S>
where
    S: SyncStrategy + Sync + 'static,
{
    Box::leak(Box::new(swrtc_clock::ClockState::new(sync, ticks_per_second)))
}
