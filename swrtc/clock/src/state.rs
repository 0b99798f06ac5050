//! Shared clock state and the tick accumulator.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

use swrtc_core::{CalendarTime, TICKS_PER_SECOND};
use swrtc_hal::TickHandler;

use crate::sync::{InterruptFree, SyncStrategy};

/// Whole-second Unix clock advanced by a periodic tick.
///
/// The sub-second tick counter is written only from the tick handler. The
/// seconds value is shared between the handler and any number of foreground
/// callers; every access to it goes through the [`SyncStrategy`].
///
/// Construction is `const` so the clock can live in a `static` and be handed
/// to the timer binding as a `&'static dyn TickHandler`.
pub struct ClockState<S: SyncStrategy = InterruptFree> {
    ticks: AtomicU32,
    ticks_per_second: u32,
    seconds: UnsafeCell<i64>,
    sync: S,
}

// SAFETY: `seconds` is only read or written inside `sync.critical`, which
// excludes the tick handler and other foreground callers for its duration.
unsafe impl<S: SyncStrategy + Sync> Sync for ClockState<S> {}

impl ClockState<InterruptFree> {
    /// Clock guarded by interrupt masking, counting [`TICKS_PER_SECOND`].
    pub const fn interrupt_free() -> Self {
        Self::new(InterruptFree, TICKS_PER_SECOND)
    }
}

impl<S: SyncStrategy> ClockState<S> {
    /// Zeroed clock rolling over every `ticks_per_second` ticks.
    ///
    /// A threshold of zero is treated as one.
    pub const fn new(sync: S, ticks_per_second: u32) -> Self {
        Self {
            ticks: AtomicU32::new(0),
            ticks_per_second: if ticks_per_second == 0 { 1 } else { ticks_per_second },
            seconds: UnsafeCell::new(0),
            sync,
        }
    }

    /// Tick accumulator, called once per timer period from interrupt context.
    ///
    /// Only the handler writes the tick counter, so a plain load/store pair is
    /// enough and works on cores without atomic read-modify-write.
    pub fn on_tick(&self) {
        let ticks = self.ticks.load(Ordering::Relaxed) + 1;
        if ticks >= self.ticks_per_second {
            self.sync.critical(|| {
                // SAFETY: inside the critical section.
                unsafe {
                    let seconds = self.seconds.get();
                    *seconds = (*seconds).wrapping_add(1);
                }
            });
            self.ticks.store(0, Ordering::Relaxed);
        } else {
            self.ticks.store(ticks, Ordering::Relaxed);
        }
    }

    /// Overwrite the clock. Backward jumps are allowed.
    pub fn set_unix_time(&self, secs: i64) {
        // SAFETY: inside the critical section.
        self.sync.critical(|| unsafe { *self.seconds.get() = secs });
    }

    /// Current Unix time in whole seconds.
    pub fn unix_time(&self) -> i64 {
        // SAFETY: inside the critical section.
        self.sync.critical(|| unsafe { *self.seconds.get() })
    }

    /// Set the clock from calendar fields and return the stored timestamp.
    ///
    /// See [`CalendarTime::to_unix`] for normalization and offsets.
    pub fn set_calendar_time(
        &self,
        fields: &CalendarTime,
        utc_offset_secs: i32,
        dst_offset_secs: i32,
    ) -> i64 {
        let secs = fields.to_unix(utc_offset_secs, dst_offset_secs);
        self.set_unix_time(secs);
        secs
    }

    /// Current time decomposed in UTC.
    pub fn calendar_time(&self) -> CalendarTime {
        CalendarTime::from_unix(self.unix_time())
    }

    /// Ticks accumulated towards the next second.
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Rollover threshold fixed at construction
    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Synchronization strategy guarding the seconds value
    pub fn sync(&self) -> &S {
        &self.sync
    }
}

impl<S: SyncStrategy + Sync> TickHandler for ClockState<S> {
    fn on_tick(&self) {
        ClockState::on_tick(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let clock = ClockState::interrupt_free();
        assert_eq!(clock.unix_time(), 0);
        assert_eq!(clock.ticks(), 0);
        assert_eq!(clock.ticks_per_second(), TICKS_PER_SECOND);
    }

    #[test]
    fn seconds_advance_on_threshold() {
        let clock = ClockState::new(InterruptFree, 4);
        for _ in 0..3 {
            clock.on_tick();
        }
        assert_eq!(clock.unix_time(), 0);
        assert_eq!(clock.ticks(), 3);

        clock.on_tick();
        assert_eq!(clock.unix_time(), 1);
        assert_eq!(clock.ticks(), 0);
    }

    #[test]
    fn tick_sequences_follow_floor_and_remainder() {
        for threshold in [1u32, 2, 7, 100] {
            for n in [0u32, 1, 6, 7, 99, 100, 101, 250, 1000] {
                let clock = ClockState::new(InterruptFree, threshold);
                clock.set_unix_time(1_000);
                for _ in 0..n {
                    clock.on_tick();
                }
                assert_eq!(clock.unix_time(), 1_000 + i64::from(n / threshold));
                assert_eq!(clock.ticks(), n % threshold);
            }
        }
    }

    #[test]
    fn zero_threshold_counts_every_tick() {
        let clock = ClockState::new(InterruptFree, 0);
        assert_eq!(clock.ticks_per_second(), 1);
        clock.on_tick();
        clock.on_tick();
        assert_eq!(clock.unix_time(), 2);
    }

    #[test]
    fn set_then_get_returns_value() {
        let clock = ClockState::interrupt_free();
        for value in [1_700_000_000, 5, -86_400, i64::MAX, i64::MIN, 0] {
            clock.set_unix_time(value);
            assert_eq!(clock.unix_time(), value);
        }
    }

    #[test]
    fn overwrite_keeps_sub_second_phase() {
        let clock = ClockState::new(InterruptFree, 10);
        for _ in 0..7 {
            clock.on_tick();
        }
        clock.set_unix_time(500);
        for _ in 0..3 {
            clock.on_tick();
        }
        assert_eq!(clock.unix_time(), 501);
    }

    #[test]
    fn seconds_wrap_at_max() {
        let clock = ClockState::new(InterruptFree, 1);
        clock.set_unix_time(i64::MAX);
        clock.on_tick();
        assert_eq!(clock.unix_time(), i64::MIN);
    }

    #[test]
    fn calendar_round_trip_through_clock() {
        let clock = ClockState::interrupt_free();
        let stored = clock.set_calendar_time(&CalendarTime::new(2024, 2, 29, 12, 34, 56), 0, 3600);
        assert_eq!(stored, 1_709_210_096);
        assert_eq!(clock.unix_time(), stored);
        assert_eq!(clock.calendar_time().to_string(), "2024-02-29 12:34:56");
    }
}
