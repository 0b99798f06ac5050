//! Synchronization strategies guarding the shared clock value.
//!
//! The same clock runs under a bare-metal superloop and under a preemptive
//! scheduler. The two need different primitives: masking interrupts is
//! enough in the first case, while a scheduler expects its own critical
//! section so it can account for nesting. The strategy is picked once, when
//! the [`ClockState`](crate::ClockState) is constructed.

/// Runs a closure with the timer interrupt (and, if applicable, other
/// foreground tasks) excluded.
pub trait SyncStrategy {
    fn critical<R>(&self, f: impl FnOnce() -> R) -> R;
}

/// Global interrupt masking through the `critical-section` crate.
///
/// On bare metal this disables interrupts for the duration of the closure.
/// Hosts provide the `critical-section/std` implementation, a global mutex.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptFree;

impl SyncStrategy for InterruptFree {
    #[inline]
    fn critical<R>(&self, f: impl FnOnce() -> R) -> R {
        critical_section::with(|_| f())
    }
}

/// Critical-section entry points of a preemptive scheduler
/// (`taskENTER_CRITICAL`/`taskEXIT_CRITICAL` on FreeRTOS).
pub trait SchedulerPort: Sync {
    fn enter_critical(&self);
    fn exit_critical(&self);
}

impl<P: SchedulerPort + ?Sized> SchedulerPort for &P {
    fn enter_critical(&self) {
        (**self).enter_critical();
    }

    fn exit_critical(&self) {
        (**self).exit_critical();
    }
}

/// Strategy for clocks accessed from scheduler-managed tasks.
#[derive(Debug)]
pub struct SchedulerCritical<P> {
    port: P,
}

impl<P: SchedulerPort> SchedulerCritical<P> {
    pub const fn new(port: P) -> Self {
        Self { port }
    }

    pub fn port(&self) -> &P {
        &self.port
    }
}

/// Exits the scheduler critical section even if the closure unwinds.
struct PortGuard<'a, P: SchedulerPort>(&'a P);

impl<P: SchedulerPort> Drop for PortGuard<'_, P> {
    fn drop(&mut self) {
        self.0.exit_critical();
    }
}

impl<P: SchedulerPort> SyncStrategy for SchedulerCritical<P> {
    #[inline]
    fn critical<R>(&self, f: impl FnOnce() -> R) -> R {
        self.port.enter_critical();
        let _guard = PortGuard(&self.port);
        f()
    }
}
