//! Debug probe toggling a pin on every timer firing.
//!
//! Measuring the pin frequency on a scope (half the tick rate) is how the
//! calibrated frequency passed to `begin` is found.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::StatefulOutputPin;
use swrtc_hal::TickHandler;

/// Tick handler that toggles `pin` and then forwards to `inner`.
pub struct ProbedTick<H: 'static, P> {
    inner: &'static H,
    pin: Mutex<RefCell<P>>,
}

impl<H: TickHandler, P: StatefulOutputPin + Send> ProbedTick<H, P> {
    pub const fn new(inner: &'static H, pin: P) -> Self {
        Self {
            inner,
            pin: Mutex::new(RefCell::new(pin)),
        }
    }

    /// Take the pin back, e.g. to drive it low after stopping the timer.
    pub fn into_pin(self) -> P {
        self.pin.into_inner().into_inner()
    }
}

impl<H: TickHandler, P: StatefulOutputPin + Send> TickHandler for ProbedTick<H, P> {
    fn on_tick(&self) {
        critical_section::with(|cs| {
            // Pin errors are ignored; the probe never affects timekeeping.
            let _ = self.pin.borrow_ref_mut(cs).toggle();
        });
        self.inner.on_tick();
    }
}
