//! Periodic timer abstraction

use crate::error::{HalError, HalResult};

/// Timer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    OneShot,
    Periodic,
}

/// Family of timer peripheral to draw a channel from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerKind {
    /// General purpose timer (GPT on Renesas RA parts)
    #[default]
    GeneralPurpose,
    /// Low-power asynchronous timer (AGT on Renesas RA parts)
    LowPower,
}

/// Timer channel configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerConfig {
    pub mode: TimerMode,
    /// Firing rate in Hz. Fractional rates carry the caller's calibration.
    pub frequency_hz: f32,
    /// PWM duty cycle (0.0 to 1.0); unused by interrupt-only timers.
    pub duty: f32,
}

impl TimerConfig {
    /// Periodic configuration at `frequency_hz` with no PWM output
    pub const fn periodic(frequency_hz: f32) -> Self {
        Self {
            mode: TimerMode::Periodic,
            frequency_hz,
            duty: 0.0,
        }
    }

    /// Period in nanoseconds, or an error if the rate cannot drive a timer
    pub fn period_ns(&self) -> HalResult<u64> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(HalError::InvalidParameter);
        }
        let period = 1.0e9_f64 / f64::from(self.frequency_hz);
        if period < 1.0 || period > u64::MAX as f64 {
            return Err(HalError::InvalidParameter);
        }
        Ok(period as u64)
    }
}

/// Zero-argument periodic callback invoked from timer interrupt context.
///
/// Implementations must finish in bounded time and must not block.
pub trait TickHandler: Sync {
    fn on_tick(&self);
}

/// Capability a board port exposes for driving a periodic interrupt.
///
/// The sequence used by the clock is `acquire`, `configure`,
/// `enable_period_interrupt`, `open`, `start`. `stop` and `release` undo it.
pub trait TimerBinding {
    /// Handle to an acquired timer channel
    type Channel: Copy;

    /// Find a free channel of `kind`. With `allow_reserved`, channels held
    /// back for other uses (PWM, tone) may be handed out once no unreserved
    /// channel of that kind is left.
    fn acquire(&mut self, kind: TimerKind, allow_reserved: bool) -> Option<Self::Channel>;

    /// Configure the channel and install the handler run on every period
    fn configure(
        &mut self,
        channel: Self::Channel,
        config: TimerConfig,
        handler: &'static dyn TickHandler,
    ) -> HalResult<()>;

    /// Enable the overflow/period interrupt
    fn enable_period_interrupt(&mut self, channel: Self::Channel) -> HalResult<()>;

    /// Power up and open the channel
    fn open(&mut self, channel: Self::Channel) -> HalResult<()>;

    /// Start counting
    fn start(&mut self, channel: Self::Channel) -> HalResult<()>;

    /// Stop counting; the handler is no longer invoked once this returns
    fn stop(&mut self, channel: Self::Channel) -> HalResult<()>;

    /// Return the channel to the pool
    fn release(&mut self, channel: Self::Channel);
}
