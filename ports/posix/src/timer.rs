//! Periodic timer channels for POSIX
//!
//! Each started channel runs a ticker thread that invokes the installed
//! handler. The thread sleeps until an absolute deadline rather than for a
//! relative duration, so scheduling jitter does not accumulate into drift.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error};
use swrtc_hal::{HalError, HalResult, TickHandler, TimerBinding, TimerConfig, TimerKind, TimerMode};
use thiserror::Error;

/// Failures inside the host port, reported as [`HalError`] at the trait boundary
#[derive(Error, Debug)]
pub enum PortError {
    #[error("unknown timer channel {0}")]
    UnknownChannel(usize),
    #[error("timer channel {0} has not been acquired")]
    NotAcquired(usize),
    #[error("timer channel {channel} is not {expected}")]
    WrongState {
        channel: usize,
        expected: &'static str,
    },
    #[error("timer mode {0:?} is not supported")]
    UnsupportedMode(TimerMode),
    #[error("invalid timer rate: {0}")]
    InvalidRate(HalError),
    #[error("failed to spawn ticker thread: {0}")]
    Spawn(#[from] io::Error),
}

impl From<PortError> for HalError {
    fn from(err: PortError) -> Self {
        error!("posix timer: {err}");
        match err {
            PortError::UnknownChannel(_) | PortError::InvalidRate(_) => HalError::InvalidParameter,
            PortError::NotAcquired(_) | PortError::WrongState { .. } => HalError::Busy,
            PortError::UnsupportedMode(_) => HalError::NotSupported,
            PortError::Spawn(io) => HalError::VendorError(io.raw_os_error().unwrap_or(-1)),
        }
    }
}

struct Ticker {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    kind: TimerKind,
    reserved: bool,
    acquired: bool,
    period: Option<Duration>,
    handler: Option<&'static dyn TickHandler>,
    irq_enabled: bool,
    opened: bool,
    ticker: Option<Ticker>,
}

impl Slot {
    fn halt(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.running.store(false, Ordering::Release);
            if ticker.handle.join().is_err() {
                error!("posix timer: ticker thread panicked");
            }
        }
    }
}

/// Pool of thread-backed timer channels.
pub struct ThreadTimer {
    slots: Vec<Slot>,
}

impl Default for ThreadTimer {
    /// Two free general purpose channels, one reserved, one low-power.
    fn default() -> Self {
        Self::new()
            .with_channel(TimerKind::GeneralPurpose, false)
            .with_channel(TimerKind::GeneralPurpose, false)
            .with_channel(TimerKind::GeneralPurpose, true)
            .with_channel(TimerKind::LowPower, false)
    }
}

impl ThreadTimer {
    /// Empty pool; add channels with [`ThreadTimer::with_channel`].
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Add a channel. Reserved channels are only handed out on request.
    pub fn with_channel(mut self, kind: TimerKind, reserved: bool) -> Self {
        self.slots.push(Slot {
            kind,
            reserved,
            ..Slot::default()
        });
        self
    }

    /// Number of channels currently ticking
    pub fn running_channels(&self) -> usize {
        self.slots.iter().filter(|slot| slot.ticker.is_some()).count()
    }

    fn slot(&mut self, channel: usize) -> Result<&mut Slot, PortError> {
        let slot = self
            .slots
            .get_mut(channel)
            .ok_or(PortError::UnknownChannel(channel))?;
        if slot.acquired {
            Ok(slot)
        } else {
            Err(PortError::NotAcquired(channel))
        }
    }

    fn try_start(&mut self, channel: usize) -> Result<(), PortError> {
        let slot = self.slot(channel)?;
        if slot.ticker.is_some() {
            return Err(PortError::WrongState {
                channel,
                expected: "stopped",
            });
        }
        let (Some(period), Some(handler), true) = (slot.period, slot.handler, slot.opened) else {
            return Err(PortError::WrongState {
                channel,
                expected: "configured and open",
            });
        };

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let irq_enabled = slot.irq_enabled;
        let handle = thread::Builder::new()
            .name(format!("swrtc-timer-{channel}"))
            .spawn(move || ticker_thread(period, flag, irq_enabled.then_some(handler)))?;

        slot.ticker = Some(Ticker { running, handle });
        debug!("posix timer {channel} started, period {period:?}");
        Ok(())
    }
}

impl TimerBinding for ThreadTimer {
    type Channel = usize;

    fn acquire(&mut self, kind: TimerKind, allow_reserved: bool) -> Option<usize> {
        let free = |slot: &Slot, reserved: bool| {
            !slot.acquired && slot.kind == kind && slot.reserved == reserved
        };
        let index = self
            .slots
            .iter()
            .position(|slot| free(slot, false))
            .or_else(|| {
                self.slots
                    .iter()
                    .position(|slot| free(slot, true))
                    .filter(|_| allow_reserved)
            })?;
        self.slots[index].acquired = true;
        Some(index)
    }

    fn configure(
        &mut self,
        channel: usize,
        config: TimerConfig,
        handler: &'static dyn TickHandler,
    ) -> HalResult<()> {
        if config.mode != TimerMode::Periodic {
            return Err(PortError::UnsupportedMode(config.mode).into());
        }
        let period = config.period_ns().map_err(PortError::InvalidRate)?;
        let slot = self.slot(channel)?;
        slot.period = Some(Duration::from_nanos(period));
        slot.handler = Some(handler);
        Ok(())
    }

    fn enable_period_interrupt(&mut self, channel: usize) -> HalResult<()> {
        let slot = self.slot(channel)?;
        if slot.handler.is_none() {
            return Err(PortError::WrongState {
                channel,
                expected: "configured",
            }
            .into());
        }
        slot.irq_enabled = true;
        Ok(())
    }

    fn open(&mut self, channel: usize) -> HalResult<()> {
        let slot = self.slot(channel)?;
        if slot.period.is_none() {
            return Err(PortError::WrongState {
                channel,
                expected: "configured",
            }
            .into());
        }
        slot.opened = true;
        Ok(())
    }

    fn start(&mut self, channel: usize) -> HalResult<()> {
        Ok(self.try_start(channel)?)
    }

    fn stop(&mut self, channel: usize) -> HalResult<()> {
        let slot = self.slot(channel)?;
        slot.halt();
        debug!("posix timer {channel} stopped");
        Ok(())
    }

    fn release(&mut self, channel: usize) {
        if let Some(slot) = self.slots.get_mut(channel) {
            slot.halt();
            *slot = Slot {
                kind: slot.kind,
                reserved: slot.reserved,
                ..Slot::default()
            };
        }
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        for slot in &mut self.slots {
            slot.halt();
        }
    }
}

/// Ticker thread implementation
///
/// Without an enabled period interrupt the thread keeps time but calls
/// nothing, like a counter whose overflow interrupt is masked.
fn ticker_thread(period: Duration, running: Arc<AtomicBool>, handler: Option<&'static dyn TickHandler>) {
    let mut next_tick = Instant::now();

    while running.load(Ordering::Acquire) {
        // Advance to next tick (absolute time)
        next_tick += period;

        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
        }

        if !running.load(Ordering::Acquire) {
            break;
        }
        if let Some(handler) = handler {
            handler.on_tick();
        }
    }
}
