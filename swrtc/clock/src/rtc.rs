//! Clock facade binding a [`ClockState`] to a hardware timer.

use log::{debug, info, warn};

use swrtc_core::{CalendarTime, RtcConfig, RtcError, RtcResult};
use swrtc_hal::{TickHandler, TimerBinding, TimerConfig};

use crate::state::ClockState;
use crate::sync::{InterruptFree, SyncStrategy};

/// Software RTC: owns the timer binding, shares the clock state with it.
///
/// ```ignore
/// static CLOCK: ClockState = ClockState::interrupt_free();
///
/// let mut rtc = SoftRtc::new(&CLOCK, board_timers, RtcConfig::default());
/// rtc.begin(100.076)?;
/// rtc.set_unix_time(1_700_000_000);
/// ```
pub struct SoftRtc<B: TimerBinding, S: SyncStrategy + Sync + 'static = InterruptFree> {
    clock: &'static ClockState<S>,
    handler: &'static dyn TickHandler,
    binding: B,
    config: RtcConfig,
    channel: Option<B::Channel>,
}

impl<B: TimerBinding, S: SyncStrategy + Sync + 'static> SoftRtc<B, S> {
    /// Create a stopped clock.
    ///
    /// `config.ticks_per_second` is informational here; the rollover
    /// threshold is the one the `clock` was constructed with.
    pub fn new(clock: &'static ClockState<S>, binding: B, config: RtcConfig) -> Self {
        Self::with_handler(clock, clock, binding, config)
    }

    /// Create a stopped clock whose timer runs `handler` instead of the
    /// clock's own tick accumulator. `handler` must forward to `clock`, as
    /// `ProbedTick` does.
    pub fn with_handler(
        clock: &'static ClockState<S>,
        handler: &'static dyn TickHandler,
        binding: B,
        config: RtcConfig,
    ) -> Self {
        if config.ticks_per_second != clock.ticks_per_second() {
            warn!(
                "config expects {} ticks/s but clock rolls over at {}",
                config.ticks_per_second,
                clock.ticks_per_second()
            );
        }
        Self {
            clock,
            handler,
            binding,
            config,
            channel: None,
        }
    }

    /// Start the timer at the nominal frequency.
    pub fn begin_nominal(&mut self) -> RtcResult<()> {
        self.begin(self.config.nominal_hz)
    }

    /// Validate `frequency_hz` and start the periodic timer.
    ///
    /// A calibrated frequency (for example `100.076` measured against a
    /// reference) compensates for the oscillator error; it must stay within
    /// the configured tolerance of the nominal rate. Nothing is retried.
    pub fn begin(&mut self, frequency_hz: f32) -> RtcResult<()> {
        let result = self.try_begin(frequency_hz);
        match &result {
            Ok(()) => info!("software RTC started at {} Hz", frequency_hz),
            Err(err) => warn!("software RTC failed to start: {}", err),
        }
        result
    }

    fn try_begin(&mut self, frequency_hz: f32) -> RtcResult<()> {
        if self.channel.is_some() {
            return Err(RtcError::AlreadyRunning);
        }
        if !self.config.accepts(frequency_hz) {
            return Err(RtcError::FrequencyOutOfTolerance {
                requested: frequency_hz,
                nominal: self.config.nominal_hz,
                tolerance: self.config.tolerance_hz,
            });
        }

        let kind = self.config.timer_kind;
        let channel = match self.binding.acquire(kind, false) {
            Some(channel) => channel,
            None if self.config.allow_reserved => {
                debug!("no free {:?} timer, trying reserved channels", kind);
                self.binding
                    .acquire(kind, true)
                    .ok_or(RtcError::NoTimerAvailable)?
            }
            None => return Err(RtcError::NoTimerAvailable),
        };

        if let Err(err) = self.arm(channel, frequency_hz) {
            self.binding.release(channel);
            return Err(err);
        }

        self.channel = Some(channel);
        Ok(())
    }

    fn arm(&mut self, channel: B::Channel, frequency_hz: f32) -> RtcResult<()> {
        self.binding
            .configure(channel, TimerConfig::periodic(frequency_hz), self.handler)
            .map_err(RtcError::Configure)?;
        self.binding
            .enable_period_interrupt(channel)
            .map_err(RtcError::ArmInterrupt)?;
        self.binding.open(channel).map_err(RtcError::Open)?;
        self.binding.start(channel).map_err(RtcError::Start)
    }

    /// Stop the timer and release its channel. The clock keeps its value.
    pub fn stop(&mut self) -> RtcResult<()> {
        let channel = self.channel.ok_or(RtcError::NotRunning)?;
        self.binding.stop(channel).map_err(RtcError::Stop)?;
        self.binding.release(channel);
        self.channel = None;
        info!("software RTC stopped");
        Ok(())
    }

    /// Whether a timer channel is currently ticking.
    pub fn is_running(&self) -> bool {
        self.channel.is_some()
    }

    /// Overwrite the clock; see [`ClockState::set_unix_time`].
    pub fn set_unix_time(&self, secs: i64) {
        debug!("clock set to {}", secs);
        self.clock.set_unix_time(secs);
    }

    /// Current Unix time in whole seconds.
    pub fn unix_time(&self) -> i64 {
        self.clock.unix_time()
    }

    /// Normalize `fields` in the configured zone, store and return the result.
    ///
    /// `fields.dst` defaults to [`DstFlag::Standard`](swrtc_core::DstFlag),
    /// which means summer-time input is read as standard time unless the
    /// caller flags it.
    pub fn set_calendar_time(&self, fields: &CalendarTime) -> i64 {
        let secs = self.clock.set_calendar_time(
            fields,
            self.config.utc_offset_secs,
            self.config.dst_offset_secs,
        );
        debug!("clock set to {} ({})", secs, fields);
        secs
    }

    /// Current time decomposed in UTC.
    pub fn calendar_time(&self) -> CalendarTime {
        self.clock.calendar_time()
    }

    /// Shared clock state driven by the timer
    pub fn clock(&self) -> &'static ClockState<S> {
        self.clock
    }

    /// Configuration the clock was created with
    pub fn config(&self) -> &RtcConfig {
        &self.config
    }

    /// Underlying timer binding
    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Underlying timer binding, mutably. Touching the running channel
    /// behind the clock's back is the caller's responsibility.
    pub fn binding_mut(&mut self) -> &mut B {
        &mut self.binding
    }
}
