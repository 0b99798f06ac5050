//! Clock configuration

use swrtc_hal::TimerKind;

use crate::{DEFAULT_TOLERANCE_HZ, NOMINAL_FREQUENCY_HZ, TICKS_PER_SECOND};

/// Configuration for a software RTC instance.
///
/// The frequency window and tick threshold are fixed once the clock starts.
/// The calendar offsets only affect [`CalendarTime`](crate::CalendarTime)
/// conversion when setting the clock from calendar fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RtcConfig {
    pub nominal_hz: f32,
    pub tolerance_hz: f32,
    pub ticks_per_second: u32,
    pub timer_kind: TimerKind,
    pub allow_reserved: bool,
    pub utc_offset_secs: i32,
    pub dst_offset_secs: i32,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            nominal_hz: NOMINAL_FREQUENCY_HZ,
            tolerance_hz: DEFAULT_TOLERANCE_HZ,
            ticks_per_second: TICKS_PER_SECOND,
            timer_kind: TimerKind::GeneralPurpose,
            allow_reserved: true,
            utc_offset_secs: 0,
            dst_offset_secs: 3600,
        }
    }
}

impl RtcConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RtcConfigBuilder {
        RtcConfigBuilder::default()
    }

    /// Returns `true` if `frequency_hz` lies within `nominal ± tolerance`.
    ///
    /// Both bounds are inclusive. NaN is never accepted.
    pub fn accepts(&self, frequency_hz: f32) -> bool {
        frequency_hz >= self.nominal_hz - self.tolerance_hz
            && frequency_hz <= self.nominal_hz + self.tolerance_hz
    }
}

/// Builder for ergonomic clock configuration construction.
#[derive(Debug, Clone, Default)]
pub struct RtcConfigBuilder {
    config: RtcConfig,
}

impl RtcConfigBuilder {
    /// Sets the nominal (uncalibrated) timer frequency.
    pub fn nominal_hz(mut self, hz: f32) -> Self {
        self.config.nominal_hz = hz;
        self
    }

    /// Sets the accepted deviation from the nominal frequency.
    pub fn tolerance_hz(mut self, hz: f32) -> Self {
        self.config.tolerance_hz = hz;
        self
    }

    /// Sets how many timer firings make up one second.
    pub fn ticks_per_second(mut self, ticks: u32) -> Self {
        self.config.ticks_per_second = ticks;
        self
    }

    /// Sets the timer family channels are drawn from.
    pub fn timer_kind(mut self, kind: TimerKind) -> Self {
        self.config.timer_kind = kind;
        self
    }

    /// Allows falling back to reserved timer channels.
    pub fn allow_reserved(mut self, allow: bool) -> Self {
        self.config.allow_reserved = allow;
        self
    }

    /// Sets the offset of calendar input relative to UTC, in seconds east.
    pub fn utc_offset_secs(mut self, secs: i32) -> Self {
        self.config.utc_offset_secs = secs;
        self
    }

    /// Sets the shift applied when calendar input is flagged as DST.
    pub fn dst_offset_secs(mut self, secs: i32) -> Self {
        self.config.dst_offset_secs = secs;
        self
    }

    /// Builds the clock configuration.
    pub fn build(self) -> RtcConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_nominal_plus_minus_two() {
        let config = RtcConfig::default();
        assert!(config.accepts(100.0));
        assert!(config.accepts(98.0));
        assert!(config.accepts(102.0));
        assert!(config.accepts(100.076));
        assert!(!config.accepts(97.0));
        assert!(!config.accepts(103.0));
        assert!(!config.accepts(f32::NAN));
    }

    #[test]
    fn builder_overrides_window() {
        let config = RtcConfig::builder()
            .nominal_hz(1000.0)
            .tolerance_hz(0.5)
            .ticks_per_second(1000)
            .build();
        assert!(config.accepts(1000.4));
        assert!(!config.accepts(1001.0));
        assert_eq!(config.ticks_per_second, 1000);
        assert!(config.allow_reserved);
    }

    #[test]
    fn builder_sets_calendar_offsets() {
        let config = RtcConfig::builder()
            .utc_offset_secs(3600)
            .dst_offset_secs(1800)
            .timer_kind(TimerKind::LowPower)
            .allow_reserved(false)
            .build();
        assert_eq!(config.utc_offset_secs, 3600);
        assert_eq!(config.dst_offset_secs, 1800);
        assert_eq!(config.timer_kind, TimerKind::LowPower);
        assert!(!config.allow_reserved);
    }
}
