#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # SwRTC Core
//!
//! Constants, configuration, errors and calendar conversion shared by the
//! software real-time clock. The clock itself lives in `swrtc-clock`; this
//! crate holds everything that does not touch shared state.

use core::fmt;

use swrtc_hal::HalError;

pub mod calendar;
pub mod config;

pub use calendar::{CalendarTime, DstFlag};
pub use config::{RtcConfig, RtcConfigBuilder};

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Library major version
pub const VERSION_MAJOR: u32 = 1;
/// Library minor version
pub const VERSION_MINOR: u32 = 0;
/// Library revision
pub const VERSION_PATCH: u32 = 0;
/// Numeric version, `major * 10000 + minor * 100 + patch`
pub const VERSION_NUM: u32 = VERSION_MAJOR * 10_000 + VERSION_MINOR * 100 + VERSION_PATCH;

/// Default timer frequency in Hz
pub const NOMINAL_FREQUENCY_HZ: f32 = 100.0;
/// Timer firings that make up one second
pub const TICKS_PER_SECOND: u32 = 100;
/// Accepted deviation from the nominal frequency, in Hz
pub const DEFAULT_TOLERANCE_HZ: f32 = 2.0;

/// Result type used throughout the clock
pub type RtcResult<T> = Result<T, RtcError>;

/// Failures reported by clock initialization and shutdown
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// Requested frequency lies outside `nominal ± tolerance`
    FrequencyOutOfTolerance {
        requested: f32,
        nominal: f32,
        tolerance: f32,
    },
    /// No timer channel could be acquired, reserved channels included
    NoTimerAvailable,
    /// Channel rejected the periodic configuration
    Configure(HalError),
    /// Period interrupt could not be armed
    ArmInterrupt(HalError),
    /// Channel could not be opened
    Open(HalError),
    /// Channel could not be started
    Start(HalError),
    /// Channel could not be stopped
    Stop(HalError),
    /// `begin` called while the timer is running
    AlreadyRunning,
    /// `stop` called while no timer is running
    NotRunning,
}

impl fmt::Display for RtcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtcError::FrequencyOutOfTolerance {
                requested,
                nominal,
                tolerance,
            } => write!(
                f,
                "timer frequency {requested} Hz outside {nominal} ± {tolerance} Hz"
            ),
            RtcError::NoTimerAvailable => write!(f, "no timer channel available"),
            RtcError::Configure(err) => write!(f, "timer configuration failed: {err}"),
            RtcError::ArmInterrupt(err) => write!(f, "period interrupt setup failed: {err}"),
            RtcError::Open(err) => write!(f, "timer open failed: {err}"),
            RtcError::Start(err) => write!(f, "timer start failed: {err}"),
            RtcError::Stop(err) => write!(f, "timer stop failed: {err}"),
            RtcError::AlreadyRunning => write!(f, "clock timer already running"),
            RtcError::NotRunning => write!(f, "clock timer not running"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RtcError {}
