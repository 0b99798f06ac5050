#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # SwRTC Clock
//!
//! A whole-second Unix clock kept in software by a periodic timer interrupt,
//! for boards whose hardware RTC is missing or too inaccurate.
//!
//! ## Module Overview
//! - [`state`] – shared clock value and the tick accumulator run from the
//!   timer interrupt.
//! - [`sync`]  – critical-section strategies: interrupt masking or a
//!   preemptive scheduler's primitive.
//! - [`rtc`]   – [`SoftRtc`], which validates the frequency, drives the timer
//!   binding and exposes Unix and calendar accessors.
//!
//! Accuracy is bounded by the timer's oscillator. Without a crystal, expect
//! to calibrate the frequency passed to [`SoftRtc::begin`] against a precise
//! reference; about one second per day is achievable.

pub mod rtc;
pub mod state;
pub mod sync;

#[cfg(feature = "probe")]
pub mod probe;

pub use rtc::SoftRtc;
pub use state::ClockState;
pub use sync::{InterruptFree, SchedulerCritical, SchedulerPort, SyncStrategy};

#[cfg(feature = "probe")]
pub use probe::ProbedTick;

pub use swrtc_core::{
    CalendarTime, DstFlag, RtcConfig, RtcError, RtcResult, DEFAULT_TOLERANCE_HZ,
    NOMINAL_FREQUENCY_HZ, TICKS_PER_SECOND, VERSION,
};
