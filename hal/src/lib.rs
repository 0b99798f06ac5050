//! Hardware Abstraction Layer (HAL) for the software RTC
//!
//! This crate provides the vendor-agnostic capability the clock needs from a
//! periodic hardware timer: acquire a channel, install a tick handler, arm the
//! period interrupt, start and stop. Board ports implement [`TimerBinding`].

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod error;
pub mod timer;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use timer::{TickHandler, TimerBinding, TimerConfig, TimerKind, TimerMode};
