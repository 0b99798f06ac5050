//! Software RTC running on real host timer threads.

use std::thread;
use std::time::Duration;

use swrtc_clock::{ClockState, InterruptFree, RtcConfig, RtcError, SoftRtc};
use swrtc_hal::TimerKind;
use swrtc_posix::{host_critical, leak_clock, HostCritical, HostRtc, ThreadTimer};

/// 100 Hz timer, ten ticks per simulated second.
fn fast_config() -> RtcConfig {
    RtcConfig::builder().ticks_per_second(10).build()
}

#[test]
fn clock_advances_with_timer() {
    let clock = leak_clock(InterruptFree, 10);
    let mut rtc: HostRtc = SoftRtc::new(clock, ThreadTimer::default(), fast_config());
    rtc.set_unix_time(1_700_000_000);

    rtc.begin(100.0).expect("timer should start");
    thread::sleep(Duration::from_millis(550));
    rtc.stop().expect("timer should stop");

    let elapsed = rtc.unix_time() - 1_700_000_000;
    assert!((3..=6).contains(&elapsed), "expected ~5 seconds, got {elapsed}");
    assert_eq!(rtc.binding().running_channels(), 0);
}

#[test]
fn rejected_frequency_starts_nothing() {
    let clock = leak_clock(InterruptFree, 10);
    let mut rtc: HostRtc = SoftRtc::new(clock, ThreadTimer::default(), fast_config());
    assert!(matches!(
        rtc.begin(97.0),
        Err(RtcError::FrequencyOutOfTolerance { .. })
    ));
    assert_eq!(rtc.binding().running_channels(), 0);
}

#[test]
fn reserved_channel_used_when_pool_is_busy() {
    let timers = ThreadTimer::new().with_channel(TimerKind::GeneralPurpose, true);
    let mut rtc: HostRtc = SoftRtc::new(leak_clock(InterruptFree, 10), timers, fast_config());
    assert_eq!(rtc.begin_nominal(), Ok(()));
    assert_eq!(rtc.binding().running_channels(), 1);
}

#[test]
fn empty_pool_reports_no_timer() {
    let clock = leak_clock(InterruptFree, 10);
    let mut rtc: HostRtc = SoftRtc::new(clock, ThreadTimer::new(), fast_config());
    assert_eq!(rtc.begin_nominal(), Err(RtcError::NoTimerAvailable));
}

#[test]
fn scheduler_strategy_excludes_timer_thread() {
    static CLOCK: ClockState<HostCritical> = ClockState::new(host_critical(), 1);
    const START: i64 = 0x0000_0000_FFFF_FF00;

    let config = RtcConfig::builder()
        .nominal_hz(1000.0)
        .ticks_per_second(1)
        .build();
    let mut rtc: HostRtc<HostCritical> = SoftRtc::new(&CLOCK, ThreadTimer::default(), config);
    rtc.set_unix_time(START);
    rtc.begin_nominal().expect("timer should start");

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let mut last = START;
                for _ in 0..20_000 {
                    let now = CLOCK.unix_time();
                    assert!(now >= last, "clock went backwards: {last:#x} -> {now:#x}");
                    assert!(now - START < 100_000, "torn read {now:#x}");
                    last = now;
                }
            });
        }
    });

    thread::sleep(Duration::from_millis(20));
    rtc.stop().expect("timer should stop");
    assert!(rtc.unix_time() > START);
}
