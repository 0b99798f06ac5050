//! Software RTC on Linux (POSIX)
//!
//! Runs the clock from a host timer thread and prints the calendar time once
//! per second. Run with `--help` for usage.
//!
//! The frequency defaults to the nominal 100 Hz; pass a calibrated value such
//! as `100.076` to see the tolerance check at work. Set `RUST_LOG=debug` for
//! the clock's own log output.

use std::process::ExitCode;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use log::error;
use swrtc_clock::{ClockState, RtcConfig, SoftRtc, NOMINAL_FREQUENCY_HZ, VERSION};
use swrtc_posix::{HostRtc, ThreadTimer};

#[derive(Parser, Debug)]
#[command(author, version, about = "Software RTC driven by a host timer thread")]
struct Args {
    /// Timer frequency in Hz, calibrated or nominal
    #[arg(default_value_t = NOMINAL_FREQUENCY_HZ)]
    frequency: f32,

    /// How many seconds to run before stopping
    #[arg(default_value_t = 5)]
    seconds: u64,
}

static CLOCK: ClockState = ClockState::interrupt_free();

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Args { frequency, seconds } = Args::parse();

    println!("swrtc {VERSION}, timer at {frequency} Hz");

    let mut rtc: HostRtc = SoftRtc::new(&CLOCK, ThreadTimer::default(), RtcConfig::default());

    // Seed from the host clock the way a board would from NTP or a GPS fix.
    let host_now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    rtc.set_unix_time(host_now);

    if let Err(err) = rtc.begin(frequency) {
        error!("{err}");
        return ExitCode::FAILURE;
    }

    for _ in 0..seconds {
        thread::sleep(Duration::from_secs(1));
        let now = rtc.calendar_time();
        println!("{now} UTC  (unix {}, ticks {})", rtc.unix_time(), rtc.clock().ticks());
    }

    if let Err(err) = rtc.stop() {
        error!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_to_nominal_rate() {
        let args = Args::try_parse_from(["host-clock"]).unwrap();
        assert_eq!(args.frequency, NOMINAL_FREQUENCY_HZ);
        assert_eq!(args.seconds, 5);
    }

    #[test]
    fn positional_rate_and_duration() {
        let args = Args::try_parse_from(["host-clock", "100.076", "3"]).unwrap();
        assert_eq!(args.frequency, 100.076);
        assert_eq!(args.seconds, 3);
    }

    #[test]
    fn malformed_arguments_rejected() {
        assert!(Args::try_parse_from(["host-clock", "fast"]).is_err());
        assert!(Args::try_parse_from(["host-clock", "100", "-1"]).is_err());
        assert!(Args::try_parse_from(["host-clock", "100", "3", "extra"]).is_err());
    }
}
