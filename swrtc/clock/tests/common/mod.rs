//! Scriptable timer binding shared by the integration tests.

#![allow(dead_code)]

use swrtc_clock::ClockState;
use swrtc_hal::{HalError, HalResult, TickHandler, TimerBinding, TimerConfig, TimerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Configure,
    EnableInterrupt,
    Open,
    Start,
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Acquire { kind: TimerKind, reserved: bool },
    Configure(u8, TimerConfig),
    EnableInterrupt(u8),
    Open(u8),
    Start(u8),
    Stop(u8),
    Release(u8),
}

/// Timer pool with a free list, a reserved list and one injectable failure.
pub struct MockTimers {
    pub free: Vec<u8>,
    pub reserved: Vec<u8>,
    pub fail: Option<(Step, HalError)>,
    pub calls: Vec<Call>,
    pub handler: Option<&'static dyn TickHandler>,
    pub running: bool,
}

impl MockTimers {
    pub fn new(free: &[u8], reserved: &[u8]) -> Self {
        Self {
            free: free.to_vec(),
            reserved: reserved.to_vec(),
            fail: None,
            calls: Vec::new(),
            handler: None,
            running: false,
        }
    }

    pub fn failing(mut self, step: Step, err: HalError) -> Self {
        self.fail = Some((step, err));
        self
    }

    /// Simulate `n` timer interrupts.
    pub fn fire(&self, n: u32) {
        let handler = self.handler.expect("no handler installed");
        assert!(self.running, "timer not started");
        for _ in 0..n {
            handler.on_tick();
        }
    }

    fn check(&self, step: Step) -> HalResult<()> {
        match self.fail {
            Some((failing, err)) if failing == step => Err(err),
            _ => Ok(()),
        }
    }
}

impl TimerBinding for MockTimers {
    type Channel = u8;

    fn acquire(&mut self, kind: TimerKind, allow_reserved: bool) -> Option<u8> {
        self.calls.push(Call::Acquire {
            kind,
            reserved: allow_reserved,
        });
        if allow_reserved {
            self.reserved.pop()
        } else {
            self.free.pop()
        }
    }

    fn configure(
        &mut self,
        channel: u8,
        config: TimerConfig,
        handler: &'static dyn TickHandler,
    ) -> HalResult<()> {
        self.calls.push(Call::Configure(channel, config));
        self.check(Step::Configure)?;
        self.handler = Some(handler);
        Ok(())
    }

    fn enable_period_interrupt(&mut self, channel: u8) -> HalResult<()> {
        self.calls.push(Call::EnableInterrupt(channel));
        self.check(Step::EnableInterrupt)
    }

    fn open(&mut self, channel: u8) -> HalResult<()> {
        self.calls.push(Call::Open(channel));
        self.check(Step::Open)
    }

    fn start(&mut self, channel: u8) -> HalResult<()> {
        self.calls.push(Call::Start(channel));
        self.check(Step::Start)?;
        self.running = true;
        Ok(())
    }

    fn stop(&mut self, channel: u8) -> HalResult<()> {
        self.calls.push(Call::Stop(channel));
        self.check(Step::Stop)?;
        self.running = false;
        Ok(())
    }

    fn release(&mut self, channel: u8) {
        self.calls.push(Call::Release(channel));
        self.free.push(channel);
    }
}

/// Fresh interrupt-masked clock with a `'static` lifetime.
pub fn leak_clock(ticks_per_second: u32) -> &'static ClockState {
    Box::leak(Box::new(ClockState::new(
        swrtc_clock::InterruptFree,
        ticks_per_second,
    )))
}
