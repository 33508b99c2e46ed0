//! Allocation-free test doubles shared by the unit and integration tests.

use embedded_hal::digital::{self, ErrorType, InputPin, OutputPin};

use crate::config::LedDriverMode;
use crate::control::{CommonServices, TickKind};
use crate::gate::SamplingTimer;
use crate::io::{RawSample, SampleSource};
use crate::output::{AnalysisEngine, LedDriver, SampleSink};
use crate::power::{PowerControl, ResetCause, WakeRadio};
use crate::scheduler::{Io, ProcContext};
use crate::watchdog::{WatchdogOutcome, WatchdogTimer};

// ── Sample source ──────────────────────────────────────────────────────────

const SOURCE_SLOTS: usize = 4096;

/// FIFO of samples fed by the test body.
pub struct MockSource {
    buf: [RawSample; SOURCE_SLOTS],
    head: usize,
    tail: usize,
    pub overruns: u32,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            buf: [0; SOURCE_SLOTS],
            head: 0,
            tail: 0,
            overruns: 0,
        }
    }

    pub fn feed(&mut self, sample: RawSample) {
        self.buf[self.head % SOURCE_SLOTS] = sample;
        self.head += 1;
        assert!(self.head - self.tail <= SOURCE_SLOTS, "mock source overflow");
    }
}

impl SampleSource for MockSource {
    fn sample_available(&self) -> bool {
        self.head != self.tail
    }

    fn pop_sample(&mut self) -> Option<RawSample> {
        if self.head == self.tail {
            return None;
        }
        let s = self.buf[self.tail % SOURCE_SLOTS];
        self.tail += 1;
        Some(s)
    }

    fn overruns(&self) -> u32 {
        self.overruns
    }
}

// ── Analysis engine ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall {
    FrameInfo,
    Linear,
    AllSame,
}

const RECORDED_SAMPLES: usize = 512;
const RECORDED_CALLS: usize = 16;
pub const MOCK_LED_BYTES: usize = 48;

/// Records forwarded samples and render calls; the LED buffer is a ramp.
pub struct MockEngine {
    samples: [i32; RECORDED_SAMPLES],
    pub sample_count: usize,
    calls: [EngineCall; RECORDED_CALLS],
    call_count: usize,
    leds: [u8; MOCK_LED_BYTES],
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            samples: [0; RECORDED_SAMPLES],
            sample_count: 0,
            calls: [EngineCall::FrameInfo; RECORDED_CALLS],
            call_count: 0,
            leds: core::array::from_fn(|i| i as u8),
        }
    }

    /// The first forwarded samples, up to the recording capacity.
    pub fn samples(&self) -> &[i32] {
        &self.samples[..self.sample_count.min(RECORDED_SAMPLES)]
    }

    /// The first render calls, up to the recording capacity.
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls[..self.call_count.min(RECORDED_CALLS)]
    }

    fn record(&mut self, call: EngineCall) {
        if self.call_count < RECORDED_CALLS {
            self.calls[self.call_count] = call;
        }
        self.call_count += 1;
    }
}

impl SampleSink for MockEngine {
    fn push_sample(&mut self, sample: i32) {
        if self.sample_count < RECORDED_SAMPLES {
            self.samples[self.sample_count] = sample;
        }
        self.sample_count += 1;
    }
}

impl AnalysisEngine for MockEngine {
    fn handle_frame_info(&mut self) {
        self.record(EngineCall::FrameInfo);
    }

    fn update_linear_leds(&mut self) {
        self.record(EngineCall::Linear);
    }

    fn update_all_same_leds(&mut self) {
        self.record(EngineCall::AllSame);
    }

    fn led_output(&self) -> &[u8] {
        &self.leds
    }
}

// ── LED driver ─────────────────────────────────────────────────────────────

const LED_CAPTURE: usize = 2048;

/// Keeps a copy of the most recent push.
pub struct MockLeds {
    pub pushes: usize,
    last: [u8; LED_CAPTURE],
    last_len: usize,
    pub last_mode: LedDriverMode,
}

impl MockLeds {
    pub fn new() -> Self {
        Self {
            pushes: 0,
            last: [0; LED_CAPTURE],
            last_len: 0,
            last_mode: LedDriverMode::default(),
        }
    }

    pub fn last(&self) -> &[u8] {
        &self.last[..self.last_len]
    }
}

impl LedDriver for MockLeds {
    fn push(&mut self, pixels: &[u8], mode: LedDriverMode) {
        let n = pixels.len().min(LED_CAPTURE);
        self.last[..n].copy_from_slice(&pixels[..n]);
        self.last_len = n;
        self.last_mode = mode;
        self.pushes += 1;
    }
}

// ── Sampling timer ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockTimer {
    pub starts: usize,
    pub pauses: usize,
    pub resumes: usize,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.starts + self.pauses + self.resumes
    }
}

impl SamplingTimer for MockTimer {
    fn start(&mut self) {
        self.starts += 1;
    }

    fn pause(&mut self) {
        self.pauses += 1;
    }

    fn resume(&mut self) {
        self.resumes += 1;
    }
}

// ── Services and power ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockServices {
    pub idle_ticks: usize,
    pub timed_ticks: usize,
    pub ip: bool,
}

impl CommonServices for MockServices {
    fn tick(&mut self, kind: TickKind) {
        match kind {
            TickKind::Idle => self.idle_ticks += 1,
            TickKind::Timed => self.timed_ticks += 1,
        }
    }

    fn has_ip(&self) -> bool {
        self.ip
    }
}

#[derive(Debug)]
pub struct MockPower {
    pub cause: ResetCause,
    pub sleeps: usize,
    pub restarts: usize,
    pub last_sleep: Option<(u32, WakeRadio)>,
}

impl MockPower {
    pub fn new(cause: ResetCause) -> Self {
        Self {
            cause,
            sleeps: 0,
            restarts: 0,
            last_sleep: None,
        }
    }
}

impl PowerControl for MockPower {
    fn reset_cause(&self) -> ResetCause {
        self.cause
    }

    fn deep_sleep(&mut self, ms: u32, radio: WakeRadio) {
        self.sleeps += 1;
        self.last_sleep = Some((ms, radio));
    }

    fn restart(&mut self) {
        self.restarts += 1;
    }
}

// ── GPIO ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct MockPinError;

impl digital::Error for MockPinError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

/// Input pin with a fixed level, or one that always fails to read.
pub struct ScriptedPin {
    low: bool,
    fail: bool,
}

impl ScriptedPin {
    pub fn pressed() -> Self {
        Self { low: true, fail: false }
    }

    pub fn released() -> Self {
        Self { low: false, fail: false }
    }

    pub fn failing() -> Self {
        Self { low: false, fail: true }
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.low = pressed;
    }
}

impl ErrorType for ScriptedPin {
    type Error = MockPinError;
}

impl InputPin for ScriptedPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        if self.fail {
            Err(MockPinError)
        } else {
            Ok(self.low)
        }
    }
}

/// Output pin that remembers its level.
pub struct RecordingPin {
    pub high: bool,
    pub fail: bool,
}

impl RecordingPin {
    pub fn new() -> Self {
        Self { high: false, fail: false }
    }
}

impl ErrorType for RecordingPin {
    type Error = MockPinError;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockPinError);
        }
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockPinError);
        }
        self.high = true;
        Ok(())
    }
}

// ── Whole board ────────────────────────────────────────────────────────────

/// Every collaborator of the core, owned in one place.
pub struct Rig {
    pub source: MockSource,
    pub engine: MockEngine,
    pub leds: MockLeds,
    pub timer: MockTimer,
    pub services: MockServices,
    pub power: MockPower,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            source: MockSource::new(),
            engine: MockEngine::new(),
            leds: MockLeds::new(),
            timer: MockTimer::new(),
            services: MockServices::default(),
            power: MockPower::new(ResetCause::PowerOn),
        }
    }

    pub fn io(&mut self) -> Io<'_, MockSource, MockEngine, MockLeds, MockTimer, MockServices> {
        Io {
            source: &mut self.source,
            engine: &mut self.engine,
            leds: &mut self.leds,
            timer: &mut self.timer,
            services: &mut self.services,
        }
    }

    pub fn fire<B: InputPin>(&mut self, wd: &mut WatchdogTimer<B>, ctx: &mut ProcContext) -> WatchdogOutcome {
        wd.fire(ctx, &mut self.services, &mut self.timer, &self.source, &mut self.power)
    }
}
