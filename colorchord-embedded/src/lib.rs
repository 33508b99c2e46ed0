//! # colorchord-embedded
//!
//! A `no_std`, zero-allocation control core for an audio-reactive LED
//! controller on a Wi-Fi microcontroller. Raw ADC samples arrive from a
//! sampling interrupt, are DC-filtered and gain-scaled, and every 128
//! samples the external note analysis renders a frame that is pushed to an
//! LED strip. A 100 ms watchdog handles power recovery and holds sampling
//! off until the network is up; a UDP side channel can write LEDs directly.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Config | [`constants`] / [`config`] | Fixed parameters and runtime [`Settings`](config::Settings) |
//! | I/O | [`io`] | Lock-free ISR → task sample ring |
//! | DSP | [`dsp`] | DC-bias removal, gain, frame counting |
//! | Output | [`output`] | Analysis engine / LED driver seams, frame-complete path |
//! | Control | [`gate`] / [`scheduler`] / [`watchdog`] | Sampling gate, processing task, 100 ms housekeeping |
//! | Platform | [`control`] / [`power`] / [`boot`] | Service ticks, reset causes, startup |
//! | Network | [`net_override`] | Raw LED override over UDP (feature-gated) |
//!
//! ## Wiring
//!
//! ```ignore
//! use colorchord_embedded::prelude::*;
//!
//! static mut RING: SampleRing<RawSample, SAMPLE_RING_SLOTS> = SampleRing::new();
//!
//! let (mut producer, mut consumer) = unsafe { RING.split() };
//! // Sampling ISR:  producer.push(adc_read());
//!
//! let Booted { mut ctx, mut scheduler, .. } =
//!     boot(&mut sdk, &mut audio_pin, &mut udp, wifi_mode, &power, &mut hw_timer)
//!         .unwrap_or_else(|e| halt_forever(e, |s| uart.write_str(s)));
//!
//! // Task dispatcher:
//! let mut io = Io { source: &mut consumer, engine: &mut engine, leds: &mut strip,
//!                   timer: &mut hw_timer, services: &mut services };
//! scheduler.run_pending(&mut ctx, &settings, &mut io);
//!
//! // Every 100 ms:
//! watchdog.fire(&mut ctx, &mut services, &mut hw_timer, &consumer, &mut power);
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `net-override` | yes | UDP raw LED override |
//!
//! ## Audio parameters
//!
//! - **Frame size:** 128 samples ([`constants::FRAME_SAMPLES`])
//! - **Sample format:** `i16` raw ADC reading, `i32` after conditioning
//! - **Sample ring:** 512 slots ([`constants::SAMPLE_RING_SLOTS`])

#![no_std]

#[cfg(test)]
extern crate std;

pub mod constants;
pub mod config;
pub mod control;
pub mod io;
pub mod dsp;
pub mod output;
pub mod gate;
pub mod power;
pub mod watchdog;
pub mod scheduler;
pub mod boot;

#[cfg(feature = "net-override")]
pub mod net_override;

#[cfg(test)]
mod test_support;


/// Everything a platform port needs in one import.
pub mod prelude {
    pub use crate::boot::{boot, halt_forever, BootError, Booted, OverrideServer, PartitionMap, PartitionRegistrar, WifiMode};
    pub use crate::config::{LedDriverMode, OutputDriver, Settings};
    pub use crate::constants::*;
    pub use crate::control::{CommonServices, TickKind};
    pub use crate::dsp::SampleConditioner;
    pub use crate::gate::{GateState, ResourceGate, SamplingTimer};
    pub use crate::io::{Consumer, Producer, RawSample, SampleRing, SampleSource};
    #[cfg(feature = "net-override")]
    pub use crate::net_override::NetworkOverride;
    pub use crate::output::{AnalysisEngine, FrameOutput, LedDriver, SampleSink};
    pub use crate::power::{PowerAction, PowerControl, ResetCause, WakeRadio};
    pub use crate::scheduler::{Io, Iteration, ProcContext, TaskEvent, TaskScheduler};
    pub use crate::watchdog::{DeferredStart, WatchdogOutcome, WatchdogTimer};
}
