//! Analysis engine and LED driver seams, plus the frame-complete path.
//!
//! The frequency analysis and the strip transmission are external; the core
//! only guarantees when they are invoked and how many bytes are pushed.

use crate::config::{LedDriverMode, OutputDriver, Settings};
use crate::constants::BYTES_PER_LED;

/// Intake for conditioned samples.
pub trait SampleSink {
    fn push_sample(&mut self, sample: i32);
}

/// The external note/color analysis engine.
pub trait AnalysisEngine: SampleSink {
    /// Fold the samples of the frame that just completed into note data.
    fn handle_frame_info(&mut self);

    /// Render notes linearly along the strip into the LED buffer.
    fn update_linear_leds(&mut self);

    /// Render one blended color for the whole strip into the LED buffer.
    fn update_all_same_leds(&mut self);

    /// The LED buffer, three bytes per LED.
    fn led_output(&self) -> &[u8];
}

/// The physical LED strip transmitter.
pub trait LedDriver {
    /// Transmit `pixels` (three bytes per LED) in the given driver mode.
    fn push(&mut self, pixels: &[u8], mode: LedDriverMode);
}

/// Frame-complete handling: render the engine's view and push it out.
#[derive(Debug, Default)]
pub struct FrameOutput {
    frames_pushed: u32,
}

impl FrameOutput {
    pub const fn new() -> Self {
        FrameOutput { frames_pushed: 0 }
    }

    /// Handle one completed frame.
    ///
    /// Nothing happens while the pipeline is inactive. Returns the number of
    /// bytes pushed to the driver.
    pub fn new_frame<E, L>(&mut self, settings: &Settings, engine: &mut E, driver: &mut L) -> usize
    where
        E: AnalysisEngine + ?Sized,
        L: LedDriver + ?Sized,
    {
        if !settings.colorchord_active {
            return 0;
        }

        engine.handle_frame_info();
        match settings.output_driver {
            OutputDriver::Linear => engine.update_linear_leds(),
            OutputDriver::AllSame => engine.update_all_same_leds(),
        }

        let leds = engine.led_output();
        let len = (settings.led_count * BYTES_PER_LED).min(leds.len());
        driver.push(&leds[..len], settings.led_driver_mode);

        self.frames_pushed = self.frames_pushed.wrapping_add(1);
        log::trace!("frame {} pushed ({} bytes)", self.frames_pushed, len);
        len
    }

    /// Frames handed to the LED driver so far.
    pub fn frames_pushed(&self) -> u32 {
        self.frames_pushed
    }
}
