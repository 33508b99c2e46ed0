//! DC removal, gain staging and frame counting.
//!
//! Each raw sample passes through three integer steps:
//!
//! ```text
//! bias  = bias - (bias >> 10) + raw          one-pole DC tracker
//! v     = (raw - (bias >> 10)) * 16          remove DC, restore headroom
//! v     = (v * amplitude) >> 4               configured input scale
//! ```
//!
//! Every [`FRAME_SAMPLES`] forwarded samples the conditioner reports a
//! completed frame. All arithmetic wraps; overflow of the accumulator is
//! tolerated rather than treated as a fault.

use crate::constants::{AMPLITUDE_SHIFT, BIAS_SHIFT, FRAME_SAMPLES, PRE_GAIN};
use crate::io::RawSample;
use crate::output::SampleSink;

/// Owns the filter accumulator and the frame counter.
///
/// Both live for the whole process and are never reset.
#[derive(Debug, Default)]
pub struct SampleConditioner {
    /// DC estimate scaled by 2^10.
    bias: i32,
    /// Samples forwarded since the last completed frame.
    frame_fill: usize,
}

impl SampleConditioner {
    pub const fn new() -> Self {
        SampleConditioner {
            bias: 0,
            frame_fill: 0,
        }
    }

    /// Run one raw sample through the filter and return the conditioned value.
    ///
    /// Does not touch the frame counter.
    #[inline]
    pub fn condition(&mut self, raw: RawSample, amplitude: i32) -> i32 {
        let raw = raw as i32;
        self.bias = self
            .bias
            .wrapping_sub(self.bias >> BIAS_SHIFT)
            .wrapping_add(raw);

        let v = raw
            .wrapping_sub(self.bias >> BIAS_SHIFT)
            .wrapping_mul(PRE_GAIN);
        v.wrapping_mul(amplitude) >> AMPLITUDE_SHIFT
    }

    /// Condition `raw`, forward it to `sink` and advance the frame counter.
    ///
    /// Returns `true` exactly when this sample completed a frame; the counter
    /// is already back at zero at that point.
    #[inline]
    pub fn consume<S>(&mut self, raw: RawSample, amplitude: i32, sink: &mut S) -> bool
    where
        S: SampleSink + ?Sized,
    {
        let v = self.condition(raw, amplitude);
        sink.push_sample(v);

        self.frame_fill += 1;
        if self.frame_fill == FRAME_SAMPLES {
            self.frame_fill = 0;
            true
        } else {
            false
        }
    }

    /// Current DC estimate in input units.
    pub fn dc_estimate(&self) -> i32 {
        self.bias >> BIAS_SHIFT
    }

    /// Raw accumulator value.
    pub fn bias(&self) -> i32 {
        self.bias
    }

    /// Samples forwarded since the last frame boundary.
    pub fn frame_fill(&self) -> usize {
        self.frame_fill
    }
}
