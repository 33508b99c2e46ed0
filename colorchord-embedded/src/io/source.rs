//! Drain-side contract of the sample queue.

use super::spsc::Consumer;

/// One raw ADC reading as delivered by the sampling interrupt.
pub type RawSample = i16;

/// Non-blocking access to samples produced in interrupt context.
///
/// Implementations must be safe to call from the cooperative task while the
/// producer keeps running.
pub trait SampleSource {
    /// Whether at least one sample is queued.
    fn sample_available(&self) -> bool;

    /// Take the oldest queued sample, or `None` when the queue is empty.
    fn pop_sample(&mut self) -> Option<RawSample>;

    /// Samples lost because the queue was full when they arrived.
    fn overruns(&self) -> u32 {
        0
    }
}

impl<const N: usize> SampleSource for Consumer<'_, RawSample, N> {
    fn sample_available(&self) -> bool {
        self.is_ready()
    }

    fn pop_sample(&mut self) -> Option<RawSample> {
        self.pop()
    }

    fn overruns(&self) -> u32 {
        Consumer::overruns(self)
    }
}
