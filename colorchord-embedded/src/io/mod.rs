//! Sample intake between the sampling interrupt and the processing task.
//!
//! ## Components
//!
//! | Item | Side | Description |
//! |------|------|-------------|
//! | [`SampleRing`] | both | Lock-free SPSC ring with atomic head/tail |
//! | [`Producer`] | ISR | Pushes raw ADC samples, counts overruns |
//! | [`Consumer`] | task | Pops samples in arrival order |
//! | [`SampleSource`] | task | Drain-side contract used by the scheduler |

pub mod source;
pub mod spsc;

pub use source::{RawSample, SampleSource};
pub use spsc::{Consumer, Producer, SampleRing};
