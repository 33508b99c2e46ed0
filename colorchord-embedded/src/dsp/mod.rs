//! Fixed-point signal conditioning ahead of the analysis engine.

pub mod conditioner;

pub use conditioner::SampleConditioner;
