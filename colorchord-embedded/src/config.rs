//! Runtime configuration consumed by the core.
//!
//! The values are owned and persisted by the configuration service; the core
//! only reads them once per task iteration.

/// How the analysis engine maps notes onto the LED strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDriver {
    /// Notes are laid out linearly along the strip.
    Linear,
    /// The whole strip shows a single blended color.
    AllSame,
}

impl OutputDriver {
    /// Decode the numeric setting used by the configuration service.
    ///
    /// Unknown values fall back to [`OutputDriver::Linear`].
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => OutputDriver::AllSame,
            _ => OutputDriver::Linear,
        }
    }
}

/// Opaque mode byte forwarded to the LED driver with every push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedDriverMode(pub u8);

/// Configuration inputs read by the control core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Input amplitude scale applied as `(v * amplitude) >> 4`.
    pub initial_amp: i32,
    /// Note-to-LED mapping used when a frame completes.
    pub output_driver: OutputDriver,
    /// Mode byte passed through to the LED driver.
    pub led_driver_mode: LedDriverMode,
    /// Number of LEDs driven from each frame.
    pub led_count: usize,
    /// Whether the visualization pipeline is active.
    pub colorchord_active: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            initial_amp: 80,
            output_driver: OutputDriver::Linear,
            led_driver_mode: LedDriverMode(0),
            led_count: 16,
            colorchord_active: true,
        }
    }
}
