/// Number of conditioned samples per analysis frame.
pub const FRAME_SAMPLES: usize = 128;

/// Right shift of the DC-bias accumulator (pole at ~1/1024).
pub const BIAS_SHIFT: u32 = 10;

/// Fixed gain applied after bias removal to restore headroom.
pub const PRE_GAIN: i32 = 16;

/// Right shift applied after multiplying by the configured amplitude.
pub const AMPLITUDE_SHIFT: u32 = 4;

/// Total slots in the ISR → task sample ring (usable capacity is one less).
pub const SAMPLE_RING_SLOTS: usize = 512;

/// Period of the software watchdog timer in milliseconds.
pub const WATCHDOG_PERIOD_MS: u32 = 100;

/// Deep-sleep duration entered when the boot button is held.
pub const DEEP_SLEEP_MS: u32 = 2000;

/// UDP port of the raw LED override server.
pub const OVERRIDE_UDP_PORT: u16 = 7777;

/// Bytes skipped at the start of every override datagram.
pub const OVERRIDE_HEADER_LEN: usize = 3;

/// Largest datagram the override path will forward.
pub const OVERRIDE_MAX_FRAME: usize = 2000;

/// Bytes per LED in the output buffer (GRB).
pub const BYTES_PER_LED: usize = 3;
