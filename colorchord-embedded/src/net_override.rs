//! Direct LED override over UDP.
//!
//! Any datagram received on [`OVERRIDE_UDP_PORT`](crate::constants::OVERRIDE_UDP_PORT)
//! is written straight to the LED driver, bypassing the conditioner and the
//! analysis engine. The first [`OVERRIDE_HEADER_LEN`] bytes are a header and
//! are skipped; the remainder is trusted as driver-ready pixel data.
//!
//! The socket itself belongs to the platform: it calls
//! [`NetworkOverride::on_datagram`] from its receive callback.

use crate::config::LedDriverMode;
use crate::constants::{OVERRIDE_HEADER_LEN, OVERRIDE_MAX_FRAME};
use crate::output::LedDriver;

/// Receive-side state of the override channel.
#[derive(Debug, Default)]
pub struct NetworkOverride {
    forwarded: u32,
    rejected: u32,
}

impl NetworkOverride {
    pub const fn new() -> Self {
        NetworkOverride {
            forwarded: 0,
            rejected: 0,
        }
    }

    /// Forward one datagram to `driver`.
    ///
    /// Payloads longer than [`OVERRIDE_MAX_FRAME`] are cut to that length
    /// first. Datagrams with nothing past the header are dropped. Returns the
    /// number of bytes pushed.
    pub fn on_datagram<L: LedDriver + ?Sized>(&mut self, payload: &[u8], mode: LedDriverMode, driver: &mut L) -> usize {
        let frame = &payload[..payload.len().min(OVERRIDE_MAX_FRAME)];
        let Some(pixels) = frame.get(OVERRIDE_HEADER_LEN..).filter(|p| !p.is_empty()) else {
            self.rejected = self.rejected.wrapping_add(1);
            log::warn!("override datagram of {} bytes has no pixel data", payload.len());
            return 0;
        };

        driver.push(pixels, mode);
        self.forwarded = self.forwarded.wrapping_add(1);
        log::trace!("override datagram {}: {} bytes to LEDs", self.forwarded, pixels.len());
        pixels.len()
    }

    /// Datagrams written to the LED driver so far.
    pub fn forwarded(&self) -> u32 {
        self.forwarded
    }

    /// Datagrams dropped for being header-only or shorter.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}
