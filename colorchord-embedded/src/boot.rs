//! One-time startup: flash partition registration and the boot plan.
//!
//! ```text
//! register partitions ─► audio power on ─► bind UDP 7777 ─► log reset cause
//!        │ all fail            │ pin error        │ bind error
//!        └────────────► BootError ─► halt_forever
//!
//! station mode?  yes ─► DeferredStart::pending   (watchdog arms the gate)
//!                no  ─► gate armed now           (first iteration starts it)
//!
//! post the first idle event
//! ```

use core::fmt;

use embedded_hal::digital::OutputPin;

use crate::constants::OVERRIDE_UDP_PORT;
use crate::gate::SamplingTimer;
use crate::power::{PowerControl, ResetCause};
use crate::scheduler::{ProcContext, TaskEvent, TaskScheduler};
use crate::watchdog::DeferredStart;

// ── Partition tables ───────────────────────────────────────────────────────

/// What a flash partition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// Bootloader and the flash-resident image.
    FlashBin,
    /// Code executed in place from flash.
    Irom0Text,
    RfCal,
    PhyData,
    SystemParameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionEntry {
    pub kind: PartitionKind,
    pub addr: u32,
    pub size: u32,
}

/// A complete partition layout for one flash size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionMap {
    /// The SDK's flash size-map code.
    pub size_map: u8,
    pub entries: [PartitionEntry; 5],
}

impl PartitionMap {
    /// Standard layout whose three system sectors start at `rf_cal`.
    const fn with_system_sectors_at(size_map: u8, rf_cal: u32) -> Self {
        PartitionMap {
            size_map,
            entries: [
                PartitionEntry { kind: PartitionKind::FlashBin, addr: 0x0_0000, size: 0x1_0000 },
                PartitionEntry { kind: PartitionKind::Irom0Text, addr: 0x1_0000, size: 0x6_0000 },
                PartitionEntry { kind: PartitionKind::RfCal, addr: rf_cal, size: 0x1000 },
                PartitionEntry { kind: PartitionKind::PhyData, addr: rf_cal + 0x1000, size: 0x1000 },
                PartitionEntry { kind: PartitionKind::SystemParameter, addr: rf_cal + 0x2000, size: 0x3000 },
            ],
        }
    }
}

/// Candidate layouts in the order they are offered: 1 MB, 4 MB, 2 MB.
pub const PARTITION_MAPS: [PartitionMap; 3] = [
    PartitionMap::with_system_sectors_at(2, 0x0f_b000),
    PartitionMap::with_system_sectors_at(4, 0x3f_b000),
    PartitionMap::with_system_sectors_at(3, 0x1f_b000),
];

/// The SDK's partition registration call.
pub trait PartitionRegistrar {
    /// Returns `true` if the SDK accepted `map`.
    fn register(&mut self, map: &PartitionMap) -> bool;
}

/// Offer each candidate map until one is accepted.
///
/// Returns the accepted size-map code.
pub fn register_partitions<R: PartitionRegistrar + ?Sized>(registrar: &mut R) -> Result<u8, BootError> {
    for map in &PARTITION_MAPS {
        if registrar.register(map) {
            log::info!("partition map {} registered", map.size_map);
            return Ok(map.size_map);
        }
        log::debug!("partition map {} rejected", map.size_map);
    }
    Err(BootError::PartitionTable)
}

// ── Errors ─────────────────────────────────────────────────────────────────

/// Startup failures. All of them are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// No candidate partition map was accepted.
    PartitionTable,
    /// The override UDP server could not be created.
    OverrideSocket,
    /// The audio-circuit power pin could not be driven.
    AudioPower,
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::PartitionTable => f.write_str("no flash partition map accepted"),
            BootError::OverrideSocket => write!(f, "cannot bind override server on UDP {}", OVERRIDE_UDP_PORT),
            BootError::AudioPower => f.write_str("cannot power the audio circuit"),
        }
    }
}

/// Park the firmware after a fatal boot error.
///
/// `signal` is called forever with a fault marker (the serial console on
/// hardware). Only an external reset gets out of here.
pub fn halt_forever<F: FnMut(&str)>(err: BootError, mut signal: F) -> ! {
    log::error!("fatal: {}", err);
    loop {
        signal("\r\nFAULT\r\n");
        core::hint::spin_loop();
    }
}

// ── Boot plan ──────────────────────────────────────────────────────────────

/// Radio operating mode at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiMode {
    Off,
    Station,
    SoftAp,
    StationAndSoftAp,
}

impl WifiMode {
    /// Decode the SDK's numeric operating mode.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => WifiMode::Station,
            2 => WifiMode::SoftAp,
            3 => WifiMode::StationAndSoftAp,
            _ => WifiMode::Off,
        }
    }
}

/// The platform's UDP server for the override channel.
pub trait OverrideServer {
    type Error: fmt::Debug;

    fn bind(&mut self, port: u16) -> Result<(), Self::Error>;
}

/// Everything the running firmware needs after a successful boot.
#[derive(Debug)]
pub struct Booted {
    pub ctx: ProcContext,
    pub scheduler: TaskScheduler,
    pub size_map: u8,
    pub reset_cause: ResetCause,
}

/// Bring the core up.
///
/// Only a pure station waits for the network before sampling; every other
/// mode arms the gate immediately.
pub fn boot<R, A, O, P, T>(
    registrar: &mut R,
    audio_power: &mut A,
    server: &mut O,
    wifi: WifiMode,
    power: &P,
    timer: &mut T,
) -> Result<Booted, BootError>
where
    R: PartitionRegistrar + ?Sized,
    A: OutputPin,
    O: OverrideServer + ?Sized,
    P: PowerControl + ?Sized,
    T: SamplingTimer + ?Sized,
{
    let size_map = register_partitions(registrar)?;

    audio_power.set_high().map_err(|e| {
        log::error!("audio power pin: {:?}", e);
        BootError::AudioPower
    })?;

    server.bind(OVERRIDE_UDP_PORT).map_err(|e| {
        log::error!("override server bind: {:?}", e);
        BootError::OverrideSocket
    })?;

    let reset_cause = power.reset_cause();
    log::info!("reset cause: {:?}", reset_cause);

    let mut ctx = if wifi == WifiMode::Station {
        log::info!("station mode: sampling held until an address is acquired");
        ProcContext::new(DeferredStart::pending())
    } else {
        ProcContext::new(DeferredStart::idle())
    };
    if !ctx.deferred.is_pending() {
        ctx.gate.arm(timer);
    }

    let mut scheduler = TaskScheduler::new();
    scheduler.post(TaskEvent::IDLE);

    Ok(Booted {
        ctx,
        scheduler,
        size_map,
        reset_cause,
    })
}
