//! Reset-cause tracking and the boot-button sleep/restart decision.

use crate::constants::DEEP_SLEEP_MS;

/// Why the chip last came out of reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCause {
    PowerOn,
    HardwareWatchdog,
    Exception,
    SoftwareWatchdog,
    SoftwareRestart,
    DeepSleepWake,
    External,
    Unknown(u32),
}

impl ResetCause {
    /// Decode the SDK's numeric reset reason.
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => ResetCause::PowerOn,
            1 => ResetCause::HardwareWatchdog,
            2 => ResetCause::Exception,
            3 => ResetCause::SoftwareWatchdog,
            4 => ResetCause::SoftwareRestart,
            5 => ResetCause::DeepSleepWake,
            6 => ResetCause::External,
            other => ResetCause::Unknown(other),
        }
    }
}

/// Radio state after waking from deep sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeRadio {
    /// Boot with the radio powered off entirely.
    Disabled,
    /// Boot with RF calibration and the radio on.
    Calibrated,
}

/// What the watchdog decided to do about the power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    None,
    DeepSleep { ms: u32, radio: WakeRadio },
    Restart,
}

/// Power management primitives of the platform.
///
/// On hardware `deep_sleep` and `restart` never return; test doubles may.
pub trait PowerControl {
    fn reset_cause(&self) -> ResetCause;

    /// Sleep for `ms` milliseconds, then reset with the given radio state.
    fn deep_sleep(&mut self, ms: u32, radio: WakeRadio);

    /// Full software restart.
    fn restart(&mut self);
}

/// Decide what a held boot button means.
///
/// The first press puts the chip into a short deep sleep with the radio off
/// on wake. If the button is still held when the chip wakes from that sleep,
/// a plain restart breaks what would otherwise be an endless sleep loop.
pub const fn boot_button_action(pressed: bool, cause: ResetCause) -> PowerAction {
    if !pressed {
        return PowerAction::None;
    }
    match cause {
        ResetCause::DeepSleepWake => PowerAction::Restart,
        _ => PowerAction::DeepSleep {
            ms: DEEP_SLEEP_MS,
            radio: WakeRadio::Disabled,
        },
    }
}

/// Carry out `action` on the platform.
pub fn apply<P: PowerControl + ?Sized>(action: PowerAction, power: &mut P) {
    match action {
        PowerAction::None => {}
        PowerAction::DeepSleep { ms, radio } => {
            log::info!("boot button held: deep sleep for {} ms, radio {:?} on wake", ms, radio);
            power.deep_sleep(ms, radio);
        }
        PowerAction::Restart => {
            log::info!("boot button still held after deep-sleep wake: restarting");
            power.restart();
        }
    }
}
