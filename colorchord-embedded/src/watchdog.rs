//! The 100 ms software watchdog.
//!
//! Runs independently of the processing task, in the same cooperative
//! context. Each firing:
//!
//! 1. forwards a [`TickKind::Timed`] tick to the service layer,
//! 2. turns a held boot button into deep sleep or restart,
//! 3. arms the sampling gate once the network has an address (one-shot),
//! 4. reports sample-ring overruns seen since the previous firing.

use embedded_hal::digital::InputPin;

use crate::control::{CommonServices, TickKind};
use crate::gate::SamplingTimer;
use crate::io::SampleSource;
use crate::power::{self, PowerAction, PowerControl};
use crate::scheduler::ProcContext;

/// One-shot flag that holds sampling off until the network is up.
///
/// Acquiring an address while the high-rate timer interrupt is active is
/// unstable on the target, so the first start waits for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeferredStart {
    pending: bool,
}

impl DeferredStart {
    /// A flag that is already clear.
    pub const fn idle() -> Self {
        DeferredStart { pending: false }
    }

    /// A flag waiting for the network.
    pub const fn pending() -> Self {
        DeferredStart { pending: true }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns `true` exactly once: the first call made while pending with
    /// `network_ready` set. The flag stays clear afterwards.
    pub fn poll(&mut self, network_ready: bool) -> bool {
        if self.pending && network_ready {
            self.pending = false;
            true
        } else {
            false
        }
    }
}

/// What one watchdog firing did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogOutcome {
    pub power: PowerAction,
    /// The deferred start fired on this tick.
    pub deferred_start: bool,
}

/// Periodic housekeeping driven by a 100 ms platform timer.
pub struct WatchdogTimer<B> {
    button: B,
    seen_overruns: u32,
}

impl<B: InputPin> WatchdogTimer<B> {
    /// `button` reads low while the boot button is pressed.
    pub fn new(button: B) -> Self {
        WatchdogTimer {
            button,
            seen_overruns: 0,
        }
    }

    pub fn fire<C, T, S, P>(
        &mut self,
        ctx: &mut ProcContext,
        services: &mut C,
        timer: &mut T,
        source: &S,
        power: &mut P,
    ) -> WatchdogOutcome
    where
        C: CommonServices + ?Sized,
        T: SamplingTimer + ?Sized,
        S: SampleSource + ?Sized,
        P: PowerControl + ?Sized,
    {
        services.tick(TickKind::Timed);

        let pressed = match self.button.is_low() {
            Ok(low) => low,
            Err(e) => {
                log::warn!("boot button read failed: {:?}", e);
                false
            }
        };
        let action = power::boot_button_action(pressed, power.reset_cause());
        power::apply(action, power);

        let deferred_start = ctx.deferred.poll(services.has_ip());
        if deferred_start {
            let started = ctx.gate.arm(timer);
            log::info!("network up: sampling armed (timer started: {})", started);
        }

        let overruns = source.overruns();
        if overruns != self.seen_overruns {
            log::warn!(
                "sample ring overran: {} samples dropped since last tick",
                overruns.wrapping_sub(self.seen_overruns)
            );
            self.seen_overruns = overruns;
        }

        WatchdogOutcome {
            power: action,
            deferred_start,
        }
    }

    /// Release the button pin.
    pub fn free(self) -> B {
        self.button
    }
}
