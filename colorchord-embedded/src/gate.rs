//! Pause/resume arbitration of the high-rate sampling timer.
//!
//! Sampling is only useful while the visualization pipeline is active, and
//! its interrupt load disturbs the radio. The gate follows the externally
//! toggled activity flag and touches the timer only on flag *transitions*.
//!
//! The timer must not run before the network is up, so the gate starts
//! disarmed: it keeps tracking the flag but issues no hardware calls until
//! [`ResourceGate::arm`] is called. The first time the gate wants the timer
//! running after arming it issues the one-time `start`; later transitions
//! use `pause` / `resume`.

/// The hardware sampling timer and its interrupt.
pub trait SamplingTimer {
    /// Configure and enable the timer. Called at most once.
    fn start(&mut self);

    /// Disable the timer interrupt.
    fn pause(&mut self);

    /// Re-enable the timer interrupt after [`pause`](Self::pause).
    fn resume(&mut self);
}

/// The gate's view of the activity flag at its last observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// The pipeline is active; the timer may interrupt.
    Running,
    /// The pipeline is inactive; the timer is held off.
    Paused,
}

/// What has actually been requested from the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hardware {
    Stopped,
    Running,
    Paused,
}

/// Two-state controller over a [`SamplingTimer`].
#[derive(Debug)]
pub struct ResourceGate {
    state: GateState,
    armed: bool,
    hw: Hardware,
}

impl ResourceGate {
    /// A disarmed gate that has not observed the flag yet.
    pub const fn new() -> Self {
        ResourceGate {
            state: GateState::Paused,
            armed: false,
            hw: Hardware::Stopped,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether the timer is currently started and not paused.
    pub fn is_sampling(&self) -> bool {
        self.hw == Hardware::Running
    }

    /// Observe the activity flag.
    ///
    /// Returns the new state when the flag changed since the last
    /// observation, `None` otherwise. An unchanged flag never reaches the
    /// hardware.
    pub fn evaluate<T: SamplingTimer + ?Sized>(&mut self, active: bool, timer: &mut T) -> Option<GateState> {
        let desired = if active { GateState::Running } else { GateState::Paused };
        if desired == self.state {
            return None;
        }

        self.state = desired;
        log::debug!("sampling gate -> {:?}", desired);
        if self.armed {
            self.sync(timer);
        }
        Some(desired)
    }

    /// Allow the gate to drive the timer.
    ///
    /// Returns `true` when arming started the timer, which happens if the
    /// last observed flag was active. Arming twice is a no-op.
    pub fn arm<T: SamplingTimer + ?Sized>(&mut self, timer: &mut T) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        let before = self.hw;
        self.sync(timer);
        before != self.hw && self.hw == Hardware::Running
    }

    /// Bring the timer in line with `state`.
    fn sync<T: SamplingTimer + ?Sized>(&mut self, timer: &mut T) {
        self.hw = match (self.state, self.hw) {
            (GateState::Running, Hardware::Stopped) => {
                timer.start();
                Hardware::Running
            }
            (GateState::Running, Hardware::Paused) => {
                timer.resume();
                Hardware::Running
            }
            (GateState::Paused, Hardware::Running) => {
                timer.pause();
                Hardware::Paused
            }
            (_, hw) => hw,
        };
    }
}

impl Default for ResourceGate {
    fn default() -> Self {
        Self::new()
    }
}
