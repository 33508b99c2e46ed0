/// Which cadence a service tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// Delivered by the processing task whenever it ran from an idle self-post.
    Idle,
    /// Delivered by the 100 ms watchdog timer.
    Timed,
}

/// The external command, configuration and network service layer.
pub trait CommonServices {
    /// Forward a tick so the service layer can run its own housekeeping.
    fn tick(&mut self, kind: TickKind);

    /// Whether the station interface has acquired an IP address.
    fn has_ip(&self) -> bool;
}
