//! Bridge lifecycle state.
//!
//! Idle -> Starting -> Running -> Closing -> Stopped. Stopped is terminal;
//! resuming means building a new bridge.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Idle,
    Starting,
    Running,
    Closing,
    Stopped,
}

impl BridgePhase {
    /// Connections exist and the health check may reconnect.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    /// Observer output and event handling are suppressed.
    pub fn is_stopped(self) -> bool {
        self == Self::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_phases() {
        assert!(!BridgePhase::Idle.is_live());
        assert!(BridgePhase::Starting.is_live());
        assert!(BridgePhase::Running.is_live());
        assert!(!BridgePhase::Closing.is_live());
        assert!(!BridgePhase::Stopped.is_live());
        assert!(BridgePhase::Stopped.is_stopped());
    }
}
