//! Shared types used across the application.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle state of a single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ConnectionState {
    #[default]
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Closing = 3,
}

impl ConnectionState {
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::Closing,
            _ => Self::Disconnected,
        }
    }

    pub fn to_id(self) -> u8 {
        self as u8
    }
}

/// Connection state cell shared between a connection's worker task and
/// whoever polls its status.
#[derive(Debug, Clone, Default)]
pub struct SharedConnectionState(Arc<AtomicU8>);

impl SharedConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self(Arc::new(AtomicU8::new(state.to_id())))
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_id(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: ConnectionState) {
        self.0.store(state.to_id(), Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        let state = SharedConnectionState::default();
        assert_eq!(state.get(), ConnectionState::Disconnected);
        assert!(!state.is_connected());
    }

    #[test]
    fn test_clones_share_the_cell() {
        let state = SharedConnectionState::new(ConnectionState::Connecting);
        let worker_view = state.clone();
        worker_view.set(ConnectionState::Connected);
        assert!(state.is_connected());
        assert_eq!(state.get(), ConnectionState::Connected);
    }

    #[test]
    fn test_unknown_id_maps_to_disconnected() {
        assert_eq!(ConnectionState::from_id(42), ConnectionState::Disconnected);
        assert_eq!(ConnectionState::from_id(3), ConnectionState::Closing);
    }
}
