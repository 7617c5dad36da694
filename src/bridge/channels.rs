//! Bridge channel management.
//!
//! Connections report into the bridge through one event channel; the
//! bridge reports to its observer through one log channel.

use tokio::sync::mpsc;

use crate::common::{BridgeEvent, LogEvent};

/// Channels owned by the bridge.
pub struct BridgeChannels {
    /// Cloned into every connection the bridge starts.
    pub events_tx: mpsc::UnboundedSender<BridgeEvent>,
    /// Observer log stream.
    pub log_tx: mpsc::UnboundedSender<LogEvent>,
}

/// Channels held by whoever drives the bridge.
pub struct DriverChannels {
    /// Connection events to feed back into `Bridge::handle_event`.
    pub events_rx: mpsc::UnboundedReceiver<BridgeEvent>,
    /// Log lines, oldest first.
    pub log_rx: mpsc::UnboundedReceiver<LogEvent>,
}

/// Bundle of all channels for one bridge instance.
pub struct ChannelBundle {
    pub bridge: BridgeChannels,
    pub driver: DriverChannels,
}

impl ChannelBundle {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (log_tx, log_rx) = mpsc::unbounded_channel();

        Self {
            bridge: BridgeChannels { events_tx, log_tx },
            driver: DriverChannels { events_rx, log_rx },
        }
    }
}

impl Default for ChannelBundle {
    fn default() -> Self {
        Self::new()
    }
}
