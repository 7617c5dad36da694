//! Acknowledgment debouncing.
//!
//! At most one "Sent to Lumia" reply is posted per gate interval. Commands
//! arriving inside the gate are only counted, and the count rides along on
//! the next reply that gets through. There is no flush timer: a burst
//! followed by silence is never reported on its own.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Default minimum interval between two acknowledgments.
pub const DEFAULT_ACK_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct AckDebouncer {
    gate: chrono::Duration,
    last_sent: Option<DateTime<Utc>>,
    suppressed: u32,
}

impl AckDebouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            gate: chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::days(36_500)),
            last_sent: None,
            suppressed: 0,
        }
    }

    /// Register a relayed command; returns the acknowledgment to post, if any.
    pub fn register(&mut self, original: &str, at: DateTime<Utc>) -> Option<String> {
        let gate_open = match self.last_sent {
            None => true,
            Some(last) => at.signed_duration_since(last) >= self.gate,
        };

        if !gate_open {
            self.suppressed = self.suppressed.saturating_add(1);
            return None;
        }

        let mut ack = format!("Sent to Lumia: {}", original);
        if self.suppressed > 0 {
            ack.push_str(&format!("  - and {} others", self.suppressed));
        }
        self.suppressed = 0;
        self.last_sent = Some(at);
        Some(ack)
    }

    /// Commands folded since the last acknowledgment.
    pub fn suppressed(&self) -> u32 {
        self.suppressed
    }
}

impl Default for AckDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_ACK_INTERVAL)
    }
}
