//! # Flow Configuration

use std::time::Duration;

/// Tunables shared by the flow machines.
#[derive(Clone, Debug)]
pub struct FlowConfig {
    /// Confirmation-wait interval after which a flow raises its `stalled`
    /// advisory. Advisory only; the underlying request is never cancelled.
    pub stall_after: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            stall_after: Duration::from_secs(30),
        }
    }
}

impl FlowConfig {
    /// Create a config for testing (short advisory interval).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            stall_after: Duration::from_millis(25),
        }
    }
}
