//! Orchestrator settings.

use std::time::Duration;

use crate::keyboard::KeyCombo;
use crate::waiter::WaitPolicy;

/// Runtime behavior of an [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// How long a step may wait for its element before the wait is
    /// abandoned.
    pub wait_policy: WaitPolicy,
    /// Key combination that resets every tour.
    pub reset_shortcut: KeyCombo,
}

impl OrchestratorConfig {
    /// Wait timeout in milliseconds; `0` means wait indefinitely.
    pub fn with_wait_timeout_ms(mut self, millis: u64) -> Self {
        self.wait_policy = if millis == 0 {
            WaitPolicy::Indefinite
        } else {
            WaitPolicy::Timeout(Duration::from_millis(millis))
        };
        self
    }
}
