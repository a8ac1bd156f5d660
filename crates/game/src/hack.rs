//! Handoff to the external "hack" minigame that gates walker takeover.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HackOutcome {
    Pending,
    Succeeded,
    Failed,
}

/// Shared result slot. The scene keeps one clone and polls it each frame;
/// the minigame keeps the other and resolves it once.
#[derive(Debug, Clone)]
pub struct HackTicket {
    outcome: Rc<Cell<HackOutcome>>,
}

impl Default for HackTicket {
    fn default() -> Self {
        Self::new()
    }
}

impl HackTicket {
    pub fn new() -> Self {
        Self {
            outcome: Rc::new(Cell::new(HackOutcome::Pending)),
        }
    }

    pub fn outcome(&self) -> HackOutcome {
        self.outcome.get()
    }

    pub fn is_pending(&self) -> bool {
        self.outcome() == HackOutcome::Pending
    }

    /// Record the minigame result. Later calls are ignored.
    pub fn resolve(&self, success: bool) {
        if self.is_pending() {
            self.outcome.set(if success {
                HackOutcome::Succeeded
            } else {
                HackOutcome::Failed
            });
        }
    }
}
