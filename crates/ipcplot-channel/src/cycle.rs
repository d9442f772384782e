use std::fmt;

use tracing::debug;

/// Which top-level operation a cycle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    Retrieve,
    Status,
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retrieve => f.write_str("retrieve"),
            Self::Status => f.write_str("status"),
        }
    }
}

/// Lifecycle of one channel cycle.
///
/// ```text
/// Idle → Connecting ⇄ Retrying
///          │
///          ├─→ Transferring → Completed
///          │        │
///          └────────┴─→ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Connecting,
    Retrying,
    Transferring,
    Completed,
    Failed,
}

impl CycleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_advance_to(self, next: Self) -> bool {
        use CycleState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Retrying)
                | (Retrying, Connecting)
                | (Connecting, Transferring)
                | (Connecting, Failed)
                | (Transferring, Completed)
                | (Transferring, Failed)
        )
    }
}

/// Tracks one cycle's state and connect attempts.
#[derive(Debug)]
pub(crate) struct Cycle {
    kind: CycleKind,
    state: CycleState,
    attempts: u32,
}

impl Cycle {
    pub(crate) fn new(kind: CycleKind) -> Self {
        Self {
            kind,
            state: CycleState::Idle,
            attempts: 0,
        }
    }

    pub(crate) fn state(&self) -> CycleState {
        self.state
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn advance(&mut self, next: CycleState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid cycle transition {:?} -> {:?}",
            self.state,
            next
        );
        if next == CycleState::Connecting {
            self.attempts = self.attempts.saturating_add(1);
        }
        debug!(
            cycle = %self.kind,
            from = ?self.state,
            to = ?next,
            attempt = self.attempts,
            "cycle transition"
        );
        self.state = next;
    }
}
