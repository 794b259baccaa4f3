use crate::error::ApprovalError;
use crate::planner::Plan;
use crate::tools::Script;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// A single command proposed by the assistant, with a line explaining it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub summary: String,
    pub command: String,
}

impl ParsedCommand {
    pub fn new(summary: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            command: command.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Plan,
    Command,
    Script,
}

impl PendingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Command => "command",
            Self::Script => "script",
        }
    }
}

/// Something waiting for the user's go-ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Plan(Plan),
    Command(ParsedCommand),
    Script(Script),
}

impl PendingAction {
    pub fn kind(&self) -> PendingKind {
        match self {
            Self::Plan(_) => PendingKind::Plan,
            Self::Command(_) => PendingKind::Command,
            Self::Script(_) => PendingKind::Script,
        }
    }
}

/// Holds at most one pending action. A new proposal replaces the old one.
///
/// The lock is only held for the swap itself; callers execute what they
/// took after it has been released.
#[derive(Default)]
pub struct ApprovalGate {
    slot: Mutex<Option<PendingAction>>,
}

impl ApprovalGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `action`, returning whatever it displaced.
    pub fn propose(&self, action: PendingAction) -> Option<PendingAction> {
        let kind = action.kind();
        let displaced = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(action);
        if let Some(old) = &displaced {
            tracing::info!(
                pending = kind.as_str(),
                replaced = old.kind().as_str(),
                "pending action replaced"
            );
        } else {
            tracing::debug!(pending = kind.as_str(), "action proposed");
        }
        displaced
    }

    /// Take the pending action, whatever it is.
    pub fn take_any(&self) -> Result<PendingAction, ApprovalError> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ApprovalError::NothingPending)
    }

    /// Take the pending action only if it is of `kind`. On a mismatch the
    /// slot is left as it was.
    pub fn take(&self, kind: PendingKind) -> Result<PendingAction, ApprovalError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref().map(PendingAction::kind) {
            None => Err(ApprovalError::NothingPending),
            Some(pending) if pending != kind => Err(ApprovalError::KindMismatch {
                pending: pending.as_str(),
                requested: kind.as_str(),
            }),
            Some(_) => slot.take().ok_or(ApprovalError::NothingPending),
        }
    }

    pub fn peek(&self) -> Option<PendingAction> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the pending action without running it.
    pub fn clear(&self) -> Option<PendingAction> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}
