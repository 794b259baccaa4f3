pub mod allowlist;
pub mod approval;

pub use allowlist::{Allowlist, AllowlistStore, ConfigAllowlistStore};
pub use approval::{ApprovalGate, ParsedCommand, PendingAction, PendingKind};
