//! Git sync engine for Aura
//!
//! This crate owns the working copy for one run:
//! - Committer identity and `origin` remote reconciliation
//! - Change detection under a narrow or broad staging scope
//! - Conditional commit with an explicit no-op outcome
//! - Cooperative (fast-forward) or authoritative (force) push
//! - The one-shot workflow: provider, log writer, sync

mod changes;
mod configure;
mod engine;
mod error;
mod push;
mod workflow;

pub use changes::{ChangeSet, detect_changes, stage};
pub use configure::{ensure_branch, reconcile_remote, set_identity, RemoteAction};
pub use engine::{CommitOutcome, SyncEngine, SyncOutcome};
pub use error::SyncError;
pub use push::push_branch;
pub use workflow::{RunReport, Workflow};
