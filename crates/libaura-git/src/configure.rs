//! Identity and remote configuration
//!
//! Runs before any commit or push. Every step is idempotent so it can be
//! repeated on each run.

use git2::{ConfigLevel, ErrorCode, Repository};
use libaura_core::{Identity, RemoteDescriptor};
use tracing::{debug, info};

use crate::SyncError;

/// What reconciliation did to the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteAction {
    Created,
    Updated,
}

/// Write `user.name` / `user.email` to the repository's local config
pub fn set_identity(repo: &Repository, identity: &Identity) -> Result<(), SyncError> {
    identity.validate()?;
    let mut config = repo.config()?.open_level(ConfigLevel::Local)?;
    config.set_str("user.name", &identity.name)?;
    config.set_str("user.email", &identity.email)?;
    debug!(name = %identity.name, "committer identity set");
    Ok(())
}

/// Make sure exactly one remote with the descriptor's name exists and
/// points at the current authenticated URL.
///
/// An existing remote has its URL rewritten in place, so there is never a
/// window without a remote. A separate push URL would bypass the rotated
/// credential, so it is removed.
pub fn reconcile_remote(
    repo: &Repository,
    remote: &RemoteDescriptor,
) -> Result<RemoteAction, SyncError> {
    reconcile_remote_impl(repo, remote).map_err(|e| e.redact(remote.credential()))
}

fn reconcile_remote_impl(
    repo: &Repository,
    remote: &RemoteDescriptor,
) -> Result<RemoteAction, SyncError> {
    remote.validate()?;

    let remotes = repo.remotes()?;
    let exists = remotes.iter().flatten().any(|name| name == remote.name);
    let url = remote.full_url();

    let action = if exists {
        repo.remote_set_url(&remote.name, &url)?;
        if repo.find_remote(&remote.name)?.pushurl().is_some() {
            repo.remote_set_pushurl(&remote.name, None)?;
        }
        RemoteAction::Updated
    } else {
        repo.remote(&remote.name, &url)?;
        RemoteAction::Created
    };

    info!(remote = %remote.redacted_url(), ?action, "remote configured");
    Ok(action)
}

/// Attach an unborn HEAD to `refs/heads/<branch>` so the first commit lands
/// on the target branch. A HEAD that already has commits is left alone.
pub fn ensure_branch(repo: &Repository, branch: &str) -> Result<(), SyncError> {
    match repo.head() {
        Ok(_) => Ok(()),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            repo.set_head(&format!("refs/heads/{}", branch))?;
            debug!(branch, "unborn HEAD attached to branch");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
