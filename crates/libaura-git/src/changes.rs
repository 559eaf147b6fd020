//! Change detection
//!
//! Stages according to the policy's scope, then classifies the working
//! tree against HEAD. Status is always computed fresh.

use std::path::{Path, PathBuf};

use git2::{IndexAddOption, Repository, Status, StatusOptions};
use libaura_core::StagingScope;
use tracing::debug;

use crate::SyncError;

/// Paths that differ from HEAD and will go into the next commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Staged paths, relative to the repository root
    pub staged: Vec<PathBuf>,
    /// Relevant paths still showing working-tree changes after staging
    pub unstaged: Vec<PathBuf>,
}

impl ChangeSet {
    pub fn has_changes(&self) -> bool {
        !self.staged.is_empty() || !self.unstaged.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_changes()
    }
}

const INDEX_CHANGES: Status = Status::INDEX_NEW
    .union(Status::INDEX_MODIFIED)
    .union(Status::INDEX_DELETED)
    .union(Status::INDEX_RENAMED)
    .union(Status::INDEX_TYPECHANGE);

const WORKTREE_CHANGES: Status = Status::WT_NEW
    .union(Status::WT_MODIFIED)
    .union(Status::WT_DELETED)
    .union(Status::WT_RENAMED)
    .union(Status::WT_TYPECHANGE);

/// Stage per scope: just the artifact (narrow) or the whole tree (broad)
pub fn stage(repo: &Repository, scope: StagingScope, artifact: &Path) -> Result<(), SyncError> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| SyncError::NotARepo("repository has no working tree".to_string()))?;
    let mut index = repo.index()?;

    match scope {
        StagingScope::Narrow => {
            if workdir.join(artifact).exists() {
                index.add_path(artifact)?;
            } else if index.get_path(artifact, 0).is_some() {
                index.remove_path(artifact)?;
            }
        }
        StagingScope::Broad => {
            index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
            index.update_all(["*"].iter(), None)?;
        }
    }

    index.write()?;
    Ok(())
}

/// Stage and classify. A brand-new artifact counts as a change under both
/// scopes.
pub fn detect_changes(
    repo: &Repository,
    scope: StagingScope,
    artifact: &Path,
) -> Result<ChangeSet, SyncError> {
    stage(repo, scope, artifact)?;

    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);
    if scope == StagingScope::Narrow {
        opts.pathspec(artifact).disable_pathspec_match(true);
    }

    let statuses = repo.statuses(Some(&mut opts))?;
    let mut changes = ChangeSet::default();

    for entry in statuses.iter() {
        let status = entry.status();
        let Some(path) = entry.path() else { continue };
        let path = PathBuf::from(path);
        if scope == StagingScope::Narrow && path != artifact {
            continue;
        }
        if status.intersects(INDEX_CHANGES) {
            changes.staged.push(path);
        } else if status.intersects(WORKTREE_CHANGES) {
            changes.unstaged.push(path);
        }
    }

    debug!(
        scope = %scope,
        staged = changes.staged.len(),
        unstaged = changes.unstaged.len(),
        "working tree classified"
    );
    Ok(changes)
}
