//! Sync engine
//!
//! Owns the repository handle for one run and drives
//! configure -> detect -> commit -> push. Every error leaving a public
//! method has the remote credential scrubbed.

use std::path::{Path, PathBuf};

use git2::{Commit, ErrorCode, Oid, Repository};
use libaura_core::log::DEFAULT_LOG_FILE;
use libaura_core::{Identity, PushMode, RemoteDescriptor, SyncPolicy};
use tracing::info;

use crate::changes::{detect_changes, ChangeSet};
use crate::configure::{ensure_branch, reconcile_remote, set_identity, RemoteAction};
use crate::push::push_branch;
use crate::SyncError;

/// Result of the commit step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Created(Oid),
    /// The index matched HEAD; nothing was committed
    NoOp,
}

/// Terminal state of a successful sync. Failure is the `Err` arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing changed; no commit and no network I/O
    Skipped,
    /// The remote branch now points at the local tip
    Pushed {
        /// The commit created this run, if any
        commit: Option<Oid>,
        forced: bool,
    },
}

/// Sync engine for one working copy
pub struct SyncEngine {
    repo: Repository,
    identity: Identity,
    remote: RemoteDescriptor,
    policy: SyncPolicy,
    agent: String,
    artifact: PathBuf,
}

impl SyncEngine {
    /// Open the repository at `repo_path`
    pub fn new(
        repo_path: &Path,
        identity: Identity,
        remote: RemoteDescriptor,
        policy: SyncPolicy,
    ) -> Result<Self, SyncError> {
        let repo = Repository::open(repo_path)
            .map_err(|e| SyncError::NotARepo(format!("{}: {}", repo_path.display(), e.message())))?;
        if repo.is_bare() {
            return Err(SyncError::NotARepo(format!(
                "{} is a bare repository",
                repo_path.display()
            )));
        }
        Ok(Self {
            repo,
            identity,
            remote,
            policy,
            agent: libaura_core::config::DEFAULT_AGENT_NAME.to_string(),
            artifact: PathBuf::from(DEFAULT_LOG_FILE),
        })
    }

    /// Agent name substituted into the commit message
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    /// Log artifact path, relative to the repository root
    pub fn with_artifact(mut self, artifact: impl Into<PathBuf>) -> Self {
        self.artifact = artifact.into();
        self
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    pub fn remote(&self) -> &RemoteDescriptor {
        &self.remote
    }

    /// Repository root
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn scrub(&self, e: SyncError) -> SyncError {
        e.redact(self.remote.credential())
    }

    /// Check identity and credential without touching the repository
    pub fn preflight(&self) -> Result<(), SyncError> {
        self.identity.validate()?;
        self.remote.validate()?;
        Ok(())
    }

    /// Apply identity, remote and branch configuration
    pub fn configure(&self) -> Result<RemoteAction, SyncError> {
        self.configure_impl().map_err(|e| self.scrub(e))
    }

    fn configure_impl(&self) -> Result<RemoteAction, SyncError> {
        self.preflight()?;
        set_identity(&self.repo, &self.identity)?;
        let action = reconcile_remote(&self.repo, &self.remote)?;
        ensure_branch(&self.repo, &self.policy.branch)?;
        Ok(action)
    }

    /// Stage per policy and report what changed
    pub fn detect_changes(&self) -> Result<ChangeSet, SyncError> {
        detect_changes(&self.repo, self.policy.staging_scope, &self.artifact)
            .map_err(|e| self.scrub(e))
    }

    /// Commit the staged index. An index identical to HEAD is a no-op.
    pub fn commit(&self, changes: &ChangeSet) -> Result<CommitOutcome, SyncError> {
        self.commit_impl(changes).map_err(|e| self.scrub(e))
    }

    fn commit_impl(&self, changes: &ChangeSet) -> Result<CommitOutcome, SyncError> {
        if changes.is_empty() {
            return Ok(CommitOutcome::NoOp);
        }

        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;
        let parent = self.head_commit()?;

        let unchanged = match &parent {
            Some(p) => p.tree_id() == tree_oid,
            None => index.is_empty(),
        };
        if unchanged {
            info!("[GIT] No new changes to commit");
            return Ok(CommitOutcome::NoOp);
        }

        let tree = self.repo.find_tree(tree_oid)?;
        let sig = self.repo.signature()?;
        let message = self.policy.render_message(&self.agent);
        let parents: Vec<&Commit> = parent.iter().collect();
        let oid = self.repo.commit(Some("HEAD"), &sig, &sig, &message, &tree, &parents)?;

        info!(commit = %oid, paths = changes.staged.len(), "[GIT] commit created");
        Ok(CommitOutcome::Created(oid))
    }

    /// Push the local branch to the policy's target branch using `mode`
    pub fn push(&self, mode: PushMode) -> Result<(), SyncError> {
        self.push_impl(mode).map_err(|e| self.scrub(e))
    }

    fn push_impl(&self, mode: PushMode) -> Result<(), SyncError> {
        let local_ref = self.head_ref_name()?;
        push_branch(&self.repo, &self.remote, &local_ref, &self.policy.branch, mode)
    }

    /// Full run: configure, detect, commit, push
    pub fn sync(&self) -> Result<SyncOutcome, SyncError> {
        self.sync_impl().map_err(|e| self.scrub(e))
    }

    fn sync_impl(&self) -> Result<SyncOutcome, SyncError> {
        self.configure_impl()?;

        let changes = detect_changes(&self.repo, self.policy.staging_scope, &self.artifact)?;
        let commit = if changes.has_changes() {
            info!(paths = changes.staged.len(), "[GIT] Modification detected. Preparing commit...");
            self.commit_impl(&changes)?
        } else {
            CommitOutcome::NoOp
        };

        let forced = self.policy.push_mode == PushMode::Authoritative;
        let created = match commit {
            CommitOutcome::Created(oid) => Some(oid),
            CommitOutcome::NoOp => {
                let has_tip = self.head_commit()?.is_some();
                if !(self.policy.pushes_when_clean() && has_tip) {
                    info!("[IDLE] Workspace clean. No synchronization required.");
                    return Ok(SyncOutcome::Skipped);
                }
                None
            }
        };

        self.push_impl(self.policy.push_mode)?;
        info!("[SUCCESS] Repository synchronization complete.");
        Ok(SyncOutcome::Pushed { commit: created, forced })
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>, SyncError> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Full name of the branch HEAD points at
    fn head_ref_name(&self) -> Result<String, SyncError> {
        let head = self.repo.find_reference("HEAD")?;
        head.symbolic_target().map(str::to_string).ok_or_else(|| {
            SyncError::Git("HEAD is detached; cannot choose a branch to push".to_string())
        })
    }
}
