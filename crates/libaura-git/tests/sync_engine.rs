//! Integration tests for the sync engine against local bare remotes

use std::path::Path;

use git2::{Oid, Repository, Signature};
use libaura_core::log::DEFAULT_LOG_FILE;
use libaura_core::{
    Identity, LogWriter, ProviderPolicy, PushMode, RemoteDescriptor, StagingScope, StaticProvider,
    SyncPolicy,
};
use libaura_git::{RemoteAction, SyncEngine, SyncError, SyncOutcome, Workflow};
use tempfile::{tempdir, TempDir};

const OWNER: &str = "Priom-Das";
const REPO: &str = "Project---Aura";

struct Fixture {
    _work: TempDir,
    _remotes: TempDir,
    work_path: std::path::PathBuf,
    remote: RemoteDescriptor,
}

impl Fixture {
    fn new() -> Self {
        let work = tempdir().unwrap();
        let remotes = tempdir().unwrap();
        Repository::init(work.path()).unwrap();

        let remote = RemoteDescriptor::local(remotes.path(), OWNER, REPO, "ghp_local_token");
        Repository::init_bare(remote.local_path().unwrap()).unwrap();

        Self {
            work_path: work.path().to_path_buf(),
            _work: work,
            _remotes: remotes,
            remote,
        }
    }

    fn engine(&self, policy: SyncPolicy) -> SyncEngine {
        SyncEngine::new(&self.work_path, Identity::default(), self.remote.clone(), policy).unwrap()
    }

    fn bare(&self) -> Repository {
        Repository::open_bare(self.remote.local_path().unwrap()).unwrap()
    }

    fn remote_main(&self) -> Option<Oid> {
        self.bare().refname_to_id("refs/heads/main").ok()
    }

    fn local_head(&self) -> Oid {
        Repository::open(&self.work_path)
            .unwrap()
            .head()
            .unwrap()
            .target()
            .unwrap()
    }

    fn append(&self, line: &str) {
        LogWriter::new(self.work_path.join(DEFAULT_LOG_FILE))
            .append(&libaura_core::LogEntry::new("Aura", "Insight", line))
            .unwrap();
    }

    /// Another writer pushes a commit the engine has never seen
    fn advance_remote(&self) -> Oid {
        let bare = self.bare();
        let parent = bare
            .find_reference("refs/heads/main")
            .unwrap()
            .peel_to_commit()
            .unwrap();
        let mut builder = bare.treebuilder(Some(&parent.tree().unwrap())).unwrap();
        let blob = bare.blob(b"written elsewhere").unwrap();
        builder.insert("other.txt", blob, 0o100644).unwrap();
        let tree = bare.find_tree(builder.write().unwrap()).unwrap();
        let sig = Signature::now("Other", "other@example.com").unwrap();
        bare.commit(Some("refs/heads/main"), &sig, &sig, "remote-only", &tree, &[&parent])
            .unwrap()
    }
}

fn workflow(text: &str, work: &Path) -> Workflow {
    Workflow::new(
        Box::new(StaticProvider::new(text)),
        ProviderPolicy::Fatal,
        LogWriter::new(work.join(DEFAULT_LOG_FILE)),
        "Aura",
        "Insight",
        "prompt",
    )
}

#[test]
fn test_configure_is_idempotent() {
    let fx = Fixture::new();
    let engine = fx.engine(SyncPolicy::cooperative());

    assert_eq!(engine.configure().unwrap(), RemoteAction::Created);
    assert_eq!(engine.configure().unwrap(), RemoteAction::Updated);

    let repo = engine.repo();
    let remotes = repo.remotes().unwrap();
    assert_eq!(remotes.iter().flatten().collect::<Vec<_>>(), vec!["origin"]);
    let config = repo.config().unwrap();
    assert_eq!(config.get_string("user.name").unwrap(), "github-actions[bot]");
}

#[test]
fn test_end_to_end_two_runs() {
    let fx = Fixture::new();
    let engine = fx.engine(SyncPolicy::cooperative());
    let wf = workflow("Agent automated the push.", &fx.work_path);

    let first = wf.run_once(&engine).unwrap();
    let SyncOutcome::Pushed { commit: Some(c1), forced: false } = first.outcome else {
        panic!("unexpected outcome {:?}", first.outcome);
    };
    assert!(!first.used_fallback);

    let log = std::fs::read_to_string(fx.work_path.join(DEFAULT_LOG_FILE)).unwrap();
    assert!(log.starts_with("\n["));
    assert!(log.ends_with("] Aura Insight: Agent automated the push."));
    assert_eq!(log.matches('\n').count(), 1);
    assert_eq!(fx.remote_main(), Some(c1));

    // Same provider output: the appended line is still a change
    let second = wf.run_once(&engine).unwrap();
    let SyncOutcome::Pushed { commit: Some(c2), .. } = second.outcome else {
        panic!("unexpected outcome {:?}", second.outcome);
    };
    assert_ne!(c1, c2);
    assert_eq!(fx.remote_main(), Some(c2));

    let bare = fx.bare();
    let tip = bare.find_commit(c2).unwrap();
    assert_eq!(tip.parent_count(), 1);
    assert_eq!(tip.parent_id(0).unwrap(), c1);
}

#[test]
fn test_clean_tree_is_skipped() {
    for policy in [SyncPolicy::cooperative(), SyncPolicy::authoritative()] {
        let fx = Fixture::new();
        let engine = fx.engine(policy);
        fx.append("first");

        assert!(matches!(engine.sync().unwrap(), SyncOutcome::Pushed { .. }));
        let pushed = fx.remote_main();

        assert_eq!(engine.sync().unwrap(), SyncOutcome::Skipped);
        assert_eq!(fx.remote_main(), pushed);
    }
}

#[test]
fn test_cooperative_push_reports_divergence() {
    let fx = Fixture::new();
    let engine = fx.engine(SyncPolicy::cooperative());
    fx.append("first");
    engine.sync().unwrap();

    let remote_tip = fx.advance_remote();
    fx.append("second");

    let err = engine.sync().unwrap_err();
    assert!(matches!(err, SyncError::Divergence { .. }), "got {:?}", err);
    assert_eq!(err.exit_code(), 4);
    assert_eq!(fx.remote_main(), Some(remote_tip));
}

#[test]
fn test_authoritative_push_overwrites_divergence() {
    let fx = Fixture::new();
    let engine = fx.engine(SyncPolicy::authoritative());
    fx.append("first");
    engine.sync().unwrap();

    fx.advance_remote();
    fx.append("second");

    let outcome = engine.sync().unwrap();
    assert!(matches!(outcome, SyncOutcome::Pushed { forced: true, .. }));
    assert_eq!(fx.remote_main(), Some(fx.local_head()));
}

#[test]
fn test_explicit_push_mode_overrides_policy() {
    let fx = Fixture::new();
    let engine = fx.engine(SyncPolicy::cooperative());
    fx.append("first");
    engine.sync().unwrap();

    let remote_tip = fx.advance_remote();
    fx.append("second");
    assert!(matches!(engine.sync().unwrap_err(), SyncError::Divergence { .. }));

    let err = engine.push(PushMode::Cooperative).unwrap_err();
    assert!(matches!(err, SyncError::Divergence { .. }), "got {:?}", err);
    assert_eq!(fx.remote_main(), Some(remote_tip));

    engine.push(PushMode::Authoritative).unwrap();
    assert_eq!(fx.remote_main(), Some(fx.local_head()));
}

#[test]
fn test_push_when_clean_restores_remote() {
    let fx = Fixture::new();
    let mut policy = SyncPolicy::authoritative();
    policy.push_when_clean = true;
    let engine = fx.engine(policy);
    fx.append("first");
    engine.sync().unwrap();

    fx.advance_remote();

    let outcome = engine.sync().unwrap();
    assert_eq!(outcome, SyncOutcome::Pushed { commit: None, forced: true });
    assert_eq!(fx.remote_main(), Some(fx.local_head()));
}

#[test]
fn test_narrow_scope_commits_only_the_log() {
    let fx = Fixture::new();
    let engine = fx.engine(SyncPolicy::cooperative().with_staging(StagingScope::Narrow));
    std::fs::write(fx.work_path.join("scratch.txt"), "not for the remote").unwrap();
    fx.append("first");

    let SyncOutcome::Pushed { commit: Some(oid), .. } = engine.sync().unwrap() else {
        panic!("expected a push");
    };
    let bare = fx.bare();
    let tree = bare.find_commit(oid).unwrap().tree().unwrap();
    assert!(tree.get_name(DEFAULT_LOG_FILE).is_some());
    assert!(tree.get_name("scratch.txt").is_none());
}

#[test]
fn test_narrow_scope_keeps_previously_staged_paths() {
    let fx = Fixture::new();
    let engine = fx.engine(SyncPolicy::cooperative().with_staging(StagingScope::Narrow));
    std::fs::write(fx.work_path.join("staged.txt"), "added by hand").unwrap();
    let mut index = engine.repo().index().unwrap();
    index.add_path(Path::new("staged.txt")).unwrap();
    index.write().unwrap();
    fx.append("first");

    let SyncOutcome::Pushed { commit: Some(oid), .. } = engine.sync().unwrap() else {
        panic!("expected a push");
    };
    let bare = fx.bare();
    let tree = bare.find_commit(oid).unwrap().tree().unwrap();
    assert!(tree.get_name(DEFAULT_LOG_FILE).is_some());
    assert!(tree.get_name("staged.txt").is_some());
}

#[test]
fn test_missing_credential_fails_before_any_work() {
    let fx = Fixture::new();
    let remote = RemoteDescriptor::local(
        fx.remote.local_path().unwrap().parent().unwrap().parent().unwrap(),
        OWNER,
        REPO,
        " \n",
    );
    let engine = SyncEngine::new(
        &fx.work_path,
        Identity::default(),
        remote,
        SyncPolicy::cooperative(),
    )
    .unwrap();
    let wf = workflow("text", &fx.work_path);

    let err = wf.run_once(&engine).unwrap_err();
    assert!(matches!(err, SyncError::Configuration(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(!fx.work_path.join(DEFAULT_LOG_FILE).exists());
    assert!(engine.repo().remotes().unwrap().is_empty());
}

#[test]
fn test_transport_errors_never_show_credential() {
    let work = tempdir().unwrap();
    Repository::init(work.path()).unwrap();
    let secret = "ghp_supersecret_value";
    let remote = RemoteDescriptor::https(
        "127.0.0.1:1",
        OWNER,
        REPO,
        Some("x-access-token".to_string()),
        secret,
    );
    let policy = SyncPolicy::cooperative().with_push_mode(PushMode::Cooperative);
    let engine = SyncEngine::new(work.path(), Identity::default(), remote, policy).unwrap();
    std::fs::write(work.path().join(DEFAULT_LOG_FILE), "\n[t] Aura Insight: x").unwrap();

    let err = engine.sync().unwrap_err();
    assert!(matches!(err, SyncError::Transport(_)), "got {:?}", err);
    assert!(!err.to_string().contains(secret));
    assert!(!format!("{:?}", err).contains(secret));
    assert!(!format!("{:?}", engine.remote()).contains(secret));
}
