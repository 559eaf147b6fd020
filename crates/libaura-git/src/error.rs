use libaura_core::{redact, AuraError, ProviderError};
use thiserror::Error;

/// Errors that can occur during a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("push to '{branch}' rejected, remote has diverged: {message}")]
    Divergence { branch: String, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Core(AuraError),

    #[error("Not a git repository: {0}")]
    NotARepo(String),
}

impl From<git2::Error> for SyncError {
    fn from(e: git2::Error) -> Self {
        SyncError::Git(e.message().to_string())
    }
}

impl From<AuraError> for SyncError {
    fn from(e: AuraError) -> Self {
        match e {
            AuraError::Configuration(msg) => SyncError::Configuration(msg),
            AuraError::Provider(p) => SyncError::Provider(p),
            AuraError::Io(io) => SyncError::Io(io),
            other => SyncError::Core(other),
        }
    }
}

impl SyncError {
    /// Scrub `secret` from every message this error carries
    pub fn redact(self, secret: &str) -> Self {
        match self {
            SyncError::Configuration(m) => SyncError::Configuration(redact(&m, secret)),
            SyncError::Divergence { branch, message } => SyncError::Divergence {
                branch,
                message: redact(&message, secret),
            },
            SyncError::Transport(m) => SyncError::Transport(redact(&m, secret)),
            SyncError::Git(m) => SyncError::Git(redact(&m, secret)),
            SyncError::NotARepo(m) => SyncError::NotARepo(redact(&m, secret)),
            SyncError::Core(AuraError::Internal(m)) => {
                SyncError::Core(AuraError::Internal(redact(&m, secret)))
            }
            other => other,
        }
    }

    /// Stable error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Configuration(_) => "configuration",
            SyncError::Divergence { .. } => "divergence",
            SyncError::Transport(_) => "transport",
            SyncError::Git(_) => "git_error",
            SyncError::Io(_) => "io_error",
            SyncError::Provider(_) => "provider",
            SyncError::Core(e) => e.error_code(),
            SyncError::NotARepo(_) => "not_a_repo",
        }
    }

    /// Process exit code for the binary
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Configuration(_) => 2,
            SyncError::NotARepo(_) => 2,
            SyncError::Provider(_) => 3,
            SyncError::Divergence { .. } => 4,
            SyncError::Transport(_) => 5,
            SyncError::Core(e) => e.exit_code(),
            _ => 1,
        }
    }
}
