//! Remote descriptor
//!
//! The authenticated URL embeds a credential, so the descriptor keeps the
//! pieces separate and only assembles the secret-bearing form on demand.

use std::fmt;
use std::path::PathBuf;

use crate::error::AuraError;
use crate::secret::{Sensitive, REDACTED};

/// Name of the single remote the engine manages
pub const REMOTE_NAME: &str = "origin";

/// Default host for HTTPS remotes
pub const DEFAULT_HOST: &str = "github.com";

/// Username GitHub expects alongside an installation or PAT token
pub const ACCESS_TOKEN_USER: &str = "x-access-token";

/// Where the remote repository lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `https://[user:]<credential>@host/owner/repo.git`
    Https { host: String },
    /// A repository on the local filesystem at `root/owner/repo.git`.
    /// Carries no credential in its URL.
    Local { root: PathBuf },
}

/// Structured form of the authenticated remote URL
#[derive(Clone)]
pub struct RemoteDescriptor {
    pub name: String,
    pub endpoint: Endpoint,
    pub owner: String,
    pub repo: String,
    pub username: Option<String>,
    credential: Sensitive<String>,
}

impl RemoteDescriptor {
    /// HTTPS remote on an arbitrary host. The credential is trimmed.
    pub fn https(
        host: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        username: Option<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            name: REMOTE_NAME.to_string(),
            endpoint: Endpoint::Https { host: host.into() },
            owner: owner.into(),
            repo: repo.into(),
            username,
            credential: Sensitive::new(credential.into().trim().to_string()),
        }
    }

    /// GitHub remote authenticated as `x-access-token`
    pub fn github(
        owner: impl Into<String>,
        repo: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self::https(
            DEFAULT_HOST,
            owner,
            repo,
            Some(ACCESS_TOKEN_USER.to_string()),
            credential,
        )
    }

    /// Remote on the local filesystem
    pub fn local(
        root: impl Into<PathBuf>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            name: REMOTE_NAME.to_string(),
            endpoint: Endpoint::Local { root: root.into() },
            owner: owner.into(),
            repo: repo.into(),
            username: None,
            credential: Sensitive::new(credential.into().trim().to_string()),
        }
    }

    /// The credential. Only the transport boundary should call this.
    pub fn credential(&self) -> &str {
        self.credential.expose()
    }

    /// Credential and repository identifiers must all be present
    pub fn validate(&self) -> Result<(), AuraError> {
        if self.credential.expose().is_empty() {
            return Err(AuraError::Configuration(
                "repository credential not found (set GITHUB_TOKEN)".to_string(),
            ));
        }
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            return Err(AuraError::Configuration(
                "repository owner and name are required".to_string(),
            ));
        }
        Ok(())
    }

    /// Path on the local filesystem, for `Endpoint::Local`
    pub fn local_path(&self) -> Option<PathBuf> {
        match &self.endpoint {
            Endpoint::Local { root } => {
                Some(root.join(&self.owner).join(format!("{}.git", self.repo)))
            }
            Endpoint::Https { .. } => None,
        }
    }

    /// URL with the credential embedded. Never log this.
    pub fn full_url(&self) -> String {
        self.render(self.credential.expose())
    }

    /// URL safe to log or show in errors
    pub fn redacted_url(&self) -> String {
        self.render(REDACTED)
    }

    fn render(&self, credential: &str) -> String {
        match &self.endpoint {
            Endpoint::Https { host } => {
                let userinfo = match &self.username {
                    Some(user) => format!("{}:{}", user, credential),
                    None => credential.to_string(),
                };
                format!("https://{}@{}/{}/{}.git", userinfo, host, self.owner, self.repo)
            }
            Endpoint::Local { .. } => self
                .local_path()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Debug for RemoteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteDescriptor")
            .field("name", &self.name)
            .field("url", &self.redacted_url())
            .finish()
    }
}
