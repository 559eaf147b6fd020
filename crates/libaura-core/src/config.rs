//! Deployment configuration
//!
//! Settings come from three layers: built-in defaults, the repo-local
//! `.git/aura/config.toml`, and environment variables (highest).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AuraError;
use crate::log::{DEFAULT_LABEL, DEFAULT_LOG_FILE};
use crate::provider::{ProviderPolicy, DEFAULT_FALLBACK, DEFAULT_MODEL, DEFAULT_PROMPT};
use crate::secret::Sensitive;
use crate::types::identity::Identity;
use crate::types::policy::{
    PushMode, StagingScope, SyncPolicy, AUTHORITATIVE_MESSAGE, COOPERATIVE_MESSAGE,
};
use crate::types::remote::{RemoteDescriptor, ACCESS_TOKEN_USER, DEFAULT_HOST};

pub const DEFAULT_AGENT_NAME: &str = "Aura";
pub const DEFAULT_OWNER: &str = "Priom-Das";
pub const DEFAULT_REPO: &str = "Project---Aura";

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "AURA_CONFIG";

/// Repo-level configuration stored in .git/aura/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Word between the agent name and the text in each log line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Log artifact, relative to the repository root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Static message used when the provider fails. Unset uses the built-in
    /// fallback message; an empty string makes a provider failure abort the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_message: Option<String>,
    /// "huggingface" or "static"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Userinfo name placed before the credential; empty string means none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<StagingScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<PushMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_when_clean: Option<bool>,
}

/// Default config path for a repository
pub fn config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(".git").join("aura").join("config.toml")
}

/// Load agent config; `Ok(None)` when the file does not exist
pub fn load_agent_config(path: &Path) -> Result<Option<AgentConfig>, AuraError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let config: AgentConfig = toml::from_str(&content)?;
    Ok(Some(config))
}

/// Save agent config, creating parent directories
pub fn save_agent_config(path: &Path, config: &AgentConfig) -> Result<(), AuraError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Which provider the run should use
#[derive(Debug, Clone)]
pub enum ProviderChoice {
    HuggingFace {
        token: Sensitive<String>,
        model: String,
    },
    Static { message: String },
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub agent_name: String,
    pub label: String,
    pub log_file: String,
    pub prompt: String,
    pub provider: ProviderChoice,
    pub provider_policy: ProviderPolicy,
    pub identity: Identity,
    pub remote: RemoteDescriptor,
    pub policy: SyncPolicy,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    /// Layer defaults, the config file and the environment.
    ///
    /// `env` looks up a variable by name. A missing repository credential is
    /// not an error here; the sync engine rejects it before any network I/O.
    pub fn resolve<F>(config: Option<AgentConfig>, env: F) -> Result<Self, AuraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = config.unwrap_or_default();
        let lookup = |key: &str| non_empty(env(key));

        let agent_name = lookup("AURA_AGENT_NAME")
            .or(non_empty(config.agent_name))
            .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string());

        let identity_cfg = config.identity.unwrap_or_default();
        let defaults = Identity::default();
        let identity = Identity::new(
            non_empty(identity_cfg.name).unwrap_or(defaults.name),
            non_empty(identity_cfg.email).unwrap_or(defaults.email),
        );

        let remote_cfg = config.remote.unwrap_or_default();
        let host = lookup("AURA_REMOTE_HOST")
            .or(non_empty(remote_cfg.host))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let owner = lookup("AURA_OWNER")
            .or(non_empty(remote_cfg.owner))
            .unwrap_or_else(|| DEFAULT_OWNER.to_string());
        let repo = lookup("AURA_REPO")
            .or(non_empty(remote_cfg.repo))
            .unwrap_or_else(|| DEFAULT_REPO.to_string());
        let username = match remote_cfg.username {
            Some(u) => non_empty(Some(u)),
            None => Some(ACCESS_TOKEN_USER.to_string()),
        };
        let credential = lookup("GITHUB_TOKEN").unwrap_or_default();
        let remote = RemoteDescriptor::https(host, owner, repo, username, credential);

        let sync_cfg = config.sync.unwrap_or_default();
        let push_mode = match lookup("AURA_PUSH_MODE") {
            Some(v) => v.parse()?,
            None => sync_cfg.push.unwrap_or(PushMode::Cooperative),
        };
        let base = match push_mode {
            PushMode::Cooperative => SyncPolicy::cooperative(),
            PushMode::Authoritative => SyncPolicy::authoritative(),
        };
        let staging_scope = match lookup("AURA_STAGING") {
            Some(v) => v.parse()?,
            None => sync_cfg.staging.unwrap_or(base.staging_scope),
        };
        let commit_message = non_empty(sync_cfg.commit_message).unwrap_or_else(|| {
            match push_mode {
                PushMode::Cooperative => COOPERATIVE_MESSAGE,
                PushMode::Authoritative => AUTHORITATIVE_MESSAGE,
            }
            .to_string()
        });
        let policy = SyncPolicy {
            staging_scope,
            push_mode,
            commit_message,
            branch: non_empty(sync_cfg.branch).unwrap_or(base.branch),
            push_when_clean: sync_cfg.push_when_clean.unwrap_or(false),
        };

        let provider_policy = match non_empty(config.fallback_message.clone()) {
            Some(message) => ProviderPolicy::Fallback { message },
            None if config.fallback_message.is_some() => ProviderPolicy::Fatal,
            None => ProviderPolicy::Fallback {
                message: DEFAULT_FALLBACK.to_string(),
            },
        };

        let provider_name = non_empty(config.provider).unwrap_or_else(|| "huggingface".to_string());
        let provider = match provider_name.as_str() {
            "huggingface" => match lookup("HF_TOKEN") {
                Some(token) => ProviderChoice::HuggingFace {
                    token: Sensitive::new(token),
                    model: non_empty(config.model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                },
                None => {
                    warn!("HF_TOKEN not set; using static content");
                    ProviderChoice::Static {
                        message: fallback_text(&provider_policy),
                    }
                }
            },
            "static" => ProviderChoice::Static {
                message: fallback_text(&provider_policy),
            },
            other => {
                return Err(AuraError::Configuration(format!(
                    "unknown provider '{}' (expected huggingface or static)",
                    other
                )))
            }
        };

        Ok(Self {
            agent_name,
            label: non_empty(config.label).unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            log_file: non_empty(config.log_file).unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            prompt: non_empty(config.prompt).unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            provider,
            provider_policy,
            identity,
            remote,
            policy,
        })
    }
}

fn fallback_text(policy: &ProviderPolicy) -> String {
    match policy {
        ProviderPolicy::Fallback { message } => message.clone(),
        ProviderPolicy::Fatal => DEFAULT_FALLBACK.to_string(),
    }
}
