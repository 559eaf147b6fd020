//! Sync policy
//!
//! One engine covers every deployment: what gets staged, how the push
//! treats a diverged remote, and how commits are worded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuraError;

/// Default branch the engine pushes to
pub const DEFAULT_BRANCH: &str = "main";

/// Commit message for cooperative deployments
pub const COOPERATIVE_MESSAGE: &str = "Automated Cloud Update: {agent} Deployment Core.";

/// Commit message for authoritative deployments
pub const AUTHORITATIVE_MESSAGE: &str = "Automated Update: {agent} AI log integration.";

/// Which paths are staged before the commit decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StagingScope {
    /// Only the log artifact
    Narrow,
    /// The entire working tree
    Broad,
}

/// How the push treats a remote that has diverged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushMode {
    /// Fast-forward only; divergence is a failure
    Cooperative,
    /// Overwrite the remote branch tip
    Authoritative,
}

impl StagingScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            StagingScope::Narrow => "narrow",
            StagingScope::Broad => "broad",
        }
    }
}

impl PushMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushMode::Cooperative => "cooperative",
            PushMode::Authoritative => "authoritative",
        }
    }
}

impl fmt::Display for StagingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StagingScope {
    type Err = AuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "narrow" => Ok(StagingScope::Narrow),
            "broad" => Ok(StagingScope::Broad),
            other => Err(AuraError::Configuration(format!(
                "unknown staging scope '{}' (expected narrow or broad)",
                other
            ))),
        }
    }
}

impl FromStr for PushMode {
    type Err = AuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cooperative" => Ok(PushMode::Cooperative),
            "authoritative" | "force" => Ok(PushMode::Authoritative),
            other => Err(AuraError::Configuration(format!(
                "unknown push mode '{}' (expected cooperative or authoritative)",
                other
            ))),
        }
    }
}

/// Deployment-wide sync configuration, selected once per deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPolicy {
    pub staging_scope: StagingScope,
    pub push_mode: PushMode,
    /// Commit message template; `{agent}` is replaced by the agent name
    pub commit_message: String,
    pub branch: String,
    /// Authoritative mode only: push the current tip even when nothing changed
    pub push_when_clean: bool,
}

impl SyncPolicy {
    /// Narrow staging with fast-forward pushes
    pub fn cooperative() -> Self {
        Self {
            staging_scope: StagingScope::Narrow,
            push_mode: PushMode::Cooperative,
            commit_message: COOPERATIVE_MESSAGE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            push_when_clean: false,
        }
    }

    /// Broad staging with force pushes
    pub fn authoritative() -> Self {
        Self {
            staging_scope: StagingScope::Broad,
            push_mode: PushMode::Authoritative,
            commit_message: AUTHORITATIVE_MESSAGE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            push_when_clean: false,
        }
    }

    pub fn with_staging(mut self, scope: StagingScope) -> Self {
        self.staging_scope = scope;
        self
    }

    pub fn with_push_mode(mut self, mode: PushMode) -> Self {
        self.push_mode = mode;
        self
    }

    pub fn with_commit_message(mut self, template: impl Into<String>) -> Self {
        self.commit_message = template.into();
        self
    }

    /// Render the commit message for an agent
    pub fn render_message(&self, agent: &str) -> String {
        self.commit_message.replace("{agent}", agent)
    }

    /// Whether a clean tree should still be pushed
    pub fn pushes_when_clean(&self) -> bool {
        self.push_when_clean && self.push_mode == PushMode::Authoritative
    }
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self::cooperative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_message() {
        let policy = SyncPolicy::cooperative();
        assert_eq!(
            policy.render_message("Aura"),
            "Automated Cloud Update: Aura Deployment Core."
        );
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("Broad".parse::<StagingScope>().unwrap(), StagingScope::Broad);
        assert_eq!("force".parse::<PushMode>().unwrap(), PushMode::Authoritative);
        assert!("sideways".parse::<PushMode>().is_err());
    }

    #[test]
    fn test_push_when_clean_requires_authoritative() {
        let mut policy = SyncPolicy::cooperative();
        policy.push_when_clean = true;
        assert!(!policy.pushes_when_clean());
        policy.push_mode = PushMode::Authoritative;
        assert!(policy.pushes_when_clean());
    }
}
