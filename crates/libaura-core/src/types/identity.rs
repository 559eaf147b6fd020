use serde::{Deserialize, Serialize};

use crate::error::AuraError;

/// Committer attribution used for every commit the engine creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Both fields must be non-empty after trimming
    pub fn validate(&self) -> Result<(), AuraError> {
        if self.name.trim().is_empty() {
            return Err(AuraError::Configuration("committer name is empty".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(AuraError::Configuration("committer email is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new(
            "github-actions[bot]",
            "github-actions[bot]@users.noreply.github.com",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity_is_valid() {
        assert!(Identity::default().validate().is_ok());
    }

    #[test]
    fn test_blank_identity_rejected() {
        let err = Identity::new("  ", "bot@example.com").validate().unwrap_err();
        assert!(matches!(err, AuraError::Configuration(_)));
        assert!(Identity::new("bot", "").validate().is_err());
    }
}
