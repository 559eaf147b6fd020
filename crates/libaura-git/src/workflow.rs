//! One-shot workflow: provider -> log writer -> sync engine

use libaura_core::{ContentProvider, LogEntry, LogWriter, ProviderPolicy};
use tracing::{info, warn};

use crate::engine::{SyncEngine, SyncOutcome};
use crate::SyncError;

/// What a successful run did
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Text written to the log
    pub text: String,
    /// Whether the provider failed and the fallback message was used
    pub used_fallback: bool,
    pub outcome: SyncOutcome,
}

/// Sequence for a single run
pub struct Workflow {
    provider: Box<dyn ContentProvider>,
    provider_policy: ProviderPolicy,
    log: LogWriter,
    agent: String,
    label: String,
    prompt: String,
}

impl Workflow {
    pub fn new(
        provider: Box<dyn ContentProvider>,
        provider_policy: ProviderPolicy,
        log: LogWriter,
        agent: impl Into<String>,
        label: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            provider_policy,
            log,
            agent: agent.into(),
            label: label.into(),
            prompt: prompt.into(),
        }
    }

    /// Produce the log text, applying the provider policy on failure
    pub fn generate(&self) -> Result<(String, bool), SyncError> {
        info!(provider = self.provider.name(), "[AI] Requesting insight...");
        match self.provider.generate(&self.prompt) {
            Ok(text) => Ok((text, false)),
            Err(e) => match &self.provider_policy {
                ProviderPolicy::Fallback { message } => {
                    warn!(error = %e, "provider failed, using fallback message");
                    Ok((message.clone(), true))
                }
                ProviderPolicy::Fatal => Err(SyncError::Provider(e)),
            },
        }
    }

    /// Run once. Configuration is checked before anything is generated or
    /// written, so a misconfigured deployment leaves no trace.
    pub fn run_once(&self, engine: &SyncEngine) -> Result<RunReport, SyncError> {
        engine.preflight()?;

        let (text, used_fallback) = self.generate()?;

        let entry = LogEntry::new(&self.agent, &self.label, &text);
        self.log.append(&entry)?;
        info!(path = %self.log.path().display(), "[FILE] progress log updated");

        let outcome = engine.sync()?;
        Ok(RunReport {
            text,
            used_fallback,
            outcome,
        })
    }
}
