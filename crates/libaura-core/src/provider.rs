//! Content providers
//!
//! A provider turns a prompt into one short line of text. The sync engine
//! never sees provider-specific response shapes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::secret::{redact, Sensitive};

/// Prompt sent when no prompt is configured
pub const DEFAULT_PROMPT: &str = "Write a professional, one-sentence developer log about an \
AI agent automating a GitHub push. Keep it under 15 words.";

/// Message used when the provider is unavailable
pub const DEFAULT_FALLBACK: &str =
    "Automated sync completed; generative insight unavailable this run.";

pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.2-1B-Instruct";
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co";

/// Source of the text written to the log
pub trait ContentProvider {
    fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Short name for logging
    fn name(&self) -> &str;
}

/// What to do when the provider fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderPolicy {
    /// Use the static message and carry on
    Fallback { message: String },
    /// Abort the run
    Fatal,
}

impl Default for ProviderPolicy {
    fn default() -> Self {
        ProviderPolicy::Fallback {
            message: DEFAULT_FALLBACK.to_string(),
        }
    }
}

/// Always returns the same message
#[derive(Debug, Clone)]
pub struct StaticProvider {
    message: String,
}

impl StaticProvider {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl ContentProvider for StaticProvider {
    fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        let text = self.message.trim();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client for the Hugging Face inference router
pub struct HuggingFaceProvider {
    token: Sensitive<String>,
    base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    timeout: Duration,
}

impl HuggingFaceProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Sensitive::new(token.into().trim().to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 30,
            temperature: 0.5,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

impl ContentProvider for HuggingFaceProvider {
    fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(model = %self.model, "requesting chat completion");
        let resp = agent
            .post(&self.endpoint())
            .set("Authorization", &format!("Bearer {}", self.token.expose()))
            .set("User-Agent", "aura-agent")
            .send_json(&request)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => ProviderError::Status { code },
                ureq::Error::Transport(t) => {
                    ProviderError::Request(redact(&t.to_string(), self.token.expose()))
                }
            })?;

        let body: ChatResponse = resp
            .into_json()
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        extract_text(body)
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}

fn extract_text(body: ChatResponse) -> Result<String, ProviderError> {
    let text = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if text.is_empty() {
        warn!("provider response carried no text");
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text)
}
