//! Core library for Aura
//!
//! This crate holds everything the sync engine needs that is not git:
//! - Identity and remote descriptors with secret-safe URL views
//! - Sync policy (staging scope, push mode, commit message template)
//! - Repo-local TOML configuration layered with environment variables
//! - The append-only progress log writer
//! - Content providers (Hugging Face chat completion, static fallback)

pub mod config;
pub mod error;
pub mod log;
pub mod provider;
pub mod secret;
pub mod types;

pub use error::{AuraError, ProviderError};
pub use log::{LogEntry, LogWriter};
pub use provider::{ContentProvider, HuggingFaceProvider, ProviderPolicy, StaticProvider};
pub use secret::{redact, Sensitive};
pub use types::identity::Identity;
pub use types::policy::{PushMode, StagingScope, SyncPolicy};
pub use types::remote::{Endpoint, RemoteDescriptor};
