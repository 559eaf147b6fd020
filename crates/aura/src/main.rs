//! Aura - one-shot insight logger
//!
//! Each invocation:
//! - Asks the content provider for a one-line insight (or uses the fallback)
//! - Appends it to the progress log
//! - Commits and pushes the log to the configured remote when it changed
//!
//! Meant to be run by a scheduler; the exit code reports the outcome.

use std::path::PathBuf;

use libaura_core::config::{config_path, load_agent_config, ProviderChoice, Settings, CONFIG_ENV};
use libaura_core::{ContentProvider, HuggingFaceProvider, LogWriter, StaticProvider};
use libaura_git::{RunReport, SyncEngine, SyncError, SyncOutcome, Workflow};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Overrides the working copy location (defaults to the current directory)
const REPO_PATH_ENV: &str = "AURA_REPO_PATH";

fn main() {
    // A missing .env is normal in CI where variables come from secrets
    let _ = dotenvy::dotenv();

    init_logging();

    match run() {
        Ok(report) => print_summary(&report),
        Err(e) => {
            error!(code = e.error_code(), "{}", e);
            eprintln!("error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn init_logging() {
    let fallback = std::env::var("AURA_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn repo_root() -> Result<PathBuf, SyncError> {
    match std::env::var(REPO_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(std::env::current_dir()?),
    }
}

fn build_provider(choice: &ProviderChoice) -> Box<dyn ContentProvider> {
    match choice {
        ProviderChoice::HuggingFace { token, model } => {
            Box::new(HuggingFaceProvider::new(token.expose().as_str()).with_model(model.as_str()))
        }
        ProviderChoice::Static { message } => Box::new(StaticProvider::new(message.as_str())),
    }
}

fn run() -> Result<RunReport, SyncError> {
    let root = repo_root()?;
    let config_file = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_path(&root));
    let config = load_agent_config(&config_file)?;
    let settings = Settings::resolve(config, |key| std::env::var(key).ok())?;

    info!(
        agent = %settings.agent_name,
        staging = %settings.policy.staging_scope,
        push = %settings.policy.push_mode,
        "--- {} Initialization Started ---",
        settings.agent_name
    );

    let engine = SyncEngine::new(
        &root,
        settings.identity.clone(),
        settings.remote.clone(),
        settings.policy.clone(),
    )?
    .with_agent(settings.agent_name.as_str())
    .with_artifact(settings.log_file.as_str());

    let workflow = Workflow::new(
        build_provider(&settings.provider),
        settings.provider_policy.clone(),
        LogWriter::new(root.join(&settings.log_file)),
        settings.agent_name.as_str(),
        settings.label.as_str(),
        settings.prompt.as_str(),
    );

    workflow.run_once(&engine)
}

fn print_summary(report: &RunReport) {
    match report.outcome {
        SyncOutcome::Skipped => println!("Workspace clean, nothing to sync"),
        SyncOutcome::Pushed { commit, forced } => {
            let what = commit
                .map(|oid| oid.to_string()[..8].to_string())
                .unwrap_or_else(|| "existing tip".to_string());
            let how = if forced { "force-pushed" } else { "pushed" };
            println!("{} {}", how, what);
        }
    }
    if report.used_fallback {
        println!("note: provider unavailable, fallback message used");
    }
}
