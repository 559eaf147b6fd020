//! Push step
//!
//! Cooperative pushes are fast-forward only and surface divergence as an
//! error. Authoritative pushes use a `+` refspec and overwrite the remote
//! tip. Every message that leaves this module has the credential removed.

use std::cell::{Cell, RefCell};

use git2::{Cred, ErrorCode, PushOptions, RemoteCallbacks, Repository};
use libaura_core::{redact, PushMode, RemoteDescriptor};
use tracing::{debug, info};

use crate::SyncError;

/// Rejection texts that mean the remote has commits we don't
const DIVERGENCE_MARKERS: &[&str] = &[
    "non-fast-forward",
    "non-fastforwardable",
    "fetch first",
    "not present locally",
];

fn is_divergence(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    DIVERGENCE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Refspec pushing `local_ref` to `refs/heads/<branch>`
pub fn refspec(local_ref: &str, branch: &str, mode: PushMode) -> String {
    let force = match mode {
        PushMode::Cooperative => "",
        PushMode::Authoritative => "+",
    };
    format!("{}{}:refs/heads/{}", force, local_ref, branch)
}

/// Push `local_ref` to the remote's `branch`
pub fn push_branch(
    repo: &Repository,
    remote: &RemoteDescriptor,
    local_ref: &str,
    branch: &str,
    mode: PushMode,
) -> Result<(), SyncError> {
    let secret = remote.credential();
    let mut git_remote = repo
        .find_remote(&remote.name)
        .map_err(|e| SyncError::Git(redact(e.message(), secret)))?;

    let spec = refspec(local_ref, branch, mode);
    let rejection: RefCell<Option<String>> = RefCell::new(None);
    let auth_attempts = Cell::new(0u32);

    let push_result = {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed| {
            // libgit2 calls back again on every 401; one attempt is enough
            if auth_attempts.replace(auth_attempts.get() + 1) > 0 {
                return Err(git2::Error::from_str("authentication rejected by remote"));
            }
            if !allowed.is_user_pass_plaintext() {
                return Cred::default();
            }
            match remote.username.as_deref().or(username_from_url) {
                Some(user) if user != secret => Cred::userpass_plaintext(user, secret),
                _ => Cred::userpass_plaintext(secret, ""),
            }
        });
        callbacks.push_update_reference(|refname, status| {
            if let Some(msg) = status {
                *rejection.borrow_mut() = Some(format!("{}: {}", refname, msg));
            }
            Ok(())
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        debug!(refspec = %spec, remote = %remote.redacted_url(), "pushing");
        git_remote.push(&[spec.as_str()], Some(&mut push_options))
    };

    if let Err(e) = push_result {
        let message = redact(e.message(), secret);
        if e.code() == ErrorCode::NotFastForward || is_divergence(&message) {
            return Err(SyncError::Divergence {
                branch: branch.to_string(),
                message,
            });
        }
        return Err(SyncError::Transport(message));
    }

    if let Some(msg) = rejection.into_inner() {
        let message = redact(&msg, secret);
        if is_divergence(&message) {
            return Err(SyncError::Divergence {
                branch: branch.to_string(),
                message,
            });
        }
        return Err(SyncError::Transport(format!("push rejected: {}", message)));
    }

    info!(branch, mode = %mode, remote = %remote.redacted_url(), "push complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refspec_forms() {
        assert_eq!(
            refspec("refs/heads/main", "main", PushMode::Cooperative),
            "refs/heads/main:refs/heads/main"
        );
        assert_eq!(
            refspec("refs/heads/work", "main", PushMode::Authoritative),
            "+refs/heads/work:refs/heads/main"
        );
    }

    #[test]
    fn test_divergence_markers() {
        assert!(is_divergence("cannot push non-fastforwardable reference"));
        assert!(is_divergence("refs/heads/main: rejected (fetch first)"));
        assert!(!is_divergence("failed to resolve address for github.com"));
    }
}
