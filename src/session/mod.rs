//! Session Provider
//!
//! Tracks who (if anyone) is signed in and publishes changes on a
//! `tokio::sync::watch` channel. The identity itself comes from an external
//! provider behind [`SessionProvider`]; the bundled [`ProfileSessionProvider`]
//! treats the configured `[session]` profile as that provider.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::types::{CodeLensError, Result, UserIdentity};

const SIGN_IN_NOT_CONFIGURED: &str =
    "Sign-in is not configured. Set session.uid in the config or CODELENS_SESSION__UID.";

/// Current authentication state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Initial state before the provider has reported
    #[default]
    Unknown,
    SignedOut,
    SignedIn(UserIdentity),
}

impl SessionState {
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            SessionState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user().is_some()
    }
}

/// Identity provider seam.
///
/// Subscribers observe every transition; `current` is a snapshot.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn subscribe(&self) -> watch::Receiver<SessionState>;

    fn current(&self) -> SessionState;

    /// Start an interactive sign-in
    async fn sign_in(&self) -> Result<()>;

    /// Sign out; never fails from the caller's point of view
    async fn sign_out(&self);
}

/// Session provider backed by a configured identity profile.
///
/// A signed-out marker file (when set) keeps `logout` effective across
/// separate CLI invocations.
pub struct ProfileSessionProvider {
    profile: Option<UserIdentity>,
    marker: Option<PathBuf>,
    state: watch::Sender<SessionState>,
}

impl ProfileSessionProvider {
    pub fn new(profile: Option<UserIdentity>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            profile,
            marker: None,
            state,
        }
    }

    /// Persist sign-out through a marker file at `path`
    pub fn with_marker(mut self, path: impl Into<PathBuf>) -> Self {
        self.marker = Some(path.into());
        self
    }

    /// Resolve the initial state: Unknown moves to SignedIn or SignedOut.
    pub fn start(&self) -> SessionState {
        let signed_out = self.marker.as_ref().is_some_and(|path| path.exists());
        let next = match &self.profile {
            Some(user) if !signed_out => SessionState::SignedIn(user.clone()),
            _ => SessionState::SignedOut,
        };
        debug!("Session started: {:?}", next);
        self.state.send_replace(next.clone());
        next
    }

    fn clear_marker(&self) -> Result<()> {
        if let Some(path) = &self.marker
            && path.exists()
        {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn write_marker(&self) -> Result<()> {
        if let Some(path) = &self.marker {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, b"")?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for ProfileSessionProvider {
    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    async fn sign_in(&self) -> Result<()> {
        let Some(user) = self.profile.clone() else {
            return Err(CodeLensError::SignIn(SIGN_IN_NOT_CONFIGURED.to_string()));
        };

        self.clear_marker()
            .map_err(|e| CodeLensError::SignIn(e.to_string()))?;
        info!("Signed in as {}", user.label());
        self.state.send_replace(SessionState::SignedIn(user));
        Ok(())
    }

    async fn sign_out(&self) {
        if let Err(e) = self.write_marker() {
            warn!("Failed to persist sign-out: {}", e);
        }
        info!("Signed out");
        self.state.send_replace(SessionState::SignedOut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserIdentity {
        UserIdentity {
            uid: "alice-uid".to_string(),
            display_name: Some("Alice".to_string()),
            email: None,
            photo_url: None,
        }
    }

    #[test]
    fn test_start_without_profile_is_signed_out() {
        let provider = ProfileSessionProvider::new(None);
        assert_eq!(provider.current(), SessionState::Unknown);
        assert_eq!(provider.start(), SessionState::SignedOut);
        assert_eq!(provider.current(), SessionState::SignedOut);
    }

    #[test]
    fn test_start_with_profile_is_signed_in() {
        let provider = ProfileSessionProvider::new(Some(alice()));
        let state = provider.start();
        assert_eq!(state.user().map(|u| u.uid.as_str()), Some("alice-uid"));
        assert!(provider.current().is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_in_without_profile_fails() {
        let provider = ProfileSessionProvider::new(None);
        provider.start();
        let err = provider.sign_in().await.unwrap_err();
        assert!(matches!(err, CodeLensError::SignIn(_)));
        assert_eq!(provider.current(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_subscribers_observe_transitions() {
        let provider = ProfileSessionProvider::new(Some(alice()));
        let mut rx = provider.subscribe();
        provider.start();

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_signed_in());

        provider.sign_out().await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SessionState::SignedOut);

        provider.sign_in().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_signed_in());
    }

    #[tokio::test]
    async fn test_marker_keeps_sign_out_across_providers() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("signed_out");

        let first = ProfileSessionProvider::new(Some(alice())).with_marker(&marker);
        first.start();
        first.sign_out().await;
        assert!(marker.exists());

        let second = ProfileSessionProvider::new(Some(alice())).with_marker(&marker);
        assert_eq!(second.start(), SessionState::SignedOut);

        second.sign_in().await.unwrap();
        assert!(!marker.exists());

        let third = ProfileSessionProvider::new(Some(alice())).with_marker(&marker);
        assert!(third.start().is_signed_in());
    }
}
