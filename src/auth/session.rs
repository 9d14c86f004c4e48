//! Session provider.
//!
//! Owns the only shared mutable state of the client: the signed-in identity and the
//! backend profile derived from it. One subscription to the auth provider's stream
//! is held for the lifetime of the provider.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::AuthProvider;
use crate::api::ApiClient;
use crate::errors::AppError;
use crate::models::{Profile, SessionUser};

/// Snapshot of the session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<SessionUser>,
    /// Backend profile; `None` when signed out or when the fetch failed
    pub profile: Option<Profile>,
    /// True until the first identity has been resolved
    pub loading: bool,
}

impl Session {
    pub fn viewer_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.uid.as_str())
    }
}

pub struct SessionProvider {
    auth: Arc<dyn AuthProvider>,
    state: watch::Receiver<Session>,
    task: JoinHandle<()>,
}

impl SessionProvider {
    /// Subscribe to the auth provider and start resolving profiles.
    pub fn start(auth: Arc<dyn AuthProvider>, api: ApiClient) -> Self {
        let (tx, state) = watch::channel(Session {
            loading: true,
            ..Session::default()
        });
        let mut changes = auth.subscribe();

        let task = tokio::spawn(async move {
            loop {
                let user = changes.borrow_and_update().clone();

                let profile = match &user {
                    Some(u) => match api.get_profile().await {
                        Ok(profile) => Some(profile),
                        Err(e) => {
                            tracing::error!("Error fetching profile for {}: {}", u.uid, e);
                            None
                        }
                    },
                    None => None,
                };

                // Identity moved on while the profile was in flight
                if changes.has_changed().unwrap_or(false) {
                    continue;
                }

                let session = Session {
                    user,
                    profile,
                    loading: false,
                };
                if tx.send(session).is_err() {
                    break;
                }
                if changes.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { auth, state, task }
    }

    /// Current snapshot.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Wait for the first identity to be resolved.
    pub async fn ready(&self) -> Session {
        let mut state = self.state.clone();
        let session = match state.wait_for(|s| !s.loading).await {
            Ok(session) => session.clone(),
            Err(_) => self.session(),
        };
        session
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.clone()
    }

    pub fn viewer_id(&self) -> Option<String> {
        self.state.borrow().viewer_id().map(str::to_string)
    }

    /// Sign out of the auth provider. The cleared session follows on the stream.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.auth.sign_out().await
    }

    /// Stop following the auth provider.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for SessionProvider {
    fn drop(&mut self) {
        self.task.abort();
    }
}
