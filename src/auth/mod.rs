//! Authentication provider seam.
//!
//! Sign-in itself happens in the external provider. The client only needs the
//! current identity, a fresh bearer ID token per call, and a stream of identity
//! changes. ID tokens are decoded to read the identity claims; verifying them is
//! the backend's job.

mod session;

pub use session::*;

use std::sync::RwLock;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use tokio::sync::watch;

use crate::errors::{AppError, AuthErrorCode};
use crate::models::SessionUser;

/// Source of identity and bearer credentials.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user, if any.
    fn current_user(&self) -> Option<SessionUser>;

    /// A bearer token for the next backend call. `None` when signed out.
    async fn id_token(&self) -> Result<Option<String>, AppError>;

    /// Identity changes, starting with the current value.
    fn subscribe(&self) -> watch::Receiver<Option<SessionUser>>;

    async fn sign_out(&self) -> Result<(), AppError>;
}

/// Claims read from a provider-issued ID token.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

fn invalid_token() -> AppError {
    AppError::Auth(AuthErrorCode::from_code("auth/invalid-id-token"))
}

/// Read the identity carried by an ID token without verifying its signature.
pub fn decode_identity(token: &str) -> Result<SessionUser, AppError> {
    let payload = token.split('.').nth(1).ok_or_else(invalid_token)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| invalid_token())?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes).map_err(|_| invalid_token())?;

    let uid = claims
        .user_id
        .or(claims.sub)
        .filter(|uid| !uid.is_empty())
        .ok_or_else(invalid_token)?;

    Ok(SessionUser {
        uid,
        display_name: claims.name,
        photo_url: claims.picture,
        email: claims.email,
    })
}

/// Auth provider backed by an ID token obtained out of band.
pub struct IdTokenAuthProvider {
    token: RwLock<Option<String>>,
    state: watch::Sender<Option<SessionUser>>,
}

impl IdTokenAuthProvider {
    pub fn signed_out() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            token: RwLock::new(None),
            state,
        }
    }

    pub fn from_token(token: &str) -> Result<Self, AppError> {
        let provider = Self::signed_out();
        provider.sign_in(token)?;
        Ok(provider)
    }

    /// Replace the current identity with the one carried by `token`.
    pub fn sign_in(&self, token: &str) -> Result<SessionUser, AppError> {
        let user = decode_identity(token)?;
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        self.state.send_replace(Some(user.clone()));
        tracing::info!("Signed in as {}", user.uid);
        Ok(user)
    }
}

#[async_trait]
impl AuthProvider for IdTokenAuthProvider {
    fn current_user(&self) -> Option<SessionUser> {
        self.state.borrow().clone()
    }

    async fn id_token(&self) -> Result<Option<String>, AppError> {
        Ok(self.token.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<SessionUser>> {
        self.state.subscribe()
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.state.send_replace(None);
        tracing::info!("Signed out");
        Ok(())
    }
}

/// Build an unsigned token carrying the given identity claims.
#[cfg(test)]
pub(crate) fn unsigned_token(uid: &str, name: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = serde_json::json!({
        "user_id": uid,
        "sub": uid,
        "name": name,
        "email": format!("{}@example.com", uid),
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_identity() {
        let token = unsigned_token("uid-42", "Ayesha");
        let user = decode_identity(&token).unwrap();
        assert_eq!(user.uid, "uid-42");
        assert_eq!(user.display_name.as_deref(), Some("Ayesha"));
        assert_eq!(user.email.as_deref(), Some("uid-42@example.com"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_identity("not-a-token"),
            Err(AppError::Auth(_))
        ));
        assert!(matches!(decode_identity("a.b.c"), Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_sign_in_and_out_publish_changes() {
        let provider = IdTokenAuthProvider::signed_out();
        let mut changes = provider.subscribe();
        assert!(changes.borrow_and_update().is_none());
        assert!(provider.id_token().await.unwrap().is_none());

        let token = unsigned_token("uid-1", "One");
        provider.sign_in(&token).unwrap();
        changes.changed().await.unwrap();
        assert_eq!(changes.borrow_and_update().as_ref().unwrap().uid, "uid-1");
        assert_eq!(provider.id_token().await.unwrap(), Some(token));

        provider.sign_out().await.unwrap();
        changes.changed().await.unwrap();
        assert!(changes.borrow().is_none());
        assert!(provider.current_user().is_none());
    }
}
