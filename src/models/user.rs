//! User identity and backend profile models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    /// Opaque provider id
    pub uid: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
}

/// Backend profile record for the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref().or(self.photo_url.as_deref())
    }
}

/// Request body for `POST /profile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// A populated user embedded in another document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Reference to a user: either an id or a populated summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    User(UserSummary),
}

impl UserRef {
    /// Whether this reference points at the given provider uid.
    pub fn matches(&self, uid: &str) -> bool {
        match self {
            UserRef::Id(id) => id == uid,
            UserRef::User(user) => {
                user.uid.as_deref() == Some(uid) || user.id.as_deref() == Some(uid)
            }
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            UserRef::Id(_) => None,
            UserRef::User(user) => user
                .name
                .as_deref()
                .or(user.display_name.as_deref())
                .or(user.email.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_photo_from_either_field() {
        let profile: Profile =
            serde_json::from_str(r#"{"_id":"p1","photoURL":"https://img/p.jpg"}"#).unwrap();
        assert_eq!(profile.photo(), Some("https://img/p.jpg"));

        let profile: Profile = serde_json::from_str(
            r#"{"_id":"p1","photo":"https://img/a.jpg","photoURL":"https://img/b.jpg"}"#,
        )
        .unwrap();
        assert_eq!(profile.photo(), Some("https://img/a.jpg"));
    }

    #[test]
    fn test_user_ref_matches_uid_or_id() {
        let user: UserRef = serde_json::from_str(r#"{"_id":"m1","uid":"u1"}"#).unwrap();
        assert!(user.matches("u1"));
        assert!(user.matches("m1"));
        assert!(!user.matches("u2"));
        assert!(UserRef::Id("u1".to_string()).matches("u1"));
    }
}
