//! User profile endpoints.

use reqwest::Method;

use super::ApiClient;
use crate::errors::AppError;
use crate::models::{decode_item, Acknowledgement, Profile, UpdateProfileRequest};

impl ApiClient {
    /// GET /user/me - Fetch the backend profile of the signed-in user.
    pub async fn get_profile(&self) -> Result<Profile, AppError> {
        self.get_item(&["user", "me"]).await
    }

    /// POST /user/create - Create the backend profile after sign-up or sign-in.
    ///
    /// The body is empty; the backend derives the profile from the bearer token.
    /// Returns the profile when the backend echoes it back.
    pub async fn create_user(&self) -> Result<Option<Profile>, AppError> {
        let body = self.send(Method::POST, &["user", "create"], None).await?;
        Ok(decode_item(&body).ok())
    }

    /// POST /profile - Update profile fields.
    pub async fn update_profile(
        &self,
        update: &UpdateProfileRequest,
    ) -> Result<Acknowledgement, AppError> {
        self.mutate(Method::POST, &["profile"], Some(update)).await
    }
}
