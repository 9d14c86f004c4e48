//! Single listing view.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{submit_request, SubmitOutcome, ViewEpoch};
use crate::api::ApiClient;
use crate::errors::AppError;
use crate::lifecycle::{
    derive_status, own_request_status, request_action, InFlight, ListingStatus, RequestAction,
};
use crate::models::{FoodDetails, RequestStatus};
use crate::notify::{Notification, Notifier};

/// Payload handed to the platform share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub title: String,
    pub text: String,
    pub url: String,
}

pub struct DetailView {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    food_id: String,
    share_base_url: String,
    epoch: ViewEpoch,
    in_flight: InFlight,
    details: RwLock<Option<FoodDetails>>,
}

impl DetailView {
    pub fn new(
        api: ApiClient,
        notifier: Arc<dyn Notifier>,
        food_id: impl Into<String>,
        share_base_url: impl Into<String>,
    ) -> Self {
        Self {
            api,
            notifier,
            food_id: food_id.into(),
            share_base_url: share_base_url.into().trim_end_matches('/').to_string(),
            epoch: ViewEpoch::default(),
            in_flight: InFlight::new(),
            details: RwLock::new(None),
        }
    }

    pub fn food_id(&self) -> &str {
        &self.food_id
    }

    /// Fetch the listing and its requests in one call.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let ticket = self.epoch.begin();
        match self.api.get_food(&self.food_id).await {
            Ok(details) => {
                if self.epoch.is_current(ticket) {
                    *self.details.write().await = Some(details);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching food details for {}: {}", self.food_id, e);
                if self.epoch.is_current(ticket) {
                    if matches!(e, AppError::NotFound(_)) {
                        *self.details.write().await = None;
                    }
                    self.notifier.notify(Notification::error(
                        "Failed to load food details. Please try again.",
                    ));
                }
                Err(e)
            }
        }
    }

    pub async fn details(&self) -> Option<FoodDetails> {
        self.details.read().await.clone()
    }

    pub async fn status(&self, viewer: Option<&str>) -> Option<ListingStatus> {
        let details = self.details.read().await;
        details.as_ref().map(|d| derive_status(&d.requests, viewer))
    }

    pub async fn own_status(&self, viewer: Option<&str>) -> Option<RequestStatus> {
        let details = self.details.read().await;
        details
            .as_ref()
            .and_then(|d| own_request_status(&d.requests, viewer))
    }

    pub async fn action(&self, viewer: Option<&str>) -> Option<RequestAction> {
        let in_flight = self.in_flight.contains(&self.food_id);
        let details = self.details.read().await;
        details
            .as_ref()
            .map(|d| request_action(&d.requests, viewer, in_flight))
    }

    /// Request this listing, then refetch it on success.
    pub async fn submit_request(&self, viewer: Option<&str>) -> Result<SubmitOutcome, AppError> {
        let known = self
            .details
            .read()
            .await
            .as_ref()
            .map(|d| d.requests.clone());

        let (outcome, guard) = submit_request(
            &self.api,
            self.notifier.as_ref(),
            &self.in_flight,
            &self.food_id,
            viewer,
            known.as_deref(),
        )
        .await?;

        if outcome == SubmitOutcome::Submitted {
            if let Err(e) = self.refresh().await {
                tracing::warn!("Refresh after request failed: {}", e);
            }
        }
        drop(guard);
        Ok(outcome)
    }

    /// Link to this listing for sharing.
    pub async fn share_link(&self) -> ShareLink {
        let details = self.details.read().await;
        let name = details.as_ref().and_then(|d| d.food.title());
        ShareLink {
            title: name.unwrap_or("Food Donation").to_string(),
            text: format!(
                "Check out this food donation: {}",
                name.unwrap_or("Food Donation")
            ),
            url: format!("{}/food/{}", self.share_base_url, self.food_id),
        }
    }

    pub fn tear_down(&self) {
        self.epoch.tear_down();
    }
}
