//! Donor's own listings and the requests made on them.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{attach_requests, ListingWithRequests, ViewEpoch};
use crate::api::ApiClient;
use crate::errors::AppError;
use crate::lifecycle::InFlight;
use crate::models::{FoodRequest, RequestStatus};
use crate::notify::{Notification, Notifier};

/// Outcome of a status update that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// An update for the same request is still outstanding; nothing was sent
    AlreadyInFlight,
}

/// One entry of the donor's status menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOption {
    pub status: RequestStatus,
    pub current: bool,
}

/// Every status a donor can pick, with the request's current one marked.
pub fn status_options(request: &FoodRequest) -> Vec<StatusOption> {
    RequestStatus::ALL
        .iter()
        .map(|&status| StatusOption {
            status,
            current: request.status == status,
        })
        .collect()
}

pub struct MyDonationsView {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    epoch: ViewEpoch,
    updating: InFlight,
    donations: RwLock<Vec<ListingWithRequests>>,
}

impl MyDonationsView {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            epoch: ViewEpoch::default(),
            updating: InFlight::new(),
            donations: RwLock::new(Vec::new()),
        }
    }

    /// Fetch the viewer's listings and each listing's requests.
    pub async fn refresh(&self, viewer: Option<&str>) -> Result<usize, AppError> {
        if viewer.is_none() {
            return Err(AppError::Unauthenticated(
                "Please log in to view your donations".to_string(),
            ));
        }

        let ticket = self.epoch.begin();
        let listings = match self.api.list_donated_foods().await {
            Ok(listings) => listings,
            Err(e) => {
                tracing::error!("Error fetching donated foods: {}", e);
                if self.epoch.is_current(ticket) {
                    self.notifier.notify(Notification::error(
                        "Failed to load your donations. Please try again.",
                    ));
                }
                return Err(e);
            }
        };

        let merged = attach_requests(&self.api, listings).await;
        let count = merged.len();
        if self.epoch.is_current(ticket) {
            *self.donations.write().await = merged;
        }
        Ok(count)
    }

    pub async fn donations(&self) -> Vec<ListingWithRequests> {
        self.donations.read().await.clone()
    }

    pub fn is_updating(&self, request_id: &str) -> bool {
        self.updating.contains(request_id)
    }

    /// Move a request to `status` and refetch on success.
    ///
    /// Any transition is sent; the backend decides whether it is legal. Approving one
    /// request leaves the listing's other requests untouched.
    pub async fn set_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
        viewer: Option<&str>,
    ) -> Result<UpdateOutcome, AppError> {
        if viewer.is_none() {
            return Err(AppError::Unauthenticated(
                "Please log in to view your donations".to_string(),
            ));
        }

        let Some(_guard) = self.updating.try_begin(request_id) else {
            return Ok(UpdateOutcome::AlreadyInFlight);
        };

        let title = self.listing_title_for(request_id).await;

        match self.api.update_request_status(request_id, status).await {
            Ok(_) => {
                tracing::info!("Request {} set to {}", request_id, status);
                self.notifier.notify(Notification::success(format!(
                    "Request {} successfully for \"{}\"",
                    status, title
                )));
                if let Err(e) = self.refresh(viewer).await {
                    tracing::warn!("Refresh after status update failed: {}", e);
                }
                Ok(UpdateOutcome::Updated)
            }
            Err(e) => {
                tracing::error!("Error updating request status for {}: {}", request_id, e);
                self.notifier.notify(Notification::error(
                    e.user_message("Failed to update request status. Please try again."),
                ));
                Err(e)
            }
        }
    }

    async fn listing_title_for(&self, request_id: &str) -> String {
        self.donations
            .read()
            .await
            .iter()
            .find(|d| d.requests.iter().any(|r| r.id == request_id))
            .map(|d| d.listing.display_name().to_string())
            .unwrap_or_else(|| "Unknown Food".to_string())
    }

    pub fn tear_down(&self) {
        self.epoch.tear_down();
    }
}
