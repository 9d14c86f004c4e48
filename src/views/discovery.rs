//! Listing and discovery view.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tokio::sync::RwLock;

use super::{attach_requests, submit_request, ListingWithRequests, SubmitOutcome, ViewEpoch};
use crate::api::ApiClient;
use crate::errors::AppError;
use crate::format::{format_expiry, is_expiring_soon};
use crate::lifecycle::{derive_status, request_action, request_summary, InFlight, ListingStatus, RequestAction};
use crate::models::FoodListing;
use crate::notify::{Notification, Notifier};
use crate::search::ListingFilter;

/// Everything a listing card shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCard {
    pub listing: FoodListing,
    pub status: ListingStatus,
    pub action: RequestAction,
    pub request_summary: Option<String>,
    pub expiry: String,
    pub expiring_soon: bool,
    pub requests_known: bool,
}

impl ListingCard {
    pub fn build(
        item: &ListingWithRequests,
        viewer: Option<&str>,
        in_flight: bool,
        now: NaiveDateTime,
    ) -> Self {
        let listing = &item.listing;
        let date = listing.expiry_date.as_deref();
        let time = listing.expiry_time.as_deref();
        Self {
            listing: listing.clone(),
            status: derive_status(&item.requests, viewer),
            action: request_action(&item.requests, viewer, in_flight),
            request_summary: request_summary(&item.requests),
            expiry: format_expiry(date, time),
            expiring_soon: is_expiring_soon(date, time, now),
            requests_known: item.requests_known,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryState {
    /// Last successful fetch, unfiltered
    pub listings: Vec<ListingWithRequests>,
    pub filter: ListingFilter,
    /// Set when the last top-level fetch failed
    pub error: Option<String>,
    pub loaded: bool,
}

/// All open listings with client-side filtering and request submission.
pub struct DiscoveryView {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    epoch: ViewEpoch,
    in_flight: InFlight,
    state: RwLock<DiscoveryState>,
}

impl DiscoveryView {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            epoch: ViewEpoch::default(),
            in_flight: InFlight::new(),
            state: RwLock::new(DiscoveryState::default()),
        }
    }

    /// Fetch all listings, then every listing's requests concurrently.
    ///
    /// Returns the number of listings fetched.
    pub async fn refresh(&self) -> Result<usize, AppError> {
        let ticket = self.epoch.begin();

        let listings = match self.api.list_donations().await {
            Ok(listings) => listings,
            Err(e) => {
                tracing::error!("Error fetching food donations: {}", e);
                if self.epoch.is_current(ticket) {
                    let mut state = self.state.write().await;
                    state.listings.clear();
                    state.error = Some("Failed to load food donations. Please try again.".to_string());
                    state.loaded = true;
                    self.notifier
                        .notify(Notification::error("Failed to load food donations. Please try again."));
                }
                return Err(e);
            }
        };

        let merged = attach_requests(&self.api, listings).await;
        let count = merged.len();

        if self.epoch.is_current(ticket) {
            let mut state = self.state.write().await;
            state.listings = merged;
            state.error = None;
            state.loaded = true;
        } else {
            tracing::debug!("Discarding stale listing fetch");
        }
        Ok(count)
    }

    pub async fn set_filter(&self, filter: ListingFilter) {
        self.state.write().await.filter = filter;
    }

    pub async fn set_search(&self, search: impl Into<String>) {
        self.state.write().await.filter.search = search.into();
    }

    pub async fn set_location(&self, location: impl Into<String>) {
        self.state.write().await.filter.location = location.into();
    }

    pub async fn state(&self) -> DiscoveryState {
        self.state.read().await.clone()
    }

    /// Listings passing the current filter.
    pub async fn visible(&self) -> Vec<ListingWithRequests> {
        let state = self.state.read().await;
        state
            .filter
            .apply(&state.listings)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Cards for the listings passing the current filter.
    pub async fn cards(&self, viewer: Option<&str>) -> Vec<ListingCard> {
        let now = Local::now().naive_local();
        let state = self.state.read().await;
        state
            .filter
            .apply(&state.listings)
            .into_iter()
            .map(|item| {
                let in_flight = self.in_flight.contains(&item.listing.id);
                ListingCard::build(item, viewer, in_flight, now)
            })
            .collect()
    }

    /// Request a listing, then refetch everything on success.
    pub async fn submit_request(
        &self,
        listing_id: &str,
        viewer: Option<&str>,
    ) -> Result<SubmitOutcome, AppError> {
        let known = {
            let state = self.state.read().await;
            state
                .listings
                .iter()
                .find(|l| l.listing.id == listing_id)
                .map(|l| l.requests.clone())
        };

        let (outcome, guard) = submit_request(
            &self.api,
            self.notifier.as_ref(),
            &self.in_flight,
            listing_id,
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

    pub fn is_requesting(&self, listing_id: &str) -> bool {
        self.in_flight.contains(listing_id)
    }

    /// Stop applying results of fetches still in flight.
    pub fn tear_down(&self) {
        self.epoch.tear_down();
    }
}
