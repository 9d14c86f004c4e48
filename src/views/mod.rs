//! View models for each screen.
//!
//! Views own the state of their last successful fetch and rebuild it from the
//! backend after every mutation. Nothing is cached across views.

mod details;
mod discovery;
mod donate;
mod donations;
mod my_requests;

pub use details::*;
pub use discovery::*;
pub use donate::*;
pub use donations::*;
pub use my_requests::*;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;

use crate::api::ApiClient;
use crate::errors::AppError;
use crate::lifecycle::{derive_status, InFlight, InFlightGuard, ListingStatus};
use crate::models::{FoodListing, FoodRequest};
use crate::notify::{Notification, Notifier};

/// Guards against applying stale results.
///
/// Each fetch takes a ticket; its result is applied only if no newer fetch started
/// and the view has not been torn down in the meantime.
#[derive(Debug, Clone, Default)]
pub struct ViewEpoch {
    current: Arc<AtomicU64>,
    torn_down: Arc<AtomicBool>,
}

impl ViewEpoch {
    pub fn begin(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        !self.torn_down.load(Ordering::SeqCst) && self.current.load(Ordering::SeqCst) == ticket
    }

    pub fn tear_down(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

/// A listing merged with its request list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingWithRequests {
    pub listing: FoodListing,
    pub requests: Vec<FoodRequest>,
    /// False when the request sub-fetch failed and `requests` is a stand-in
    pub requests_known: bool,
}

impl AsRef<FoodListing> for ListingWithRequests {
    fn as_ref(&self) -> &FoodListing {
        &self.listing
    }
}

/// Fetch the request list of every listing concurrently and merge by listing id.
///
/// A failed sub-fetch degrades that listing to "no requests known" and is logged;
/// it never fails the whole batch.
pub async fn attach_requests(
    api: &ApiClient,
    listings: Vec<FoodListing>,
) -> Vec<ListingWithRequests> {
    let mut seen = HashSet::new();
    let fetches = listings
        .iter()
        .filter(|listing| seen.insert(listing.id.clone()))
        .map(|listing| {
            let id = listing.id.clone();
            async move {
                let result = api.list_food_requests(&id).await;
                (id, result)
            }
        });

    let by_id: HashMap<String, Result<Vec<FoodRequest>, AppError>> =
        join_all(fetches).await.into_iter().collect();

    let mut attached = HashSet::new();
    listings
        .into_iter()
        .map(|listing| {
            if !attached.insert(listing.id.clone()) {
                tracing::warn!("Duplicate listing {} in response", listing.id);
            }
            match by_id.get(&listing.id) {
                Some(Ok(requests)) => ListingWithRequests {
                    requests: requests.clone(),
                    listing,
                    requests_known: true,
                },
                Some(Err(e)) => {
                    tracing::warn!("Error fetching requests for food {}: {}", listing.id, e);
                    ListingWithRequests {
                        listing,
                        requests: Vec::new(),
                        requests_known: false,
                    }
                }
                None => ListingWithRequests {
                    listing,
                    requests: Vec::new(),
                    requests_known: false,
                },
            }
        })
        .collect()
}

/// Outcome of a request submission that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// A submission for the same listing is still outstanding; nothing was sent
    AlreadyInFlight,
    /// The listing is not requestable for this viewer; nothing was sent
    NotAvailable(ListingStatus),
}

/// Create a request on a listing, guarded by the in-flight set.
///
/// The caller refetches on `Submitted` while still holding the returned guard, so
/// the control stays disabled until fresh state is in.
pub(crate) async fn submit_request(
    api: &ApiClient,
    notifier: &dyn Notifier,
    in_flight: &InFlight,
    listing_id: &str,
    viewer: Option<&str>,
    known_requests: Option<&[FoodRequest]>,
) -> Result<(SubmitOutcome, Option<InFlightGuard>), AppError> {
    let Some(viewer) = viewer else {
        let msg = "Please log in to request food";
        notifier.notify(Notification::error(msg));
        return Err(AppError::Unauthenticated(msg.to_string()));
    };

    if let Some(requests) = known_requests {
        let status = derive_status(requests, Some(viewer));
        if status != ListingStatus::Available {
            return Ok((SubmitOutcome::NotAvailable(status), None));
        }
    }

    let Some(guard) = in_flight.try_begin(listing_id) else {
        tracing::debug!("Request for food {} already in flight", listing_id);
        return Ok((SubmitOutcome::AlreadyInFlight, None));
    };

    match api.request_food(listing_id).await {
        Ok(ack) => {
            tracing::info!(
                "Food request created for {}: {}",
                listing_id,
                ack.message.as_deref().unwrap_or("ok")
            );
            notifier.notify(Notification::success("Food request submitted successfully!"));
            Ok((SubmitOutcome::Submitted, Some(guard)))
        }
        Err(e) => {
            tracing::error!("Error requesting food {}: {}", listing_id, e);
            notifier.notify(Notification::error(
                e.user_message("Failed to request food. Please try again."),
            ));
            Err(e)
        }
    }
}
