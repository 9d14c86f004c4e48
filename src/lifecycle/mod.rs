//! Request lifecycle derivation.
//!
//! Given the requests fetched for one listing and the viewer, computes the display
//! status and whether the viewer may request the listing. Every view derives status
//! through these functions and nothing else; results are never cached, so the
//! latest fetch is always the source of truth.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::models::{FoodRequest, RequestStatus};

/// Display status of a listing for one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    /// No approved request, and none pending or approved by the viewer
    Available,
    /// The viewer's own request is pending
    Pending,
    /// The viewer's own request is approved
    Approved,
    /// Some request is approved; unavailable to everyone
    Taken,
}

impl ListingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ListingStatus::Available => "Available",
            ListingStatus::Pending => "Pending",
            ListingStatus::Approved => "Approved",
            ListingStatus::Taken => "Unavailable",
        }
    }
}

/// Label of the request control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionLabel {
    Request,
    Requesting,
    SignInToRequest,
    Unavailable,
    Pending,
    Approved,
}

impl ActionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionLabel::Request => "Request",
            ActionLabel::Requesting => "Requesting...",
            ActionLabel::SignInToRequest => "Log in to request",
            ActionLabel::Unavailable => "Unavailable",
            ActionLabel::Pending => "Pending",
            ActionLabel::Approved => "Approved",
        }
    }
}

/// State of the request control. Disabled controls stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestAction {
    pub enabled: bool,
    pub label: ActionLabel,
}

/// True iff any request on the listing is approved.
pub fn is_unavailable(requests: &[FoodRequest]) -> bool {
    requests
        .iter()
        .any(|r| r.status == RequestStatus::Approved)
}

/// The viewer's live request on the listing.
///
/// Only pending and approved requests count. When the backend holds several for the
/// same viewer, an approved one is preferred.
pub fn own_request<'a>(requests: &'a [FoodRequest], viewer: &str) -> Option<&'a FoodRequest> {
    let mut mine = requests.iter().filter(|r| {
        r.is_by(viewer) && matches!(r.status, RequestStatus::Pending | RequestStatus::Approved)
    });
    let first = mine.next()?;
    if first.status == RequestStatus::Approved {
        return Some(first);
    }
    Some(
        mine.find(|r| r.status == RequestStatus::Approved)
            .unwrap_or(first),
    )
}

/// Status of the viewer's most relevant request, of any status.
pub fn own_request_status(requests: &[FoodRequest], viewer: Option<&str>) -> Option<RequestStatus> {
    let viewer = viewer?;
    own_request(requests, viewer)
        .map(|r| r.status)
        .or_else(|| {
            requests
                .iter()
                .find(|r| r.is_by(viewer))
                .map(|r| r.status)
        })
}

/// Derive the listing status. First matching rule wins:
/// an approved request anywhere, then the viewer's own live request, then available.
pub fn derive_status(requests: &[FoodRequest], viewer: Option<&str>) -> ListingStatus {
    if is_unavailable(requests) {
        return ListingStatus::Taken;
    }
    match viewer.and_then(|v| own_request(requests, v)) {
        Some(r) if r.status == RequestStatus::Approved => ListingStatus::Approved,
        Some(_) => ListingStatus::Pending,
        None => ListingStatus::Available,
    }
}

/// Derive the request control for the viewer.
///
/// On a taken listing the approved requester sees "Approved"; everyone else sees
/// "Unavailable".
pub fn request_action(
    requests: &[FoodRequest],
    viewer: Option<&str>,
    in_flight: bool,
) -> RequestAction {
    let disabled = |label| RequestAction {
        enabled: false,
        label,
    };

    if in_flight {
        return disabled(ActionLabel::Requesting);
    }

    match derive_status(requests, viewer) {
        ListingStatus::Taken => {
            let approved_for_viewer = viewer
                .and_then(|v| own_request(requests, v))
                .map(|r| r.status == RequestStatus::Approved)
                .unwrap_or(false);
            if approved_for_viewer {
                disabled(ActionLabel::Approved)
            } else {
                disabled(ActionLabel::Unavailable)
            }
        }
        ListingStatus::Pending => disabled(ActionLabel::Pending),
        ListingStatus::Approved => disabled(ActionLabel::Approved),
        ListingStatus::Available if viewer.is_none() => disabled(ActionLabel::SignInToRequest),
        ListingStatus::Available => RequestAction {
            enabled: true,
            label: ActionLabel::Request,
        },
    }
}

/// Request count summary, e.g. `3 requests (approved)`.
pub fn request_summary(requests: &[FoodRequest]) -> Option<String> {
    if requests.is_empty() {
        return None;
    }
    let plural = if requests.len() == 1 { "" } else { "s" };
    let approved = if is_unavailable(requests) {
        " (approved)"
    } else {
        ""
    };
    Some(format!("{} request{}{}", requests.len(), plural, approved))
}

/// Set of ids with an outstanding submission.
///
/// Ids are added when a submission starts and removed when its guard drops, so a
/// settled submission, successful or not, always frees the id. Advisory only; the
/// backend decides what counts as a duplicate.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as in flight. `None` if it already was.
    pub fn try_begin(&self, id: &str) -> Option<InFlightGuard> {
        let mut ids = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        if !ids.insert(id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            ids: Arc::clone(&self.ids),
            id: id.to_string(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }
}

/// Removes its id from the in-flight set when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    ids: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl InFlightGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}
