//! Food request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FoodListing, UserRef};

/// Lifecycle status of a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The listing a request points at: an id, or the populated listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FoodRef {
    Id(String),
    Listing(Box<FoodListing>),
}

/// A viewer's request for a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodRequest {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food: Option<FoodRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_name: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl FoodRequest {
    /// Id of the requested listing, from whichever field the backend filled.
    pub fn listing_id(&self) -> Option<&str> {
        match &self.food {
            Some(FoodRef::Id(id)) => Some(id),
            Some(FoodRef::Listing(listing)) => Some(&listing.id),
            None => self.food_id.as_deref(),
        }
    }

    /// The populated listing, when the backend embedded it.
    pub fn listing(&self) -> Option<&FoodListing> {
        match &self.food {
            Some(FoodRef::Listing(listing)) => Some(listing),
            _ => None,
        }
    }

    pub fn is_by(&self, uid: &str) -> bool {
        self.requested_by
            .as_ref()
            .map(|r| r.matches(uid))
            .unwrap_or(false)
    }

    /// Requester name for the donor's view.
    pub fn requester_display_name(&self) -> &str {
        self.requested_by
            .as_ref()
            .and_then(UserRef::display_name)
            .or(self.requester_name.as_deref())
            .unwrap_or("Anonymous")
    }
}
