//! Food listing model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FoodRequest, UserRef};

/// A posted surplus-food item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodListing {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub food_name: String,
    /// Older documents carry the name here; some carry both
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub food_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Hosted image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Owner of the listing, either an id or a populated user document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donated_by: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_name: Option<String>,
}

impl FoodListing {
    /// Name to display, with a placeholder for unnamed listings.
    pub fn display_name(&self) -> &str {
        self.title().unwrap_or("Unknown Food")
    }

    /// The listing's name, if either name field carries one.
    pub fn title(&self) -> Option<&str> {
        [Some(self.food_name.as_str()), self.name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|n| !n.is_empty())
    }

    /// Hosted image URL, from whichever field the backend filled.
    pub fn image_ref(&self) -> Option<&str> {
        self.image
            .as_deref()
            .or(self.image_url.as_deref())
            .filter(|url| !url.is_empty())
    }

    pub fn donor(&self) -> Option<&UserRef> {
        self.donor.as_ref().or(self.donated_by.as_ref())
    }
}

/// Payload for `POST /food/donate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    pub food_name: String,
    pub food_description: String,
    pub expiry_date: String,
    pub expiry_time: String,
    pub location: String,
    pub image_url: String,
}

/// Response of `GET /food/:foodId`: the listing with its requests.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodDetails {
    pub food: FoodListing,
    #[serde(default)]
    pub requests: Vec<FoodRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_from_backend_document() {
        let json = r#"{
            "_id": "665f1c",
            "foodName": "Vegetable curry",
            "foodDescription": "Four portions",
            "expiryDate": "2030-05-01",
            "expiryTime": "18:30",
            "location": "Dhaka, Mirpur 10",
            "image": "https://res.cloudinary.com/demo/image/upload/v1/food-donations/food-1-abc.jpg",
            "createdAt": "2030-04-30T10:00:00.000Z",
            "donatedBy": "uid-donor",
            "donorName": "Rahim"
        }"#;

        let listing: FoodListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.id, "665f1c");
        assert_eq!(listing.display_name(), "Vegetable curry");
        assert_eq!(listing.location.as_deref(), Some("Dhaka, Mirpur 10"));
        assert!(listing.created_at.is_some());
        assert!(listing.donor().unwrap().matches("uid-donor"));
        assert!(listing.image_ref().unwrap().ends_with("food-1-abc.jpg"));
    }

    #[test]
    fn test_sparse_listing_defaults() {
        let listing: FoodListing = serde_json::from_str(r#"{"id":"x1"}"#).unwrap();
        assert_eq!(listing.display_name(), "Unknown Food");
        assert!(listing.expiry_date.is_none());
        assert!(listing.image_ref().is_none());
        assert!(listing.donor().is_none());
    }

    #[test]
    fn test_listing_with_both_field_forms() {
        let json = r#"{
            "_id": "a",
            "foodName": "",
            "name": "Rice",
            "image": "https://img/a.jpg",
            "imageUrl": "https://img/b.jpg",
            "donor": "uid-1",
            "donatedBy": "uid-2"
        }"#;

        let listing: FoodListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.display_name(), "Rice");
        assert_eq!(listing.image_ref(), Some("https://img/a.jpg"));
        assert!(listing.donor().unwrap().matches("uid-1"));

        let only_url: FoodListing =
            serde_json::from_str(r#"{"_id":"b","imageUrl":"https://img/c.jpg"}"#).unwrap();
        assert_eq!(only_url.image_ref(), Some("https://img/c.jpg"));
    }

    #[test]
    fn test_new_donation_wire_names() {
        let donation = NewDonation {
            food_name: "Bread".to_string(),
            food_description: "Two loaves".to_string(),
            expiry_date: "2030-01-01".to_string(),
            expiry_time: "09:00".to_string(),
            location: "Main St".to_string(),
            image_url: "https://img/1.jpg".to_string(),
        };
        let value = serde_json::to_value(&donation).unwrap();
        assert_eq!(value["foodName"], "Bread");
        assert_eq!(value["imageUrl"], "https://img/1.jpg");
        assert_eq!(value["expiryTime"], "09:00");
    }
}
