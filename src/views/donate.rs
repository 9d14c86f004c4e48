//! Donation form and its two-phase submission.
//!
//! The image goes to the asset host first; the listing is created second and points
//! at the hosted URL. When the second step fails the upload is deleted again so no
//! hosted image is left behind for a listing that does not exist.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::api::ApiClient;
use crate::assets::{AssetHost, ImageUpload, UploadedAsset, MAX_IMAGE_BYTES};
use crate::errors::{AppError, Field, ValidationErrors};
use crate::models::NewDonation;
use crate::notify::{Notification, Notifier};

/// Raw form input as entered by the donor.
#[derive(Debug, Clone, Default)]
pub struct DonationForm {
    pub food_name: String,
    pub food_description: String,
    /// `YYYY-MM-DD`
    pub expiry_date: String,
    /// `HH:MM`
    pub expiry_time: String,
    pub location: String,
    pub image: Option<ImageUpload>,
}

impl DonationForm {
    /// Check every field against `now`, collecting one message per field.
    pub fn validate(&self, now: NaiveDateTime) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.food_name.trim().is_empty() {
            errors.add(Field::FoodName, "Food name is required");
        }
        if self.food_description.trim().is_empty() {
            errors.add(Field::FoodDescription, "Food description is required");
        }

        let date = self.expiry_date.trim();
        let time = self.expiry_time.trim();
        let parsed_date = if date.is_empty() {
            errors.add(Field::ExpiryDate, "Expiry date is required");
            None
        } else {
            let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
            if parsed.is_none() {
                errors.add(Field::ExpiryDate, "Please enter a valid expiry date");
            }
            parsed
        };
        let parsed_time = if time.is_empty() {
            errors.add(Field::ExpiryTime, "Expiry time is required");
            None
        } else {
            let parsed = parse_time(time);
            if parsed.is_none() {
                errors.add(Field::ExpiryTime, "Please enter a valid expiry time");
            }
            parsed
        };
        if let (Some(date), Some(time)) = (parsed_date, parsed_time) {
            if date.and_time(time) <= now {
                errors.add(Field::ExpiryDate, "Expiry date must be in the future");
            }
        }

        if self.location.trim().is_empty() {
            errors.add(Field::Location, "Location is required");
        }

        match &self.image {
            None => errors.add(Field::Image, "Food image is required"),
            Some(image) if !image.is_image() || image.is_empty() => {
                errors.add(Field::Image, "Please select a valid image file");
            }
            Some(image) if image.len() > MAX_IMAGE_BYTES => {
                errors.add(Field::Image, "Image size should be less than 10MB");
            }
            Some(_) => {}
        }

        errors
    }

    fn to_donation(&self, image_url: String) -> NewDonation {
        NewDonation {
            food_name: self.food_name.trim().to_string(),
            food_description: self.food_description.trim().to_string(),
            expiry_date: self.expiry_date.trim().to_string(),
            expiry_time: self.expiry_time.trim().to_string(),
            location: self.location.trim().to_string(),
            image_url,
        }
    }
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()
}

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationReceipt {
    pub donation: NewDonation,
    pub asset: UploadedAsset,
    pub message: Option<String>,
}

pub struct DonationFlow {
    api: ApiClient,
    assets: Arc<dyn AssetHost>,
    notifier: Arc<dyn Notifier>,
}

impl DonationFlow {
    pub fn new(api: ApiClient, assets: Arc<dyn AssetHost>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            assets,
            notifier,
        }
    }

    /// Validate, upload the image, then create the listing.
    ///
    /// Validation failures return before any network call. A failed listing create
    /// deletes the uploaded image on a best-effort basis; the caller sees one error.
    pub async fn submit(
        &self,
        form: &DonationForm,
        viewer: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<DonationReceipt, AppError> {
        if viewer.is_none() {
            let msg = "Please log in to donate food";
            self.notifier.notify(Notification::error(msg));
            return Err(AppError::Unauthenticated(msg.to_string()));
        }

        form.validate(now).into_result()?;
        let Some(image) = form.image.as_ref() else {
            return Err(AppError::Validation(ValidationErrors::new()));
        };

        let asset = match self.assets.upload(image).await {
            Ok(asset) => asset,
            Err(e) => {
                tracing::error!("Image upload failed: {}", e);
                self.notifier.notify(Notification::error(
                    e.user_message("Error submitting donation. Please try again."),
                ));
                return Err(e);
            }
        };

        let donation = form.to_donation(asset.secure_url.clone());
        match self.api.create_donation(&donation).await {
            Ok(ack) => {
                tracing::info!("Donation created for {}", donation.food_name);
                self.notifier
                    .notify(Notification::success("Food donation submitted successfully!"));
                Ok(DonationReceipt {
                    donation,
                    asset,
                    message: ack.message,
                })
            }
            Err(e) => {
                tracing::error!("Error submitting donation: {}", e);
                if let Err(cleanup) = self.assets.delete(&asset).await {
                    tracing::warn!(
                        "Could not delete orphaned image {}: {}",
                        asset.public_id,
                        cleanup
                    );
                }
                self.notifier.notify(Notification::error(
                    e.user_message("Error submitting donation. Please try again."),
                ));
                Err(e)
            }
        }
    }
}
