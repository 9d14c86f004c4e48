//! Food listing endpoints.

use reqwest::Method;

use super::ApiClient;
use crate::errors::AppError;
use crate::models::{Acknowledgement, FoodDetails, FoodListing, FoodRequest, NewDonation};

impl ApiClient {
    /// POST /food/donate - Create a listing.
    pub async fn create_donation(
        &self,
        donation: &NewDonation,
    ) -> Result<Acknowledgement, AppError> {
        self.mutate(Method::POST, &["food", "donate"], Some(donation))
            .await
    }

    /// GET /food/donations - List all listings.
    pub async fn list_donations(&self) -> Result<Vec<FoodListing>, AppError> {
        self.get_list(&["food", "donations"]).await
    }

    /// GET /food/:foodId - Fetch one listing together with its requests.
    pub async fn get_food(&self, food_id: &str) -> Result<FoodDetails, AppError> {
        self.get_item(&["food", food_id]).await
    }

    /// GET /food/:foodId/request - List requests for a listing.
    pub async fn list_food_requests(&self, food_id: &str) -> Result<Vec<FoodRequest>, AppError> {
        self.get_list(&["food", food_id, "request"]).await
    }

    /// GET /food/donated-foods - List listings owned by the signed-in user.
    pub async fn list_donated_foods(&self) -> Result<Vec<FoodListing>, AppError> {
        self.get_list(&["food", "donated-foods"]).await
    }
}
