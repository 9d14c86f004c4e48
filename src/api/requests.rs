//! Request lifecycle endpoints.

use reqwest::Method;
use serde::Serialize;

use super::ApiClient;
use crate::errors::AppError;
use crate::models::{Acknowledgement, FoodRequest, RequestStatus};

/// Request body for `PATCH /request/:requestId/status`.
#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: RequestStatus,
}

impl ApiClient {
    /// POST /food/request/:foodId - Request a listing as the signed-in user.
    pub async fn request_food(&self, food_id: &str) -> Result<Acknowledgement, AppError> {
        self.mutate::<()>(Method::POST, &["food", "request", food_id], None)
            .await
    }

    /// GET /food/requests/my-requests - List requests made by the signed-in user.
    pub async fn list_my_requests(&self) -> Result<Vec<FoodRequest>, AppError> {
        self.get_list(&["food", "requests", "my-requests"]).await
    }

    /// PATCH /request/:requestId/status - Move a request to a new status.
    ///
    /// Any transition is sent as-is; legality is decided by the backend.
    pub async fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<Acknowledgement, AppError> {
        self.mutate(
            Method::PATCH,
            &["request", request_id, "status"],
            Some(&StatusUpdate { status }),
        )
        .await
    }
}
