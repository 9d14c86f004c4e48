//! Requests made by the signed-in user.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::ViewEpoch;
use crate::api::ApiClient;
use crate::errors::AppError;
use crate::models::FoodRequest;
use crate::notify::{Notification, Notifier};

pub struct MyRequestsView {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    epoch: ViewEpoch,
    requests: RwLock<Vec<FoodRequest>>,
}

impl MyRequestsView {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            epoch: ViewEpoch::default(),
            requests: RwLock::new(Vec::new()),
        }
    }

    pub async fn refresh(&self, viewer: Option<&str>) -> Result<usize, AppError> {
        if viewer.is_none() {
            return Err(AppError::Unauthenticated(
                "Please log in to view your requests".to_string(),
            ));
        }

        let ticket = self.epoch.begin();
        match self.api.list_my_requests().await {
            Ok(requests) => {
                let count = requests.len();
                if self.epoch.is_current(ticket) {
                    *self.requests.write().await = requests;
                }
                Ok(count)
            }
            Err(e) => {
                tracing::error!("Error fetching my requests: {}", e);
                if self.epoch.is_current(ticket) {
                    self.requests.write().await.clear();
                    self.notifier.notify(Notification::error(
                        "Failed to load your requests. Please try again.",
                    ));
                }
                Err(e)
            }
        }
    }

    pub async fn requests(&self) -> Vec<FoodRequest> {
        self.requests.read().await.clone()
    }

    pub fn tear_down(&self) {
        self.epoch.tear_down();
    }
}
