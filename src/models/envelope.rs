//! Response envelopes.
//!
//! The backend is inconsistent about where it puts payloads: lists arrive bare or
//! under `donations`, `requests`, `foods` or `data`; single documents arrive bare or
//! under `data` or `user`. Every response is normalized here, once, before any view
//! sees it.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::AppError;

/// A list response in any of the shapes the backend produces.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Keyed(KeyedList<T>),
}

/// Keyed list shape. Keys are checked in declaration order.
#[derive(Debug, Deserialize)]
pub struct KeyedList<T> {
    pub donations: Option<Vec<T>>,
    pub requests: Option<Vec<T>>,
    pub foods: Option<Vec<T>>,
    pub data: Option<Vec<T>>,
}

impl<T> ListEnvelope<T> {
    /// The carried list. A keyed body with none of the known keys is empty.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Keyed(keyed) => keyed
                .donations
                .or(keyed.requests)
                .or(keyed.foods)
                .or(keyed.data)
                .unwrap_or_default(),
        }
    }
}

/// A single-document response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemEnvelope<T> {
    Data { data: T },
    User { user: T },
    Bare(T),
}

impl<T> ItemEnvelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            ItemEnvelope::Data { data } => data,
            ItemEnvelope::User { user } => user,
            ItemEnvelope::Bare(item) => item,
        }
    }
}

/// Body of a mutation response. Only the message is of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Decode a list response body.
pub fn decode_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, AppError> {
    if body.trim().is_empty() || body.trim() == "null" {
        return Ok(Vec::new());
    }
    let envelope: ListEnvelope<T> = serde_json::from_str(body)
        .map_err(|e| AppError::Decode(format!("Unexpected list response: {}", e)))?;
    Ok(envelope.into_vec())
}

/// Decode a single-document response body.
pub fn decode_item<T: DeserializeOwned>(body: &str) -> Result<T, AppError> {
    let envelope: ItemEnvelope<T> = serde_json::from_str(body)
        .map_err(|e| AppError::Decode(format!("Unexpected response: {}", e)))?;
    Ok(envelope.into_inner())
}

/// Decode a mutation response body; anything unrecognized is an empty acknowledgement.
pub fn decode_ack(body: &str) -> Acknowledgement {
    serde_json::from_str(body).unwrap_or_default()
}
