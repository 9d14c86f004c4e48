//! Foodshare client
//!
//! Client for a peer-to-peer surplus-food marketplace: session handling over an
//! external auth provider, a typed REST client for the marketplace backend, image
//! hosting for listing photos, and the view models that derive request state.

pub mod api;
pub mod assets;
pub mod auth;
pub mod config;
pub mod errors;
pub mod format;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod search;
pub mod views;
