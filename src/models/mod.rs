//! Data models for the food donation marketplace.
//!
//! These models match the backend JSON documents. The backend owns every record;
//! the client only holds short-lived copies that are refetched after each mutation.

mod envelope;
mod listing;
mod request;
mod user;

pub use envelope::*;
pub use listing::*;
pub use request::*;
pub use user::*;
