//! HTTP client for the fltik profile-lookup API.
//!
//! Wraps `reqwest` with lookup-specific error classification, API key
//! management, and normalization of the loosely-shaped upstream JSON into a
//! display-ready [`ProfileRecord`].

mod client;
mod error;
mod normalize;
mod types;

pub use client::ProfileClient;
pub use error::LookupError;
pub use normalize::{normalize_profile, Count, ProfileRecord};
pub use types::ProfilePayload;
