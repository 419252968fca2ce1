//! Networking modules for the event-listing REST API.
//!
//! `api` owns HTTP calls and the session check, `types` defines the wire
//! schema shared with the backend.

pub mod api;
pub mod types;
