//! Leptos components wrapping the zone editor engine and the event poller.

pub mod notification_toasts;
pub mod zone_editor;
