//! Client-side reactive state models.

pub mod notifications;
pub mod zone_editor;
