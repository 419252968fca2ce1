//! Wire DTOs for the backend event-listing endpoint.
//!
//! DESIGN
//! ======
//! Only `id` and `timestamp` are required on an event; everything else the
//! backend may omit falls back to a default so a partial record still decodes
//! and can be shown as a toast.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Backend event identifier. Newer events carry larger ids.
pub type EventId = i64;

/// Colour-coded severity assigned by the detection pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Red,
    Yellow,
    #[default]
    Blue,
}

impl Severity {
    /// CSS modifier used by the toast stack.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Red => "toast--red",
            Self::Yellow => "toast--yellow",
            Self::Blue => "toast--blue",
        }
    }
}

/// One detection event as returned by `GET /api/v1/events`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    /// ISO-8601 detection time, kept as the backend formatted it.
    pub timestamp: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub camera_id: String,
    #[serde(default)]
    pub camera_name: Option<String>,
    #[serde(default)]
    pub camera_location: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub is_false_positive: bool,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl EventRecord {
    /// Camera label for display, falling back to the raw camera id.
    #[must_use]
    pub fn camera_label(&self) -> &str {
        match self.camera_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ if !self.camera_id.is_empty() => &self.camera_id,
            _ => "unknown camera",
        }
    }

    /// Human-readable one-line summary used as toast text.
    #[must_use]
    pub fn message(&self) -> String {
        let kind = if self.event_type.is_empty() { "Event" } else { self.event_type.as_str() };
        let mut text = format!("{kind} detected on {}", self.camera_label());
        if let Some(location) = self.camera_location.as_deref().filter(|l| !l.is_empty()) {
            text.push_str(&format!(" ({location})"));
        }
        text
    }
}

/// Paginated envelope around a page of events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub items: Vec<EventRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub pages: u32,
}
