#[cfg(test)]
#[path = "notifications_test.rs"]
mod notifications_test;

use crate::net::types::{EventId, EventRecord, Severity};

pub const MAX_VISIBLE_TOASTS: usize = 5;

pub type ToastId = u64;

/// One on-screen notification for a detection event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub event_id: EventId,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Toast stack fed by the event poller.
///
/// Provided via context as `RwSignal<NotificationState>`. Newest toasts are
/// last; the oldest is evicted once `max_visible` is exceeded. `unread`
/// counts every pushed event until `mark_all_read`, evicted ones included.
#[derive(Clone, Debug)]
pub struct NotificationState {
    pub toasts: Vec<Toast>,
    pub unread: usize,
    pub max_visible: usize,
    next_id: ToastId,
}

impl Default for NotificationState {
    fn default() -> Self {
        Self { toasts: Vec::new(), unread: 0, max_visible: MAX_VISIBLE_TOASTS, next_id: 1 }
    }
}

impl NotificationState {
    pub fn push(&mut self, event: &EventRecord) -> ToastId {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            event_id: event.id,
            severity: event.severity,
            title: severity_title(event.severity).to_owned(),
            message: event.message(),
        });
        let overflow = self.toasts.len().saturating_sub(self.max_visible);
        self.toasts.drain(..overflow);
        self.unread += 1;
        id
    }

    /// Remove a toast. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    pub fn mark_all_read(&mut self) {
        self.unread = 0;
    }
}

fn severity_title(severity: Severity) -> &'static str {
    match severity {
        Severity::Red => "Critical detection",
        Severity::Yellow => "Detection warning",
        Severity::Blue => "New detection",
    }
}
