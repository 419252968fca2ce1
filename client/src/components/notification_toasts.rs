//! Toast stack fed by an [`EventPoller`].
//!
//! Registers a listener on mount and removes it on cleanup, so the poller
//! outlives any one toast stack. With `autostart` the component also owns
//! the poller run and stops it on cleanup.

use std::rc::Rc;

use leptos::prelude::*;

use crate::net::types::EventRecord;
use crate::poller::{EventPoller, EventSource, Listener, Runtime};
use crate::state::notifications::{NotificationState, Toast, ToastId};

const DEFAULT_AUTO_DISMISS_MS: u32 = 8_000;

#[cfg(feature = "hydrate")]
fn schedule_dismiss(notifications: RwSignal<NotificationState>, toast_id: ToastId, after_ms: u32) {
    if after_ms == 0 {
        return;
    }
    gloo_timers::callback::Timeout::new(after_ms, move || {
        notifications.update(|n| {
            n.dismiss(toast_id);
        });
    })
    .forget();
}

#[cfg(not(feature = "hydrate"))]
fn schedule_dismiss(_notifications: RwSignal<NotificationState>, _toast_id: ToastId, _after_ms: u32) {}

#[component]
pub fn NotificationToasts<S, R>(
    poller: EventPoller<S, R>,
    #[prop(optional)] autostart: bool,
    /// Milliseconds before a toast dismisses itself; 0 keeps it until closed.
    #[prop(optional)]
    auto_dismiss_ms: Option<u32>,
) -> impl IntoView
where
    S: EventSource + 'static,
    R: Runtime + 'static,
{
    let notifications = expect_context::<RwSignal<NotificationState>>();
    let dismiss_after = auto_dismiss_ms.unwrap_or(DEFAULT_AUTO_DISMISS_MS);

    let listener: Listener = Rc::new(move |event: &EventRecord| {
        if let Some(toast_id) = notifications.try_update(|n| n.push(event)) {
            schedule_dismiss(notifications, toast_id, dismiss_after);
        }
    });
    let listener_id = poller.add_listener(listener);
    if autostart {
        if let Err(err) = poller.start_default(None) {
            leptos::logging::log!("event poller not started: {err}");
        }
    }

    let poller = StoredValue::new_local(poller);
    on_cleanup(move || {
        poller.try_with_value(|p| {
            if autostart {
                p.stop();
            } else {
                p.remove_listener(listener_id);
            }
        });
    });

    view! {
        <div class="toast-stack" aria-live="polite">
            <button
                class="toast-stack__unread"
                class:hidden=move || notifications.get().unread == 0
                on:click=move |_| notifications.update(NotificationState::mark_all_read)
            >
                {move || notifications.get().unread}
            </button>
            <For
                each=move || notifications.get().toasts
                key=|toast| toast.id
                children=move |toast: Toast| {
                    let id = toast.id;
                    view! {
                        <div class=format!("toast {}", toast.severity.css_class())>
                            <strong class="toast__title">{toast.title}</strong>
                            <span class="toast__message">{toast.message}</span>
                            <button
                                class="toast__close"
                                on:click=move |_| notifications.update(|n| {
                                    n.dismiss(id);
                                })
                            >
                                "×"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
