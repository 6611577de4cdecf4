//! Toast notifications
//!
//! [`NotificationManager`] is the reactive [`Notify`] implementation handed to
//! the fetch boundary; [`NotificationsContainer`] renders its queue.

use crate::core::{Notification, NotificationType, Notify};
use leptos::prelude::*;
use std::collections::VecDeque;

/// Maximum number of notifications to show at once
const MAX_NOTIFICATIONS: usize = 5;

/// Notification item with unique ID for tracking
#[derive(Clone, Debug, PartialEq)]
pub struct NotificationItem {
    pub id: u64,
    pub notification: Notification,
}

/// Append to the queue, dropping the oldest entries beyond the limit
fn push_bounded(queue: &mut VecDeque<NotificationItem>, item: NotificationItem) {
    queue.push_back(item);
    while queue.len() > MAX_NOTIFICATIONS {
        queue.pop_front();
    }
}

/// Notifications container component
/// Place this once at the app root
#[component]
pub fn NotificationsContainer() -> impl IntoView {
    let manager = use_notifications();
    let notifications = manager.notifications();

    view! {
        <div class="toast-container" role="status">
            <For
                each=move || notifications.get()
                key=|item| item.id
                children=move |item| view! { <NotificationToast item=item manager=manager /> }
            />
        </div>
    }
}

#[component]
fn NotificationToast(item: NotificationItem, manager: NotificationManager) -> impl IntoView {
    let id = item.id;
    let notification = item.notification;

    // Errors stay until dismissed
    if let Some(_ms) = notification.auto_dismiss_ms {
        #[cfg(not(feature = "ssr"))]
        {
            use gloo_timers::future::TimeoutFuture;
            use wasm_bindgen_futures::spawn_local;

            spawn_local(async move {
                TimeoutFuture::new(_ms).await;
                manager.dismiss(id);
            });
        }
    }

    let tone_class = match notification.notification_type {
        NotificationType::Success => "toast toast-success",
        NotificationType::Error => "toast toast-error",
        NotificationType::Warning => "toast toast-warning",
        NotificationType::Info => "toast toast-info",
    };

    let message = (!notification.message.is_empty()).then(|| {
        let message = notification.message.clone();
        view! { <p class="toast-message">{message}</p> }
    });

    view! {
        <div class=tone_class>
            <div class="toast-body">
                <h4 class="toast-title">{notification.title.clone()}</h4>
                {message}
            </div>
            <button
                class="toast-close"
                aria-label="Dismiss"
                on:click=move |_| manager.dismiss(id)
            >
                "×"
            </button>
        </div>
    }
}

/// Reactive notification queue
#[derive(Clone, Copy)]
pub struct NotificationManager {
    notifications: RwSignal<VecDeque<NotificationItem>>,
    next_id: StoredValue<u64>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            notifications: RwSignal::new(VecDeque::new()),
            next_id: StoredValue::new(0),
        }
    }

    /// Get the notifications signal for the container
    pub fn notifications(&self) -> RwSignal<VecDeque<NotificationItem>> {
        self.notifications
    }

    /// Add a success notification
    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Notification::success(title, message));
    }

    /// Add an error notification
    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Notification::error(title, message));
    }

    pub fn dismiss(&self, id: u64) {
        self.notifications.update(|n| n.retain(|i| i.id != id));
    }

    /// Clear all notifications
    pub fn clear(&self) {
        self.notifications.set(VecDeque::new());
    }
}

impl Notify for NotificationManager {
    fn notify(&self, notification: Notification) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);

        self.notifications
            .update(|n| push_bounded(n, NotificationItem { id, notification }));
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Provide the notification manager to the component tree
pub fn provide_notifications() -> NotificationManager {
    let manager = NotificationManager::new();
    provide_context(manager);
    manager
}

pub fn use_notifications() -> NotificationManager {
    expect_context::<NotificationManager>()
}
