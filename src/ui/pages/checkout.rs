//! Checkout page
//!
//! Resumes the stored checkout session when it belongs to the same repo,
//! otherwise asks the backend for a new payment session and stores it.

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::{use_navigate, use_params_map};

use super::layout::PageLayout;
use crate::core::{CheckoutSession, CheckoutStatus, PersistedStore};
use crate::ui::browser::BrowserStorage;

#[component]
pub fn CheckoutPage() -> impl IntoView {
    let params = use_params_map();
    let repo_id = Memo::new(move |_| params.get().get("id").unwrap_or_default());
    let status = RwSignal::new(CheckoutStatus::Starting);
    let store = StoredValue::new(PersistedStore::<CheckoutSession, BrowserStorage>::load(
        BrowserStorage,
    ));

    // Apply a transition, persist it and mirror the new status
    let transition = move |f: &dyn Fn(&mut CheckoutSession)| {
        let saved = store.try_update_value(|s| s.update(|session| f(session)));
        if let Some(Err(e)) = saved {
            leptos::logging::warn!("Checkout session not persisted: {}", e);
        }
        if let Some(current) = store.try_with_value(|s| s.get().status.clone()) {
            status.set(current);
        }
    };

    #[cfg(not(feature = "ssr"))]
    Effect::new(move |_| {
        use crate::core::RepoClient;
        use crate::ui::browser::FetchTransport;
        use crate::ui::notifications::use_notifications;
        use leptos::task::spawn_local;

        let id = repo_id.get();
        let notifications = use_notifications();

        transition(&|session| {
            session.resume(&id);
        });
        if status.get_untracked() != CheckoutStatus::Starting {
            leptos::logging::log!("Resuming checkout for repo {}", id);
            return;
        }

        spawn_local(async move {
            let client = RepoClient::new(FetchTransport, notifications);
            match client.start_checkout(&id).await {
                Ok(secret) => transition(&|session| session.begin(id.clone(), secret.clone())),
                Err(e) => {
                    let message = e.user_message();
                    transition(&|session| session.fail(message.clone()));
                }
            }
        });
    });

    let on_cancel = move |_| {
        transition(&CheckoutSession::clear);
        let navigate = use_navigate();
        navigate(&format!("/preview/{}", repo_id.get_untracked()), Default::default());
    };

    view! {
        <PageLayout>
            <div class="checkout-page card">
                <h1 class="page-title">"Checkout"</h1>
                {move || match status.get() {
                    CheckoutStatus::Idle | CheckoutStatus::Starting => {
                        view! { <p class="page-status">"Preparing payment..."</p> }.into_any()
                    }
                    CheckoutStatus::Open { resumed } => {
                        view! {
                            <p>
                                {if resumed {
                                    "Welcome back. Your payment session is still open."
                                } else {
                                    "Your payment session is ready."
                                }}
                            </p>
                            <div class="payment-slot" data-theme=move || {
                                store.with_value(|s| s.get().appearance.theme.clone())
                            } />
                            <button class="btn-secondary" on:click=on_cancel>"Cancel checkout"</button>
                        }
                            .into_any()
                    }
                    CheckoutStatus::Failed(message) => {
                        view! {
                            <div class="error-banner" role="alert">{message}</div>
                            <A href=move || format!("/preview/{}", repo_id.get()) attr:class="btn-secondary">
                                "Back to repo"
                            </A>
                        }
                            .into_any()
                    }
                }}
            </div>
        </PageLayout>
    }
}
