//! Landing page
//!
//! Pitch plus a quick way to jump to a repo preview by id.

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use super::layout::PageLayout;
use crate::core::api::validate_repo_id;
use crate::ui::auth::{AuthState, use_auth_context};

#[component]
pub fn LandingPage() -> impl IntoView {
    let auth = use_auth_context();
    let repo_id = RwSignal::new(String::new());
    let id_error = RwSignal::new(None::<String>);

    let on_open = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let id = repo_id.get_untracked();
        match validate_repo_id(id.trim()) {
            Ok(id) => {
                id_error.set(None);
                let navigate = use_navigate();
                navigate(&format!("/preview/{}", id), Default::default());
            }
            Err(e) => id_error.set(Some(e.to_string())),
        }
    };

    view! {
        <PageLayout>
            <section class="hero">
                <h1 class="hero-title">"Buy and sell ready-made React components"</h1>
                <p class="hero-subtitle">
                    "Every listing ships with its source. Try it live in the browser before you buy."
                </p>
                <div class="hero-actions">
                    {move || match auth.state.get() {
                        AuthState::Authenticated(user) => {
                            view! {
                                <A href=user.role.home_path() attr:class="btn-primary">
                                    "Go to dashboard"
                                </A>
                            }
                                .into_any()
                        }
                        _ => {
                            view! { <A href="/login" attr:class="btn-primary">"Sign in to start selling"</A> }
                                .into_any()
                        }
                    }}
                </div>
            </section>

            <section class="card">
                <h2 class="card-title">"Open a preview"</h2>
                <form class="inline-form" on:submit=on_open>
                    <input
                        type="text"
                        placeholder="Repo id"
                        prop:value=move || repo_id.get()
                        on:input=move |ev| repo_id.set(event_target_value(&ev))
                    />
                    <button type="submit" class="btn-secondary">"Preview"</button>
                </form>
                {move || id_error.get().map(|e| view! { <p class="field-error">{e}</p> })}
            </section>
        </PageLayout>
    }
}
