//! Shared page chrome: top bar with the signed-in user and a logout button

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::ui::auth::{AuthState, logout, use_auth_context};

#[component]
pub fn AppHeader() -> impl IntoView {
    let auth = use_auth_context();

    let on_logout = move |_| {
        spawn_local(async move {
            logout().await;
            let navigate = use_navigate();
            navigate("/", Default::default());
        });
    };

    view! {
        <header class="app-header">
            <A href="/" attr:class="brand">"Repo Market"</A>
            <nav class="app-header-actions">
                {move || match auth.state.get() {
                    AuthState::Loading => ().into_any(),
                    AuthState::Unauthenticated => {
                        view! { <A href="/login" attr:class="btn-secondary">"Sign in"</A> }.into_any()
                    }
                    AuthState::Authenticated(user) => {
                        view! {
                            <A href="/dashboard" attr:class="header-link">"Dashboard"</A>
                            <span class="header-user" title=user.email.clone()>
                                {user.username.clone()}
                                <span class="role-badge">{user.role.display_name()}</span>
                            </span>
                            <button class="btn-secondary" on:click=on_logout>"Sign out"</button>
                        }
                            .into_any()
                    }
                }}
            </nav>
        </header>
    }
}

/// Header plus a main column
#[component]
pub fn PageLayout(children: Children) -> impl IntoView {
    view! {
        <div class="page">
            <AppHeader />
            <main class="page-main">{children()}</main>
        </div>
    }
}
