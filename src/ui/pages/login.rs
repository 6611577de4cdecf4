//! Login page component
//!
//! Sends the user back to `?redirect=` after sign-in, or to their role's
//! home when no redirect was requested.

use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_query_map};

use super::layout::PageLayout;
use crate::core::{Role, SessionUser};
use crate::ui::auth::{AuthState, LoginForm, use_auth_context};

/// Only same-site absolute paths are followed
fn redirect_target(requested: Option<String>, role: Role) -> String {
    match requested {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && path != "/login" => path,
        _ => role.home_path().to_string(),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth_context();
    let query = use_query_map();

    let requested = move || query.with_untracked(|q| q.get("redirect"));

    // Already signed in: skip the form
    Effect::new(move |_| {
        if let AuthState::Authenticated(user) = auth.state.get() {
            let navigate = use_navigate();
            navigate(&redirect_target(requested(), user.role), Default::default());
        }
    });

    let on_success = move |user: SessionUser| {
        let navigate = use_navigate();
        navigate(&redirect_target(requested(), user.role), Default::default());
    };

    view! {
        <PageLayout>
            <div class="auth-page">
                <LoginForm on_success=Callback::new(on_success) />
            </div>
        </PageLayout>
    }
}
