//! Route guard evaluating the access table before any page logic runs

use leptos::prelude::*;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_location;

use super::context::use_auth_context;
use crate::core::{AccessDecision, authorize};

/// Renders `children` only when the current user may open the current path
#[component]
pub fn RequireAccess(children: ChildrenFn) -> impl IntoView {
    let auth = use_auth_context();
    let location = use_location();

    let decision = Memo::new(move |_| {
        let state = auth.state.get();
        // Decide only once the session check has finished
        state
            .is_settled()
            .then(|| authorize(state.role(), &location.pathname.get()))
    });

    move || match decision.get() {
        None => view! { <div class="page-status">"Checking access…"</div> }.into_any(),
        Some(AccessDecision::Allow) => children().into_any(),
        Some(AccessDecision::RequireLogin { redirect }) => {
            view! { <Redirect path=redirect /> }.into_any()
        }
        Some(AccessDecision::Forbidden { redirect }) => {
            leptos::logging::warn!("Access denied to {}", location.pathname.get_untracked());
            view! { <Redirect path=redirect /> }.into_any()
        }
    }
}
