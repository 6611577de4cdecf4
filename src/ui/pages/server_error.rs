//! Generic error page
//!
//! Shown when a page cannot load its data for a reason other than a missing
//! record. The message is already user-facing.

use leptos::prelude::*;
use leptos_router::components::A;

use super::layout::PageLayout;

#[component]
pub fn ServerErrorPage(
    #[prop(into, default = "Something went wrong on our side. Please try again.".to_string())]
    message: String,
) -> impl IntoView {
    view! {
        <PageLayout>
            <div class="status-page">
                <h1 class="status-code">"500"</h1>
                <h2 class="status-title">"Something went wrong"</h2>
                <p class="status-text">{message}</p>
                <div class="status-actions">
                    <A href="/" attr:class="btn-primary">"Go Home"</A>
                </div>
            </div>
        </PageLayout>
    }
}
