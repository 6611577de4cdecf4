//! Not found page component

use leptos::prelude::*;
use leptos_router::components::A;

use super::layout::PageLayout;

/// Not found (404) page component
#[component]
pub fn NotFoundPage() -> impl IntoView {
    #[cfg(feature = "ssr")]
    if let Some(response) = use_context::<leptos_axum::ResponseOptions>() {
        response.set_status(axum::http::StatusCode::NOT_FOUND);
    }

    view! {
        <PageLayout>
            <div class="status-page">
                <h1 class="status-code">"404"</h1>
                <h2 class="status-title">"Page Not Found"</h2>
                <p class="status-text">"The page you're looking for doesn't exist or has been moved."</p>
                <div class="status-actions">
                    <A href="/" attr:class="btn-primary">"Go Home"</A>
                    <A href="/dashboard" attr:class="btn-secondary">"Dashboard"</A>
                </div>
            </div>
        </PageLayout>
    }
}
