use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use crate::ui::auth::{RequireAccess, provide_auth_context};
use crate::ui::pages::{
    CheckoutPage, DashboardPage, LandingPage, LoginPage, NotFoundPage, RepoEditorPage,
    RepoPreviewPage,
};
use crate::ui::{NotificationsContainer, provide_editor_settings, provide_notifications};

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone() />
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    provide_notifications();
    provide_auth_context();
    provide_editor_settings();

    view! {
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/repo_market.css"/>
        <Title text="Repo Market"/>

        <Router>
            <Routes fallback=|| view! { <NotFoundPage/> }>
                <Route path=path!("/") view=LandingPage/>
                <Route path=path!("/login") view=LoginPage/>
                <Route path=path!("/preview/:id") view=RepoPreviewPage/>
                <Route path=path!("/dashboard") view=guarded_dashboard/>
                <Route path=path!("/dashboard/admin") view=guarded_dashboard/>
                <Route path=path!("/dashboard/moderation") view=guarded_dashboard/>
                <Route path=path!("/dashboard/repos") view=guarded_dashboard/>
                <Route path=path!("/dashboard/sales") view=guarded_dashboard/>
                <Route
                    path=path!("/dashboard/repos/:id/edit")
                    view=|| view! { <RequireAccess><RepoEditorPage/></RequireAccess> }
                />
                <Route
                    path=path!("/checkout/:id")
                    view=|| view! { <RequireAccess><CheckoutPage/></RequireAccess> }
                />
            </Routes>
        </Router>

        <NotificationsContainer/>
    }
}

fn guarded_dashboard() -> impl IntoView {
    view! { <RequireAccess><DashboardPage/></RequireAccess> }
}
