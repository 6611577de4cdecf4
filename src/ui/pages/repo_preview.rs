//! Read-only repo preview page
//!
//! Loads the public preview envelope and renders it live next to the
//! listing description. A missing repo shows the 404 page; any other failure
//! shows the generic error page.

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

use super::layout::PageLayout;
use super::not_found::NotFoundPage;
use super::server_error::ServerErrorPage;
use crate::core::{ApiError, PreviewSource};
use crate::ui::live_preview::LivePreview;
use crate::ui::markdown::Markdown;

#[derive(Clone, Debug, PartialEq)]
enum PreviewLoad {
    Loading,
    Loaded(PreviewSource),
    Missing,
    Failed(String),
}

impl From<Result<PreviewSource, ApiError>> for PreviewLoad {
    fn from(result: Result<PreviewSource, ApiError>) -> Self {
        match result {
            Ok(source) => PreviewLoad::Loaded(source),
            Err(e) if e.is_not_found() || matches!(e, ApiError::InvalidId(_)) => {
                PreviewLoad::Missing
            }
            Err(e) => PreviewLoad::Failed(e.user_message()),
        }
    }
}

#[component]
pub fn RepoPreviewPage() -> impl IntoView {
    let params = use_params_map();
    let repo_id = Memo::new(move |_| params.get().get("id").unwrap_or_default());
    let load = RwSignal::new(PreviewLoad::Loading);

    #[cfg(not(feature = "ssr"))]
    Effect::new(move |_| {
        use crate::core::RepoClient;
        use crate::ui::browser::FetchTransport;
        use crate::ui::notifications::use_notifications;
        use leptos::task::spawn_local;

        let id = repo_id.get();
        let notifications = use_notifications();
        load.set(PreviewLoad::Loading);
        spawn_local(async move {
            let client = RepoClient::new(FetchTransport, notifications);
            let result = client.fetch_preview(&id).await;
            if let Err(e) = &result {
                leptos::logging::error!("Failed to load preview {}: {}", id, e);
            }
            load.set(result.into());
        });
    });

    move || match load.get() {
        PreviewLoad::Loading => view! {
            <PageLayout>
                <div class="page-status">"Loading preview..."</div>
            </PageLayout>
        }
        .into_any(),
        PreviewLoad::Missing => view! { <NotFoundPage /> }.into_any(),
        PreviewLoad::Failed(message) => view! { <ServerErrorPage message=message /> }.into_any(),
        PreviewLoad::Loaded(source) => {
            let title = source.name.clone().unwrap_or_else(|| "Untitled repo".to_string());
            let description = source.description.clone();
            let source = Signal::stored(source);
            view! {
                <PageLayout>
                    <div class="preview-page">
                        <div class="preview-page-header">
                            <h1 class="page-title">{title}</h1>
                            <A href=move || format!("/checkout/{}", repo_id.get()) attr:class="btn-primary">
                                "Buy"
                            </A>
                        </div>
                        <LivePreview source=source />
                        {description.map(|content| view! { <Markdown content=content /> })}
                    </div>
                </PageLayout>
            }
            .into_any()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_missing() {
        let err = ApiError::Status {
            status: 404,
            message: None,
        };
        assert_eq!(PreviewLoad::from(Err(err)), PreviewLoad::Missing);
        assert_eq!(
            PreviewLoad::from(Err(ApiError::InvalidId("../x".to_string()))),
            PreviewLoad::Missing
        );
    }

    #[test]
    fn test_other_failures_map_to_error_page() {
        let err = ApiError::Status {
            status: 500,
            message: Some("boom".to_string()),
        };
        assert!(matches!(PreviewLoad::from(Err(err)), PreviewLoad::Failed(_)));
    }

    #[test]
    fn test_loaded_source_is_kept() {
        let source = PreviewSource {
            source_js: "export default () => <div/>".to_string(),
            ..Default::default()
        };
        assert_eq!(
            PreviewLoad::from(Ok(source.clone())),
            PreviewLoad::Loaded(source)
        );
    }
}
