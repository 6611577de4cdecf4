//! Repo editor page
//!
//! Monaco on the left, live preview on the right. Source edits stay local
//! until saved; the preview follows every keystroke.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params_map};

use super::layout::PageLayout;
use crate::core::{Language, PreviewSource, Repo, RepoClient, RepoPatch, Role};
use crate::ui::auth::use_auth_context;
use crate::ui::browser::FetchTransport;
use crate::ui::code_editor::CodeEditor;
use crate::ui::editor_settings::{EditorSettingsPanel, use_editor_settings};
use crate::ui::live_preview::LivePreview;
use crate::ui::notifications::use_notifications;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoadState {
    Loading,
    Ready,
    Unavailable,
}

/// Local, unsaved edits of a repo's sources
#[derive(Clone, Debug, Default, PartialEq)]
struct Draft {
    source_js: String,
    source_css: String,
}

impl Draft {
    fn from_repo(repo: &Repo) -> Self {
        Self {
            source_js: repo.source_js.clone(),
            source_css: repo.source_css.clone(),
        }
    }

    fn differs_from(&self, repo: &Repo) -> bool {
        self.source_js != repo.source_js || self.source_css != repo.source_css
    }

    fn patch(&self) -> RepoPatch {
        RepoPatch::sources(self.source_js.clone(), self.source_css.clone())
    }
}

#[component]
pub fn RepoEditorPage() -> impl IntoView {
    let params = use_params_map();
    let auth = use_auth_context();
    let notifications = use_notifications();
    let settings = use_editor_settings();

    let repo_id = Memo::new(move |_| params.get().get("id").unwrap_or_default());
    let repo = RwSignal::new(None::<Repo>);
    let state = RwSignal::new(LoadState::Loading);
    let source_js = RwSignal::new(String::new());
    let source_css = RwSignal::new(String::new());
    let saving = RwSignal::new(false);
    let confirm_delete = RwSignal::new(false);

    let draft = Memo::new(move |_| Draft {
        source_js: source_js.get(),
        source_css: source_css.get(),
    });
    let dirty = Memo::new(move |_| {
        repo.with(|repo| {
            repo.as_ref()
                .is_some_and(|repo| draft.with(|d| d.differs_from(repo)))
        })
    });
    let language = Signal::derive(move || {
        repo.with(|repo| repo.as_ref().map(|r| r.language).unwrap_or(Language::Jsx))
    });
    let preview_source = Signal::derive(move || PreviewSource {
        source_js: source_js.get(),
        source_css: source_css.get(),
        name: repo.with(|repo| repo.as_ref().map(|r| r.name.clone())),
        description: None,
        language: Some(language.get()),
    });

    let apply_loaded = move |loaded: Repo| {
        let restored = Draft::from_repo(&loaded);
        source_js.set(restored.source_js);
        source_css.set(restored.source_css);
        repo.set(Some(loaded));
        state.set(LoadState::Ready);
    };

    Effect::new(move |_| {
        let id = repo_id.get();
        state.set(LoadState::Loading);
        spawn_local(async move {
            let client = RepoClient::new(FetchTransport, notifications);
            match client.get_repo_by_id(&id).await {
                Some(loaded) => apply_loaded(loaded),
                // The client already reported the failure
                None => state.set(LoadState::Unavailable),
            }
        });
    });

    let on_save = move |_| {
        if saving.get_untracked() || !dirty.get_untracked() {
            return;
        }
        let id = repo_id.get_untracked();
        let patch = draft.with_untracked(Draft::patch);
        saving.set(true);
        spawn_local(async move {
            let client = RepoClient::new(FetchTransport, notifications);
            if let Ok(saved) = client.update_repo(&id, &patch).await {
                apply_loaded(saved);
            }
            saving.set(false);
        });
    };

    let on_reset = move |_| {
        if let Some(loaded) = repo.get_untracked() {
            let restored = Draft::from_repo(&loaded);
            source_js.set(restored.source_js);
            source_css.set(restored.source_css);
        }
    };

    let on_delete = move |_| {
        if !confirm_delete.get_untracked() {
            confirm_delete.set(true);
            return;
        }
        confirm_delete.set(false);
        let id = repo_id.get_untracked();
        let home = auth
            .user()
            .map(|u| u.role.home_path())
            .unwrap_or(Role::Seller.home_path());
        spawn_local(async move {
            let client = RepoClient::new(FetchTransport, notifications);
            if client.delete_repo(&id).await.is_ok() {
                let navigate = use_navigate();
                navigate(home, Default::default());
            }
        });
    };

    view! {
        <PageLayout>
            {move || match state.get() {
                LoadState::Loading => {
                    view! { <div class="page-status">"Loading repo..."</div> }.into_any()
                }
                LoadState::Unavailable => {
                    view! {
                        <div class="page-status">
                            <p>"This repo could not be loaded."</p>
                            <a href="/dashboard" class="btn-secondary">"Back to dashboard"</a>
                        </div>
                    }
                        .into_any()
                }
                LoadState::Ready => {
                    view! {
                        <div class="editor-page">
                            <div class="editor-toolbar">
                                <h1 class="page-title">
                                    {move || repo.with(|r| r.as_ref().map(|r| r.name.clone()))}
                                </h1>
                                <span class="status-badge">
                                    {move || repo.with(|r| r.as_ref().map(|r| r.status.display_name()))}
                                </span>
                                <div class="toolbar-actions">
                                    <button
                                        class="btn-secondary"
                                        disabled=move || !dirty.get()
                                        on:click=on_reset
                                    >
                                        "Reset"
                                    </button>
                                    <button
                                        class="btn-primary"
                                        disabled=move || !dirty.get() || saving.get()
                                        on:click=on_save
                                    >
                                        {move || if saving.get() { "Saving..." } else { "Save" }}
                                    </button>
                                    <button class="btn-danger" on:click=on_delete>
                                        {move || {
                                            if confirm_delete.get() { "Confirm delete" } else { "Delete" }
                                        }}
                                    </button>
                                </div>
                            </div>

                            <div class="editor-split">
                                <div class="editor-pane">
                                    <CodeEditor
                                        value=source_js
                                        on_change=Callback::new(move |text: String| source_js.set(text))
                                        language=language
                                        options=settings.options()
                                    />
                                    <label class="css-label" for="repo-css">"Styles"</label>
                                    <textarea
                                        id="repo-css"
                                        class="css-input"
                                        spellcheck="false"
                                        prop:value=move || source_css.get()
                                        on:input=move |ev| source_css.set(event_target_value(&ev))
                                    />
                                </div>
                                <div class="preview-pane">
                                    <LivePreview source=preview_source />
                                </div>
                            </div>

                            <details class="settings-drawer">
                                <summary>"Editor settings"</summary>
                                <EditorSettingsPanel />
                            </details>
                        </div>
                    }
                        .into_any()
                }
            }}
        </PageLayout>
    }
}
