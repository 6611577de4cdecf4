//! Code editor component backed by Monaco
//!
//! The engine is fetched once per page; every later mount reuses it. Values
//! pushed in through `value` go through a [`ChangeGuard`](crate::core::ChangeGuard)
//! so they are not echoed back through `on_change`.

use leptos::html;
use leptos::prelude::*;

use crate::core::{EditorOptions, Language};

/// Mount state of an editor instance
#[derive(Clone, Debug, PartialEq)]
pub enum EditorStatus {
    Loading,
    Ready,
    Failed(String),
}

#[component]
pub fn CodeEditor(
    /// Externally owned source text
    #[prop(into)]
    value: Signal<String>,
    /// Called with user edits only
    #[prop(into)]
    on_change: Callback<String>,
    #[prop(into)] language: Signal<Language>,
    #[prop(into)] options: Signal<EditorOptions>,
    #[prop(default = false)] read_only: bool,
) -> impl IntoView {
    let container = NodeRef::<html::Div>::new();
    let status = RwSignal::new(EditorStatus::Loading);

    #[cfg(not(feature = "ssr"))]
    {
        use crate::core::ChangeGuard;
        use crate::ui::monaco::{EditorHandle, monaco_ready};
        use leptos::task::spawn_local;

        let handle = StoredValue::new_local(None::<EditorHandle>);
        let guard = StoredValue::new_local(ChangeGuard::new(value.get_untracked()));

        // Create the instance once the container exists and the engine is ready
        Effect::new(move |_| {
            let Some(element) = container.get() else {
                return;
            };
            spawn_local(async move {
                if let Err(e) = monaco_ready().await {
                    leptos::logging::error!("Editor engine failed to load: {}", e);
                    status.set(EditorStatus::Failed(e.to_string()));
                    return;
                }
                if handle.try_with_value(Option::is_some).unwrap_or(true) {
                    return;
                }
                let initial = guard
                    .try_with_value(|g| g.last_external().to_string())
                    .unwrap_or_default();
                let created = EditorHandle::create(
                    &element,
                    &initial,
                    language.get_untracked(),
                    &options.get_untracked(),
                    read_only,
                    move |current: String| {
                        let emitted = guard
                            .try_update_value(|g| g.on_editor_change(&current))
                            .flatten();
                        if let Some(text) = emitted {
                            on_change.run(text);
                        }
                    },
                );
                match created {
                    Ok(editor) => {
                        handle.set_value(Some(editor));
                        status.set(EditorStatus::Ready);
                    }
                    Err(e) => {
                        leptos::logging::error!("Failed to create editor: {}", e);
                        status.set(EditorStatus::Failed(e));
                    }
                }
            });
        });

        // Push external values without echoing them back
        Effect::new(move |_| {
            let incoming = value.get();
            let ready = status.get() == EditorStatus::Ready;
            handle.with_value(|editor| {
                let Some(editor) = editor else {
                    guard.update_value(|g| {
                        g.push_external(&incoming, "");
                    });
                    return;
                };
                if !ready {
                    return;
                }
                let current = editor.value();
                let replace = guard
                    .try_update_value(|g| g.push_external(&incoming, &current))
                    .unwrap_or(false);
                if replace {
                    editor.set_value(&incoming);
                }
            });
        });

        Effect::new(move |_| {
            let options = options.get();
            let language = language.get();
            if status.get() != EditorStatus::Ready {
                return;
            }
            handle.with_value(|editor| {
                if let Some(editor) = editor {
                    editor.apply_options(&options, read_only);
                    editor.set_language(language);
                }
            });
        });

        on_cleanup(move || {
            if let Some(Some(editor)) = handle.try_update_value(Option::take) {
                editor.dispose();
            }
        });
    }

    #[cfg(feature = "ssr")]
    let _ = (value, on_change, language, options, read_only);

    view! {
        <div class="code-editor">
            {move || match status.get() {
                EditorStatus::Loading => {
                    Some(view! { <div class="code-editor-overlay">"Loading editor…"</div> }.into_any())
                }
                EditorStatus::Failed(message) => {
                    Some(
                        view! {
                            <div class="code-editor-overlay error-banner" role="alert">
                                "The editor could not be loaded: "
                                {message}
                            </div>
                        }
                            .into_any(),
                    )
                }
                EditorStatus::Ready => None,
            }}
            <div class="code-editor-surface" node_ref=container></div>
        </div>
    }
}
