//! Live preview pane
//!
//! Loads the preview runtime once per page and keeps one React root in the
//! pane's container. Every change of `source` renders into that root, so the
//! component stays interactive. Evaluation errors are shown inline; they
//! never take the page down.

use leptos::html;
use leptos::prelude::*;

use crate::core::{PreviewOutcome, PreviewSource, StylePolicy, TransformMode};

#[derive(Clone, Debug, PartialEq)]
enum RuntimeState {
    Loading,
    Ready,
    Failed(String),
}

#[component]
pub fn LivePreview(
    /// Source, styles and language of the component to show
    #[prop(into)]
    source: Signal<PreviewSource>,
    #[prop(default = StylePolicy::Scoped)] policy: StylePolicy,
    #[prop(default = TransformMode::LinePattern)] mode: TransformMode,
) -> impl IntoView {
    let container = NodeRef::<html::Div>::new();
    let runtime = RwSignal::new(RuntimeState::Loading);
    let outcome = RwSignal::new(None::<PreviewOutcome>);

    #[cfg(not(feature = "ssr"))]
    {
        use crate::core::PreviewPipeline;
        use crate::ui::browser::{DocumentHead, RuntimeEvaluator, preview_runtime_ready};
        use leptos::task::spawn_local;

        let pipeline =
            StoredValue::new_local(None::<PreviewPipeline<RuntimeEvaluator, DocumentHead>>);

        // Build the pipeline around the container once the runtime is in
        Effect::new(move |_| {
            let Some(element) = container.get() else {
                return;
            };
            spawn_local(async move {
                if let Err(e) = preview_runtime_ready().await {
                    leptos::logging::error!("Preview runtime failed to load: {}", e);
                    runtime.set(RuntimeState::Failed(e.to_string()));
                    return;
                }
                if pipeline.try_with_value(Option::is_some).unwrap_or(true) {
                    return;
                }
                let created =
                    PreviewPipeline::new(RuntimeEvaluator::new(element.into()), DocumentHead, policy)
                        .with_mode(mode);
                pipeline.set_value(Some(created));
                runtime.set(RuntimeState::Ready);
            });
        });

        // Every change renders into the same root
        Effect::new(move |_| {
            if runtime.get() != RuntimeState::Ready {
                return;
            }
            let rendered = source.with(|src| {
                pipeline
                    .try_update_value(|p| p.as_mut().map(|p| p.render(src)))
                    .flatten()
            });
            if let Some(rendered) = rendered {
                outcome.set(Some(rendered));
            }
        });

        on_cleanup(move || {
            if let Some(Some(mut p)) = pipeline.try_update_value(Option::take) {
                p.teardown();
            }
        });
    }

    #[cfg(feature = "ssr")]
    let _ = (source, policy, mode);

    view! {
        <div class="live-preview">
            {move || match runtime.get() {
                RuntimeState::Loading => {
                    Some(view! { <div class="preview-status">"Loading preview…"</div> }.into_any())
                }
                RuntimeState::Failed(message) => {
                    Some(
                        view! {
                            <div class="error-banner" role="alert">
                                "Preview runtime unavailable: "
                                {message}
                            </div>
                        }
                            .into_any(),
                    )
                }
                RuntimeState::Ready => {
                    match outcome.get() {
                        Some(PreviewOutcome::Failed { error }) => {
                            Some(
                                view! {
                                    <div class="error-banner" role="alert">
                                        <strong>"Preview error"</strong>
                                        <pre>{error.to_string()}</pre>
                                    </div>
                                }
                                    .into_any(),
                            )
                        }
                        Some(PreviewOutcome::Rendered) | None => None,
                    }
                }
            }}
            <div class="preview-surface" node_ref=container></div>
        </div>
    }
}
