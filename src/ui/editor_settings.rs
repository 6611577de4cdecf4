//! Editor display options: context, persistence and the settings panel

use leptos::prelude::*;

use crate::core::editor::{MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::core::{EditorOptions, EditorTheme, PersistedStore};
use crate::ui::browser::BrowserStorage;

/// Editor options shared by every editor on the page
#[derive(Clone, Copy)]
pub struct EditorSettings {
    options: RwSignal<EditorOptions>,
    store: StoredValue<PersistedStore<EditorOptions, BrowserStorage>>,
}

impl EditorSettings {
    pub fn options(&self) -> Signal<EditorOptions> {
        self.options.into()
    }

    /// Change the options and persist them under `code-editor-options`
    pub fn update(&self, f: impl FnOnce(&mut EditorOptions)) {
        let saved = self.store.try_update_value(|store| {
            let result = store.update(f);
            (store.get().clone(), result)
        });
        if let Some((next, result)) = saved {
            if let Err(e) = result {
                leptos::logging::warn!("Editor options not saved: {}", e);
            }
            self.options.set(next);
        }
    }

    pub fn reset(&self) {
        self.store.update_value(|store| store.reset());
        self.options.set(EditorOptions::default());
    }
}

/// Provide editor settings to the component tree
pub fn provide_editor_settings() -> EditorSettings {
    // Defaults on both server and client to avoid a hydration mismatch
    let options = RwSignal::new(EditorOptions::default());
    let store = StoredValue::new(PersistedStore::<EditorOptions, BrowserStorage>::load(
        BrowserStorage,
    ));
    let settings = EditorSettings { options, store };

    #[cfg(not(feature = "ssr"))]
    Effect::new(move |_| {
        let restored = store.with_value(|store| store.get().clone());
        options.set(restored);
    });

    provide_context(settings);
    settings
}

pub fn use_editor_settings() -> EditorSettings {
    expect_context::<EditorSettings>()
}

#[component]
pub fn EditorSettingsPanel() -> impl IntoView {
    let settings = use_editor_settings();
    let options = settings.options();

    let toggle = move |label: &'static str,
                       get: fn(&EditorOptions) -> bool,
                       set: fn(&mut EditorOptions, bool)| {
        view! {
            <label class="settings-row">
                <input
                    type="checkbox"
                    prop:checked=move || options.with(get)
                    on:change=move |ev| {
                        let checked = event_target_checked(&ev);
                        settings.update(|o| set(o, checked));
                    }
                />
                <span>{label}</span>
            </label>
        }
    };

    view! {
        <section class="editor-settings" aria-label="Editor settings">
            <label class="settings-row">
                <span>"Theme"</span>
                <select
                    prop:value=move || options.with(|o| o.theme.as_str())
                    on:change=move |ev| {
                        let theme = EditorTheme::from_str(&event_target_value(&ev));
                        settings.update(|o| o.theme = theme);
                    }
                >
                    {EditorTheme::ALL
                        .into_iter()
                        .map(|theme| view! { <option value=theme.as_str()>{theme.display_name()}</option> })
                        .collect_view()}
                </select>
            </label>
            <label class="settings-row">
                <span>"Font size"</span>
                <input
                    type="number"
                    min=MIN_FONT_SIZE.to_string()
                    max=MAX_FONT_SIZE.to_string()
                    prop:value=move || options.with(|o| o.font_size.to_string())
                    on:change=move |ev| {
                        if let Ok(size) = event_target_value(&ev).parse::<u8>() {
                            settings.update(|o| *o = o.clone().with_font_size(size));
                        }
                    }
                />
            </label>
            {toggle("Word wrap", |o| o.word_wrap, |o, v| o.word_wrap = v)}
            {toggle("Minimap", |o| o.minimap, |o, v| o.minimap = v)}
            {toggle("Line numbers", |o| o.line_numbers, |o, v| o.line_numbers = v)}
            <button type="button" class="btn-secondary" on:click=move |_| settings.reset()>
                "Reset to defaults"
            </button>
        </section>
    }
}
