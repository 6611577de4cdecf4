//! Bindings to the Monaco editor engine
//!
//! The engine is loaded once per page through [`monaco_ready`], always after
//! the preview runtime has settled; editor
//! instances are wrapped in [`EditorHandle`], which keeps the change closure
//! alive for as long as the instance exists.

use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::core::engine::{
    CompilerOptions, DiagnosticsOptions, EngineConfig, EngineFuture, EngineLoader, LoadError,
    load_after,
};
use crate::core::{EditorOptions, Language};
use crate::ui::browser::{CdnScriptSource, preview_runtime_ready};

#[wasm_bindgen(module = "/js/monaco_host.js")]
extern "C" {
    #[wasm_bindgen(js_name = requireMonaco)]
    fn require_monaco(vs_path: &str) -> js_sys::Promise;

    #[wasm_bindgen(js_name = configureLanguages)]
    fn configure_languages(compiler_options: &JsValue, diagnostics_options: &JsValue);

    #[wasm_bindgen(catch, js_name = createEditor)]
    fn create_editor(
        container: &web_sys::HtmlElement,
        value: &str,
        language: &str,
        options: &JsValue,
        on_change: &Closure<dyn FnMut(String)>,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = getValue)]
    fn get_value(editor: &JsValue) -> String;

    #[wasm_bindgen(js_name = setValue)]
    fn set_value(editor: &JsValue, value: &str);

    #[wasm_bindgen(js_name = updateOptions)]
    fn update_options(editor: &JsValue, options: &JsValue);

    #[wasm_bindgen(js_name = setLanguage)]
    fn set_language(editor: &JsValue, language: &str);

    #[wasm_bindgen(js_name = disposeEditor)]
    fn dispose_editor(editor: &JsValue);
}

thread_local! {
    static MONACO: EngineLoader<()> = const { EngineLoader::new() };
}

/// Serialize to a plain JS object through JSON
fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_json::to_string(value)
        .ok()
        .and_then(|json| js_sys::JSON::parse(&json).ok())
        .unwrap_or(JsValue::UNDEFINED)
}

fn engine_options(options: &EditorOptions, read_only: bool) -> JsValue {
    let mut engine_options = options.to_engine_options();
    engine_options["readOnly"] = serde_json::Value::Bool(read_only);
    to_js(&engine_options)
}

/// Shared future for the one-time engine load
pub fn monaco_ready() -> EngineFuture<()> {
    MONACO.with(|loader| {
        loader.init(|| async {
            let config = EngineConfig::default();
            // loader.js defines an AMD `define`; the runtime's UMD scripts
            // must have run before it appears
            load_after(preview_runtime_ready(), &CdnScriptSource, &config.loader_url()).await?;
            JsFuture::from(require_monaco(&config.vs_path()))
                .await
                .map_err(|_| LoadError::MissingGlobal("monaco".to_string()))?;
            configure_languages(
                &to_js(&CompilerOptions::default()),
                &to_js(&DiagnosticsOptions::default()),
            );
            leptos::logging::log!("Monaco {} ready", crate::core::MONACO_VERSION);
            Ok(())
        })
    })
}

/// A live editor instance
pub struct EditorHandle {
    editor: JsValue,
    _on_change: Closure<dyn FnMut(String)>,
}

impl EditorHandle {
    pub fn create(
        container: &web_sys::HtmlElement,
        value: &str,
        language: Language,
        options: &EditorOptions,
        read_only: bool,
        on_change: impl FnMut(String) + 'static,
    ) -> Result<Self, String> {
        let on_change = Closure::<dyn FnMut(String)>::new(on_change);
        let editor = create_editor(
            container,
            value,
            language.editor_mode(),
            &engine_options(options, read_only),
            &on_change,
        )
        .map_err(|e| format!("{:?}", e))?;
        Ok(Self {
            editor,
            _on_change: on_change,
        })
    }

    pub fn value(&self) -> String {
        get_value(&self.editor)
    }

    pub fn set_value(&self, value: &str) {
        set_value(&self.editor, value);
    }

    pub fn apply_options(&self, options: &EditorOptions, read_only: bool) {
        update_options(&self.editor, &engine_options(options, read_only));
    }

    pub fn set_language(&self, language: Language) {
        set_language(&self.editor, language.editor_mode());
    }

    /// Dispose the instance and its model
    pub fn dispose(self) {
        dispose_editor(&self.editor);
    }
}
