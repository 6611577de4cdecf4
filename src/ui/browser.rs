//! Browser implementations of the core seams
//!
//! - [`FetchTransport`]: same-origin `fetch` with cookies
//! - [`BrowserStorage`]: `localStorage`
//! - [`DocumentHead`]: `<style>` elements in `document.head`
//! - [`CdnScriptSource`]: `<script src>` injection
//! - [`RuntimeEvaluator`]: a live React root driven by the in-page runtime
//!
//! On the server every one of them is an inert stub; none of this code runs
//! before hydration.

use futures::FutureExt;
use futures::future::LocalBoxFuture;

#[cfg(not(feature = "ssr"))]
use crate::core::engine::{EngineFuture, EngineLoader, PREVIEW_RUNTIME_SCRIPTS, load_runtime};
use crate::core::engine::{LoadError, ScriptSource};
use crate::core::preview::{EvalError, EvalScope, Evaluator, StyleError, StyleHost};
use crate::core::store::{KeyValueStorage, StorageError};
use crate::core::{ApiError, ApiRequest, ApiResponse, Language, Transport, TransformedSource};

/// `fetch` against the app origin, sending the session cookie
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

#[cfg(not(feature = "ssr"))]
impl Transport for FetchTransport {
    fn send(&self, request: ApiRequest) -> LocalBoxFuture<'static, Result<ApiResponse, ApiError>> {
        use crate::core::Method;
        use gloo_net::http::{Method as HttpMethod, RequestBuilder};

        async move {
            let method = match request.method {
                Method::Get => HttpMethod::GET,
                Method::Post => HttpMethod::POST,
                Method::Put => HttpMethod::PUT,
                Method::Delete => HttpMethod::DELETE,
            };
            let builder = RequestBuilder::new(&request.path)
                .method(method)
                .credentials(web_sys::RequestCredentials::Include)
                .header("Accept", "application/json");
            let prepared = match request.body {
                Some(body) => builder.header("Content-Type", "application/json").body(body),
                None => builder.build(),
            }
            .map_err(|e| ApiError::Network(e.to_string()))?;

            let response = prepared
                .send()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Ok::<_, ApiError>(ApiResponse::new(status, body))
        }
        .boxed_local()
    }
}

#[cfg(feature = "ssr")]
impl Transport for FetchTransport {
    fn send(&self, _request: ApiRequest) -> LocalBoxFuture<'static, Result<ApiResponse, ApiError>> {
        async { Err(ApiError::Unavailable) }.boxed_local()
    }
}

/// `window.localStorage`
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

#[cfg(not(feature = "ssr"))]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(not(feature = "ssr"))]
impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()
            .ok_or(StorageError::Unavailable)?
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

#[cfg(feature = "ssr")]
impl KeyValueStorage for BrowserStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove(&self, _key: &str) {}
}

/// `document.head`, for preview styles
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentHead;

#[cfg(not(feature = "ssr"))]
impl StyleHost for DocumentHead {
    type Handle = web_sys::HtmlStyleElement;

    fn append(&mut self, css: &str) -> Result<Self::Handle, StyleError> {
        use wasm_bindgen::JsCast;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(StyleError::NoHead)?;
        let head = document.head().ok_or(StyleError::NoHead)?;
        let style: web_sys::HtmlStyleElement = document
            .create_element("style")
            .map_err(|e| StyleError::Create(format!("{:?}", e)))?
            .dyn_into()
            .map_err(|_| StyleError::Create("not a style element".to_string()))?;
        style
            .set_attribute("data-preview", &uuid::Uuid::new_v4().to_string())
            .map_err(|e| StyleError::Create(format!("{:?}", e)))?;
        style.set_text_content(Some(css));
        head.append_child(&style)
            .map_err(|e| StyleError::Create(format!("{:?}", e)))?;
        Ok(style)
    }

    fn update(&mut self, handle: &Self::Handle, css: &str) {
        handle.set_text_content(Some(css));
    }

    fn remove(&mut self, handle: Self::Handle) {
        handle.remove();
    }
}

#[cfg(feature = "ssr")]
impl StyleHost for DocumentHead {
    type Handle = ();

    fn append(&mut self, _css: &str) -> Result<(), StyleError> {
        Err(StyleError::NoHead)
    }

    fn update(&mut self, _handle: &(), _css: &str) {}

    fn remove(&mut self, _handle: ()) {}
}

/// Appends `<script src=url>` to the head and resolves on load/error
#[derive(Clone, Copy, Debug, Default)]
pub struct CdnScriptSource;

#[cfg(not(feature = "ssr"))]
impl ScriptSource for CdnScriptSource {
    fn load(&self, url: &str) -> LocalBoxFuture<'static, Result<(), LoadError>> {
        use futures::channel::oneshot;
        use std::cell::RefCell;
        use std::rc::Rc;
        use wasm_bindgen::JsCast;
        use wasm_bindgen::closure::Closure;

        let url = url.to_string();
        async move {
            let failed = || LoadError::Script { url: url.clone() };

            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or(LoadError::Unsupported)?;
            let head = document.head().ok_or(LoadError::Unsupported)?;
            let script: web_sys::HtmlScriptElement = document
                .create_element("script")
                .map_err(|_| failed())?
                .dyn_into()
                .map_err(|_| failed())?;
            script.set_src(&url);
            script.set_cross_origin(Some("anonymous"));

            let (tx, rx) = oneshot::channel::<bool>();
            let tx = Rc::new(RefCell::new(Some(tx)));
            let settle = move |loaded: bool| {
                let tx = tx.clone();
                Closure::<dyn FnMut()>::new(move || {
                    if let Some(tx) = tx.borrow_mut().take() {
                        let _ = tx.send(loaded);
                    }
                })
            };
            let on_load = settle(true);
            let on_error = settle(false);
            script.set_onload(Some(on_load.as_ref().unchecked_ref()));
            script.set_onerror(Some(on_error.as_ref().unchecked_ref()));

            head.append_child(&script).map_err(|_| failed())?;
            let loaded = rx.await.unwrap_or(false);

            script.set_onload(None);
            script.set_onerror(None);
            drop((on_load, on_error));

            if loaded {
                leptos::logging::log!("Loaded {}", url);
                Ok(())
            } else {
                Err(failed())
            }
        }
        .boxed_local()
    }
}

#[cfg(feature = "ssr")]
impl ScriptSource for CdnScriptSource {
    fn load(&self, _url: &str) -> LocalBoxFuture<'static, Result<(), LoadError>> {
        async { Err(LoadError::Unsupported) }.boxed_local()
    }
}

#[cfg(not(feature = "ssr"))]
mod runtime {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen(module = "/js/preview_runtime.js")]
    extern "C" {
        #[wasm_bindgen(js_name = isRuntimeReady)]
        pub fn is_runtime_ready() -> bool;

        #[wasm_bindgen(catch, js_name = createPreviewRoot)]
        pub fn create_preview_root(container: &web_sys::HtmlElement) -> Result<JsValue, JsValue>;

        #[wasm_bindgen(catch, js_name = renderPreview)]
        pub fn render_preview(
            root: &JsValue,
            code: &str,
            file_name: &str,
            scope: &JsValue,
        ) -> Result<(), JsValue>;

        #[wasm_bindgen(js_name = unmountPreview)]
        pub fn unmount_preview(root: &JsValue);
    }
}

#[cfg(not(feature = "ssr"))]
thread_local! {
    static PREVIEW_RUNTIME: EngineLoader<()> = const { EngineLoader::new() };
}

/// Shared future for the one-time preview runtime load
///
/// Fails when the scripts ran but did not install their globals.
#[cfg(not(feature = "ssr"))]
pub fn preview_runtime_ready() -> EngineFuture<()> {
    PREVIEW_RUNTIME.with(|loader| {
        loader.init(|| async {
            load_runtime(&CdnScriptSource, &PREVIEW_RUNTIME_SCRIPTS, runtime::is_runtime_ready)
                .await
        })
    })
}

#[cfg(not(feature = "ssr"))]
fn js_eval_error(err: wasm_bindgen::JsValue) -> EvalError {
    use wasm_bindgen::JsCast;

    match err.dyn_ref::<js_sys::Error>() {
        Some(error) => EvalError::from_js(&String::from(error.name()), String::from(error.message())),
        None => EvalError::Runtime(err.as_string().unwrap_or_else(|| format!("{:?}", err))),
    }
}

/// Compiles with the in-page Babel build and keeps one live React root in
/// the preview container
#[cfg(not(feature = "ssr"))]
pub struct RuntimeEvaluator {
    container: web_sys::HtmlElement,
    root: Option<wasm_bindgen::JsValue>,
}

#[cfg(not(feature = "ssr"))]
impl RuntimeEvaluator {
    pub fn new(container: web_sys::HtmlElement) -> Self {
        Self {
            container,
            root: None,
        }
    }
}

#[cfg(not(feature = "ssr"))]
impl Evaluator for RuntimeEvaluator {
    fn evaluate(
        &mut self,
        source: &TransformedSource,
        language: Language,
        scope: &EvalScope,
    ) -> Result<(), EvalError> {
        use wasm_bindgen::JsValue;

        if !runtime::is_runtime_ready() {
            return Err(EvalError::Unavailable("runtime scripts not loaded".to_string()));
        }

        let bindings = js_sys::Object::new();
        for (name, value) in scope.iter() {
            js_sys::Reflect::set(&bindings, &JsValue::from_str(name), &JsValue::from_str(value))
                .map_err(|e| EvalError::Runtime(format!("{:?}", e)))?;
        }

        let root = match self.root.take() {
            Some(root) => root,
            None => runtime::create_preview_root(&self.container).map_err(js_eval_error)?,
        };
        let rendered =
            runtime::render_preview(&root, source.as_str(), language.file_name(), &bindings)
                .map_err(js_eval_error);
        self.root = Some(root);
        rendered
    }

    fn unmount(&mut self) {
        if let Some(root) = self.root.take() {
            runtime::unmount_preview(&root);
        }
    }
}

#[cfg(not(feature = "ssr"))]
impl Drop for RuntimeEvaluator {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Server stand-in; previews only render after hydration
#[cfg(feature = "ssr")]
#[derive(Clone, Copy, Debug, Default)]
pub struct RuntimeEvaluator;

#[cfg(feature = "ssr")]
impl Evaluator for RuntimeEvaluator {
    fn evaluate(
        &mut self,
        _source: &TransformedSource,
        _language: Language,
        _scope: &EvalScope,
    ) -> Result<(), EvalError> {
        Err(EvalError::Unavailable("server render".to_string()))
    }

    fn unmount(&mut self) {}
}
