//! One-time loading of remote script engines
//!
//! The code editor and the preview runtime both live in third-party scripts
//! fetched from a CDN. Each is loaded at most once per session through an
//! [`EngineLoader`]: the first [`EngineLoader::init`] call starts the load
//! and stores a shared future, later calls get a clone of that same future.
//! The loader is never torn down, and a failed load stays failed for the
//! rest of the session.

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use serde::Serialize;
use std::cell::OnceCell;

/// Pinned editor engine version
pub const MONACO_VERSION: &str = "0.52.2";

/// Base URL of the pinned editor engine build
pub const MONACO_CDN_BASE: &str = "https://cdn.jsdelivr.net/npm/monaco-editor@0.52.2/min";

/// Scripts the preview runtime needs, in load order
pub const PREVIEW_RUNTIME_SCRIPTS: [&str; 3] = [
    "https://unpkg.com/react@18.3.1/umd/react.production.min.js",
    "https://unpkg.com/react-dom@18.3.1/umd/react-dom.production.min.js",
    "https://unpkg.com/@babel/standalone@7.26.4/babel.min.js",
];

/// Globals the preview runtime scripts install on `window`
pub const PREVIEW_RUNTIME_GLOBALS: &str = "React, ReactDOM, Babel";

/// Remote script failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to load script {url}")]
    Script { url: String },

    #[error("script loaded but `{0}` is not available")]
    MissingGlobal(String),

    #[error("engine loading is only available in the browser")]
    Unsupported,
}

/// Something that can fetch and execute a remote script
pub trait ScriptSource {
    fn load(&self, url: &str) -> LocalBoxFuture<'static, Result<(), LoadError>>;
}

/// Shared handle to an in-flight or finished engine load
pub type EngineFuture<T> = Shared<LocalBoxFuture<'static, Result<T, LoadError>>>;

/// Lazily-initialized, process-wide engine load
pub struct EngineLoader<T: Clone + 'static> {
    future: OnceCell<EngineFuture<T>>,
}

impl<T: Clone + 'static> EngineLoader<T> {
    pub const fn new() -> Self {
        Self {
            future: OnceCell::new(),
        }
    }

    /// Start the load on first call; every call returns the same shared future
    pub fn init<F, Fut>(&self, start: F) -> EngineFuture<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LoadError>> + 'static,
    {
        self.future
            .get_or_init(|| start().boxed_local().shared())
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.future.get().is_some()
    }
}

impl<T: Clone + 'static> Default for EngineLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Load `urls` one after another; stops at the first failure
pub async fn load_in_order<S: ScriptSource>(source: &S, urls: &[&str]) -> Result<(), LoadError> {
    for url in urls {
        source.load(url).await?;
    }
    Ok(())
}

/// Load the runtime scripts, then confirm their globals were installed
///
/// `onload` only says a script ran. A UMD build that finds an AMD `define`
/// on the page registers a module instead of a global, so the globals are
/// checked explicitly and a miss fails the whole load.
pub async fn load_runtime<S: ScriptSource>(
    source: &S,
    urls: &[&str],
    globals_ready: impl FnOnce() -> bool,
) -> Result<(), LoadError> {
    load_in_order(source, urls).await?;
    if globals_ready() {
        Ok(())
    } else {
        Err(LoadError::MissingGlobal(PREVIEW_RUNTIME_GLOBALS.to_string()))
    }
}

/// Load `url` once `before` has settled, whatever its outcome
///
/// The editor's AMD loader goes through here behind the preview runtime so
/// the runtime's UMD scripts never see `define.amd`.
pub async fn load_after<S: ScriptSource, T: Clone + 'static>(
    before: EngineFuture<T>,
    source: &S,
    url: &str,
) -> Result<(), LoadError> {
    if let Err(e) = before.await {
        leptos::logging::warn!("Loading {} after a failed load: {}", url, e);
    }
    source.load(url).await
}

/// Editor engine configuration for a pinned CDN build
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub cdn_base: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cdn_base: MONACO_CDN_BASE.to_string(),
        }
    }
}

impl EngineConfig {
    /// AMD loader script
    pub fn loader_url(&self) -> String {
        format!("{}/vs/loader.js", self.cdn_base)
    }

    /// Path the AMD loader resolves `vs/*` modules against
    pub fn vs_path(&self) -> String {
        format!("{}/vs", self.cdn_base)
    }
}

/// TypeScript `JsxEmit.React`
const JSX_EMIT_REACT: u8 = 2;
/// TypeScript `ModuleResolutionKind.NodeJs`
const MODULE_RESOLUTION_NODE: u8 = 2;
/// TypeScript `ScriptTarget.ESNext`
const SCRIPT_TARGET_ESNEXT: u8 = 99;
/// TypeScript `ModuleKind.ESNext`
const MODULE_KIND_ESNEXT: u8 = 99;

/// Compiler options installed on the editor's TypeScript worker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub jsx: u8,
    pub module_resolution: u8,
    pub target: u8,
    pub module: u8,
    pub allow_non_ts_extensions: bool,
    pub allow_js: bool,
    pub es_module_interop: bool,
    pub no_emit: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            jsx: JSX_EMIT_REACT,
            module_resolution: MODULE_RESOLUTION_NODE,
            target: SCRIPT_TARGET_ESNEXT,
            module: MODULE_KIND_ESNEXT,
            allow_non_ts_extensions: true,
            allow_js: true,
            es_module_interop: true,
            no_emit: true,
        }
    }
}

/// Diagnostics settings; semantic checks are off because imports are never
/// resolvable inside the editor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsOptions {
    pub no_semantic_validation: bool,
    pub no_syntax_validation: bool,
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        Self {
            no_semantic_validation: true,
            no_syntax_validation: false,
        }
    }
}
