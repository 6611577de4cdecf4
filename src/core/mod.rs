//! Core domain models and logic of the marketplace client
//!
//! Everything here is plain Rust behind trait seams, so it runs unchanged in
//! the browser, on the server and in tests.

pub mod access;
pub mod api;
pub mod checkout;
#[cfg(feature = "ssr")]
pub mod config;
pub mod editor;
pub mod engine;
pub mod notification;
pub mod preview;
#[cfg(feature = "ssr")]
pub mod proxy;
pub mod repo;
pub mod session;
pub mod store;
pub mod transform;

pub use access::{AccessDecision, Role, authorize, login_redirect};
pub use api::{ApiError, ApiRequest, ApiResponse, Method, RepoClient, Transport};
pub use checkout::{CheckoutSession, CheckoutStatus};
pub use editor::{ChangeGuard, EditorOptions, EditorTheme};
pub use engine::{EngineConfig, EngineLoader, LoadError, MONACO_VERSION, PREVIEW_RUNTIME_SCRIPTS};
pub use notification::{Notification, NotificationType, Notify};
pub use preview::{
    EvalError, EvalScope, Evaluator, PreviewOutcome, PreviewPipeline, StyleHost, StylePolicy,
};
pub use repo::{Language, PreviewSource, Repo, RepoDraft, RepoPatch, RepoStatus, Visibility};
pub use session::SessionUser;
pub use store::{KeyValueStorage, PersistedStore, StorageError};
pub use transform::{TransformMode, TransformedSource, transform};
