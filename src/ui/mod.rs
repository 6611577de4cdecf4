pub mod auth;
pub mod browser;
pub mod code_editor;
pub mod editor_settings;
pub mod live_preview;
pub mod markdown;
#[cfg(not(feature = "ssr"))]
mod monaco;
pub mod notifications;
pub mod pages;

pub use code_editor::CodeEditor;
pub use editor_settings::{EditorSettingsPanel, provide_editor_settings, use_editor_settings};
pub use live_preview::LivePreview;
pub use markdown::Markdown;
pub use notifications::{NotificationsContainer, provide_notifications, use_notifications};
