//! Editor session state: display options and the change guard
//!
//! [`EditorOptions`] is the explicit configuration object handed to the code
//! editor; it is persisted under `code-editor-options`.
//! [`ChangeGuard`] keeps pushed-in values from echoing back out as edits.

use serde::{Deserialize, Serialize};

use super::store::Persist;

pub const MIN_FONT_SIZE: u8 = 10;
pub const MAX_FONT_SIZE: u8 = 32;
pub const DEFAULT_FONT_SIZE: u8 = 14;

/// Editor color theme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EditorTheme {
    #[default]
    VsDark,
    Vs,
    HcBlack,
}

impl EditorTheme {
    pub const ALL: [EditorTheme; 3] = [EditorTheme::VsDark, EditorTheme::Vs, EditorTheme::HcBlack];

    /// Theme id understood by the editor engine
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorTheme::VsDark => "vs-dark",
            EditorTheme::Vs => "vs",
            EditorTheme::HcBlack => "hc-black",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "vs" => EditorTheme::Vs,
            "hc-black" => EditorTheme::HcBlack,
            _ => EditorTheme::VsDark,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EditorTheme::VsDark => "Dark",
            EditorTheme::Vs => "Light",
            EditorTheme::HcBlack => "High contrast",
        }
    }
}

/// Display options of the code editor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    pub theme: EditorTheme,
    pub font_size: u8,
    pub word_wrap: bool,
    pub minimap: bool,
    pub line_numbers: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            theme: EditorTheme::default(),
            font_size: DEFAULT_FONT_SIZE,
            word_wrap: false,
            minimap: true,
            line_numbers: true,
        }
    }
}

impl EditorOptions {
    pub fn with_font_size(mut self, size: u8) -> Self {
        self.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self
    }

    /// Options object in the shape the editor engine expects
    pub fn to_engine_options(&self) -> serde_json::Value {
        serde_json::json!({
            "theme": self.theme.as_str(),
            "fontSize": self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE),
            "wordWrap": if self.word_wrap { "on" } else { "off" },
            "minimap": { "enabled": self.minimap },
            "lineNumbers": if self.line_numbers { "on" } else { "off" },
            "automaticLayout": true,
            "scrollBeyondLastLine": false,
            "tabSize": 2,
        })
    }
}

impl Persist for EditorOptions {
    const KEY: &'static str = "code-editor-options";
    type Snapshot = EditorOptions;

    fn snapshot(&self) -> EditorOptions {
        self.clone()
    }

    fn restore(&mut self, snapshot: EditorOptions) {
        let size = snapshot.font_size;
        *self = snapshot.with_font_size(size);
    }
}

/// Tracks the last value known on both sides of the editor bridge
///
/// Values pushed into the editor from outside (reset, remote update) fire the
/// editor's own change event; the guard suppresses those so they are not
/// reported back as user edits.
#[derive(Debug, Clone, Default)]
pub struct ChangeGuard {
    last_external: String,
}

impl ChangeGuard {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            last_external: initial.into(),
        }
    }

    /// Record an externally pushed value; returns true when the editor content
    /// must be replaced
    pub fn push_external(&mut self, incoming: &str, editor_value: &str) -> bool {
        self.last_external = incoming.to_string();
        incoming != editor_value
    }

    /// Called on keystroke/blur with the editor's current text; returns the
    /// text to emit, if any
    pub fn on_editor_change(&mut self, current: &str) -> Option<String> {
        if current == self.last_external {
            return None;
        }
        self.last_external = current.to_string();
        Some(current.to_string())
    }

    pub fn last_external(&self) -> &str {
        &self.last_external
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{KeyValueStorage, MemoryStorage, PersistedStore};

    #[test]
    fn test_default_options() {
        let options = EditorOptions::default();
        assert_eq!(options.theme, EditorTheme::VsDark);
        assert_eq!(options.font_size, 14);
        assert!(options.minimap);
        assert!(options.line_numbers);
        assert!(!options.word_wrap);
    }

    #[test]
    fn test_font_size_clamped() {
        assert_eq!(EditorOptions::default().with_font_size(4).font_size, MIN_FONT_SIZE);
        assert_eq!(EditorOptions::default().with_font_size(99).font_size, MAX_FONT_SIZE);
        assert_eq!(EditorOptions::default().with_font_size(18).font_size, 18);
    }

    #[test]
    fn test_engine_options_shape() {
        let options = EditorOptions {
            word_wrap: true,
            minimap: false,
            line_numbers: false,
            ..Default::default()
        };
        let json = options.to_engine_options();
        assert_eq!(json["theme"], "vs-dark");
        assert_eq!(json["wordWrap"], "on");
        assert_eq!(json["minimap"]["enabled"], false);
        assert_eq!(json["lineNumbers"], "off");
    }

    #[test]
    fn test_theme_round_trip_names() {
        for theme in EditorTheme::ALL {
            assert_eq!(EditorTheme::from_str(theme.as_str()), theme);
        }
        assert_eq!(EditorTheme::from_str("unknown"), EditorTheme::VsDark);
    }

    #[test]
    fn test_options_persisted_under_fixed_key() {
        let storage = MemoryStorage::new();
        let mut store = PersistedStore::<EditorOptions, _>::load(storage.clone());
        store.update(|o| o.theme = EditorTheme::Vs).unwrap();

        let raw = storage.get("code-editor-options").unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["state"]["theme"], "vs");
        assert_eq!(value["version"], 0);

        let reloaded = PersistedStore::<EditorOptions, _>::load(storage);
        assert_eq!(reloaded.get().theme, EditorTheme::Vs);
    }

    #[test]
    fn test_restored_font_size_is_clamped() {
        let storage = MemoryStorage::new();
        storage
            .set(
                "code-editor-options",
                r#"{"state":{"theme":"vs","fontSize":200,"wordWrap":true,"minimap":true,"lineNumbers":true},"version":0}"#,
            )
            .unwrap();
        let store = PersistedStore::<EditorOptions, _>::load(storage);
        assert_eq!(store.get().font_size, MAX_FONT_SIZE);
        assert!(store.get().word_wrap);
    }

    #[test]
    fn test_guard_emits_user_edits() {
        let mut guard = ChangeGuard::new("a");
        assert_eq!(guard.on_editor_change("ab"), Some("ab".to_string()));
        // Blur with unchanged text does not emit twice
        assert_eq!(guard.on_editor_change("ab"), None);
    }

    #[test]
    fn test_guard_suppresses_echo_of_external_value() {
        let mut guard = ChangeGuard::new("");
        assert!(guard.push_external("reset", "typed"));
        // The editor fires a change event with the pushed value
        assert_eq!(guard.on_editor_change("reset"), None);
        assert_eq!(guard.last_external(), "reset");
    }

    #[test]
    fn test_guard_skips_push_when_editor_already_matches() {
        let mut guard = ChangeGuard::new("x");
        assert!(!guard.push_external("same", "same"));
    }
}
