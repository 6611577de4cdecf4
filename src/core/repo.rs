//! Repo records as served by the backend
//!
//! A repo is a sellable UI component: source text, CSS and listing metadata.
//! Responses are parsed against a fixed schema; anything that does not match
//! is rejected with a [`SchemaError`] instead of being partially accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema mismatch on a backend response
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Listing visibility
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Moderation status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepoStatus {
    #[default]
    Pending,
    Active,
    Rejected,
}

impl RepoStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            RepoStatus::Pending => "Pending review",
            RepoStatus::Active => "Active",
            RepoStatus::Rejected => "Rejected",
        }
    }
}

/// Source language variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "JSX")]
    Jsx,
    #[default]
    #[serde(alias = "TSX")]
    Tsx,
}

impl Language {
    /// Editor language mode for this variant
    pub fn editor_mode(&self) -> &'static str {
        match self {
            Language::Jsx => "javascript",
            Language::Tsx => "typescript",
        }
    }

    /// File name handed to the preview compiler so it picks the right syntax
    pub fn file_name(&self) -> &'static str {
        match self {
            Language::Jsx => "preview.jsx",
            Language::Tsx => "preview.tsx",
        }
    }
}

/// Full repo record (`GET /repos/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repo {
    pub id: String,
    pub user_id: String,
    pub source_js: String,
    #[serde(default)]
    pub source_css: String,
    pub visibility: Visibility,
    pub status: RepoStatus,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub language: Language,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Repo {
    /// Parse and validate a repo record
    pub fn from_json(body: &str) -> Result<Self, SchemaError> {
        let repo: Repo =
            serde_json::from_str(body).map_err(|e| SchemaError::Malformed(e.to_string()))?;
        repo.validate()?;
        Ok(repo)
    }

    /// Check field-level constraints serde cannot express
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.id.trim().is_empty() {
            return Err(SchemaError::InvalidField {
                field: "id",
                reason: "must not be empty".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(SchemaError::InvalidField {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(SchemaError::InvalidField {
                field: "price",
                reason: format!("expected a non-negative amount, got {}", self.price),
            });
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(SchemaError::InvalidField {
                field: "tags",
                reason: "tags must not be blank".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Source pair fed to the preview pipeline
    pub fn preview_source(&self) -> PreviewSource {
        PreviewSource {
            source_js: self.source_js.clone(),
            source_css: self.source_css.clone(),
            name: Some(self.name.clone()),
            description: self.description.clone(),
            language: Some(self.language),
        }
    }
}

/// Fields sent when a seller creates a repo (`POST /repos`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RepoDraft {
    pub name: String,
    pub description: Option<String>,
    pub source_js: String,
    pub source_css: String,
    pub visibility: Visibility,
    pub price: f64,
    pub tags: Vec<String>,
    pub language: Language,
}

impl RepoDraft {
    pub fn new(name: impl Into<String>, language: Language) -> Self {
        Self {
            name: name.into(),
            language,
            ..Default::default()
        }
    }
}

/// Partial update (`PUT /repos/{id}`); unset fields are omitted from the body
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RepoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_js: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl RepoPatch {
    /// Patch carrying only edited source text
    pub fn sources(source_js: impl Into<String>, source_css: impl Into<String>) -> Self {
        Self {
            source_js: Some(source_js.into()),
            source_css: Some(source_css.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Source text and CSS of a repo, as needed by the live preview
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSource {
    pub source_js: String,
    #[serde(default)]
    pub source_css: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Markdown listing description
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<Language>,
}

/// Envelope of `GET /api/v1/repo/{id}/server`
#[derive(Debug, Deserialize)]
struct PreviewEnvelope {
    repo: PreviewSource,
}

impl PreviewSource {
    /// Parse the `{ repo: { sourceJs, sourceCss, ... } }` envelope
    pub fn from_envelope(body: &str) -> Result<Self, SchemaError> {
        serde_json::from_str::<PreviewEnvelope>(body)
            .map(|env| env.repo)
            .map_err(|e| SchemaError::Malformed(e.to_string()))
    }

    /// Language to compile as; envelopes without one are treated as TSX,
    /// which also accepts plain JSX
    pub fn language(&self) -> Language {
        self.language.unwrap_or_default()
    }
}
