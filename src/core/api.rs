//! Backend fetch boundary
//!
//! All calls to the marketplace backend go through a [`Transport`]. The
//! browser uses a `fetch`-based transport; tests plug in a canned one.
//! [`RepoClient`] owns the failure policy: nothing it does panics, and every
//! failure that reaches the user does so as exactly one toast.

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::notification::{Notification, Notify};
use super::repo::{PreviewSource, Repo, RepoDraft, RepoPatch, SchemaError};

/// HTTP method subset used by the backend API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// JSON body
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Request with a JSON-encoded body
    pub fn json<B: Serialize>(
        method: Method,
        path: impl Into<String>,
        body: &B,
    ) -> Result<Self, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(Self {
            method,
            path: path.into(),
            body: Some(body),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`ApiError::Status`]
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Status {
                status: self.status,
                message: server_message(&self.body),
            })
        }
    }
}

/// Sends requests to the backend
pub trait Transport {
    fn send(&self, request: ApiRequest) -> LocalBoxFuture<'static, Result<ApiResponse, ApiError>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: ApiRequest) -> LocalBoxFuture<'static, Result<ApiResponse, ApiError>> {
        (**self).send(request)
    }
}

/// Fetch boundary failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("invalid repo id `{0}`")]
    InvalidId(String),

    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error("backend is not reachable from this context")]
    Unavailable,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message shown to the user in toasts and error pages
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Unavailable => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Status { status: 401, .. } => "Please sign in to continue.".to_string(),
            ApiError::Status { status: 403, .. } => {
                "You do not have permission to do that.".to_string()
            }
            ApiError::Status { status: 404, .. } => "Repo not found.".to_string(),
            ApiError::Status { status, .. } => format!("Request failed ({}).", status),
            ApiError::Schema(_) => "The server sent data we could not read.".to_string(),
            ApiError::InvalidId(_) => "That repo link is not valid.".to_string(),
            ApiError::Encode(_) => "Could not prepare the request.".to_string(),
        }
    }
}

/// Best-effort extraction of a human-readable message from an error body
pub fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return ["message", "error", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
    }
    // Plain-text bodies are used as-is; HTML error pages are not
    if trimmed.starts_with('<') || trimmed.len() > 200 {
        return None;
    }
    Some(trimmed.to_string())
}

/// Repo ids are opaque tokens; reject anything that could alter the path
pub fn validate_repo_id(id: &str) -> Result<&str, ApiError> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(ApiError::InvalidId(id.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutStarted {
    client_secret: String,
}

/// Repo endpoints with the toast-on-failure policy
pub struct RepoClient<T: Transport, N: Notify> {
    transport: T,
    notifier: N,
}

impl<T: Transport, N: Notify> RepoClient<T, N> {
    pub fn new(transport: T, notifier: N) -> Self {
        Self {
            transport,
            notifier,
        }
    }

    /// `GET /api/v1/repo/{id}/server`
    ///
    /// Errors are returned, not toasted: the preview page renders them as a
    /// generic error page.
    pub async fn fetch_preview(&self, id: &str) -> Result<PreviewSource, ApiError> {
        let id = validate_repo_id(id)?;
        let response = self
            .transport
            .send(ApiRequest::get(format!("/api/v1/repo/{}/server", id)))
            .await?
            .error_for_status()?;
        Ok(PreviewSource::from_envelope(&response.body)?)
    }

    /// `GET /repos/{id}`; any failure is logged, toasted once and flattened
    /// to `None`
    pub async fn get_repo_by_id(&self, id: &str) -> Option<Repo> {
        match self.fetch_repo(id).await {
            Ok(repo) => Some(repo),
            Err(e) => {
                leptos::logging::error!("Failed to load repo {}: {}", id, e);
                self.notifier
                    .notify(Notification::error("Could not load repo", e.user_message()));
                None
            }
        }
    }

    async fn fetch_repo(&self, id: &str) -> Result<Repo, ApiError> {
        let id = validate_repo_id(id)?;
        let response = self
            .transport
            .send(ApiRequest::get(format!("/repos/{}", id)))
            .await?
            .error_for_status()?;
        Ok(Repo::from_json(&response.body)?)
    }

    /// `POST /repos`
    pub async fn create_repo(&self, draft: &RepoDraft) -> Result<Repo, ApiError> {
        let result: Result<Repo, ApiError> = async {
            let request = ApiRequest::json(Method::Post, "/repos", draft)?;
            let response = self.transport.send(request).await?.error_for_status()?;
            Ok(Repo::from_json(&response.body)?)
        }
        .await;
        self.report("Repo created", "Could not create repo", result)
    }

    /// `PUT /repos/{id}` with only the fields set on `patch`
    pub async fn update_repo(&self, id: &str, patch: &RepoPatch) -> Result<Repo, ApiError> {
        let result: Result<Repo, ApiError> = async {
            let id = validate_repo_id(id)?;
            let request = ApiRequest::json(Method::Put, format!("/repos/{}", id), patch)?;
            let response = self.transport.send(request).await?.error_for_status()?;
            Ok(Repo::from_json(&response.body)?)
        }
        .await;
        self.report("Changes saved", "Could not save repo", result)
    }

    /// `DELETE /repos/{id}`
    pub async fn delete_repo(&self, id: &str) -> Result<(), ApiError> {
        let result: Result<(), ApiError> = async {
            let id = validate_repo_id(id)?;
            self.transport
                .send(ApiRequest::delete(format!("/repos/{}", id)))
                .await?
                .error_for_status()?;
            Ok(())
        }
        .await;
        self.report("Repo deleted", "Could not delete repo", result)
    }

    /// `POST /api/v1/repo/{id}/checkout`; returns the payment client secret
    pub async fn start_checkout(&self, id: &str) -> Result<String, ApiError> {
        let result: Result<String, ApiError> = async {
            let id = validate_repo_id(id)?;
            let response = self
                .transport
                .send(ApiRequest::new(
                    Method::Post,
                    format!("/api/v1/repo/{}/checkout", id),
                ))
                .await?
                .error_for_status()?;
            let started: CheckoutStarted = serde_json::from_str(&response.body)
                .map_err(|e| SchemaError::Malformed(e.to_string()))?;
            Ok(started.client_secret)
        }
        .await;
        if let Err(e) = &result {
            leptos::logging::error!("Could not start checkout: {}", e);
            self.notifier
                .notify(Notification::error("Could not start checkout", e.user_message()));
        }
        result
    }

    /// One toast per mutation outcome
    fn report<R>(
        &self,
        success: &str,
        failure: &str,
        result: Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        match &result {
            Ok(_) => self.notifier.notify(Notification::success(success, "")),
            Err(e) => {
                leptos::logging::error!("{}: {}", failure, e);
                self.notifier
                    .notify(Notification::error(failure, e.user_message()));
            }
        }
        result
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use futures::executor::block_on;

    fn client(
        transport: &CannedTransport,
        notifier: &RecordingNotifier,
    ) -> RepoClient<CannedTransport, RecordingNotifier> {
        RepoClient::new(transport.clone(), notifier.clone())
    }

    #[test]
    fn test_get_repo_by_id_not_found_yields_none_and_one_toast() {
        let transport = CannedTransport::default();
        let notifier = RecordingNotifier::default();

        let repo = block_on(client(&transport, &notifier).get_repo_by_id("missing"));

        assert!(repo.is_none());
        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Not found");
        assert_eq!(notifier.notifications.borrow().len(), 1);
    }

    #[test]
    fn test_get_repo_by_id_success() {
        let transport = CannedTransport::default().with(
            Method::Get,
            "/repos/abc",
            200,
            &repo_body("abc", "x", ".a{}"),
        );
        let notifier = RecordingNotifier::default();

        let repo = block_on(client(&transport, &notifier).get_repo_by_id("abc")).unwrap();

        assert_eq!(repo.id, "abc");
        assert_eq!(repo.source_css, ".a{}");
        assert!(notifier.notifications.borrow().is_empty());
    }

    #[test]
    fn test_get_repo_by_id_schema_mismatch_is_toasted() {
        let transport = CannedTransport::default().with(
            Method::Get,
            "/repos/abc",
            200,
            r#"{"id":"abc","price":"free"}"#,
        );
        let notifier = RecordingNotifier::default();

        assert!(block_on(client(&transport, &notifier).get_repo_by_id("abc")).is_none());
        assert_eq!(notifier.errors().len(), 1);
        assert_eq!(
            notifier.errors()[0].message,
            "The server sent data we could not read."
        );
    }

    #[test]
    fn test_network_failure_is_toasted() {
        let transport = CannedTransport {
            offline: true,
            ..Default::default()
        };
        let notifier = RecordingNotifier::default();

        assert!(block_on(client(&transport, &notifier).get_repo_by_id("abc")).is_none());
        assert_eq!(notifier.errors().len(), 1);
    }

    #[test]
    fn test_invalid_id_never_reaches_the_network() {
        let transport = CannedTransport::default();
        let notifier = RecordingNotifier::default();

        assert!(block_on(client(&transport, &notifier).get_repo_by_id("../admin")).is_none());
        assert!(transport.requests.borrow().is_empty());
        assert_eq!(notifier.errors().len(), 1);
    }

    #[test]
    fn test_fetch_preview_parses_envelope_without_toast() {
        let transport = CannedTransport::default().with(
            Method::Get,
            "/api/v1/repo/abc/server",
            200,
            r#"{"repo":{"sourceJs":"export default 1","sourceCss":".x{}"}}"#,
        );
        let notifier = RecordingNotifier::default();
        let repo_client = client(&transport, &notifier);

        let source = block_on(repo_client.fetch_preview("abc")).unwrap();
        assert_eq!(source.source_js, "export default 1");
        assert_eq!(source.source_css, ".x{}");

        let missing = block_on(repo_client.fetch_preview("nope")).unwrap_err();
        assert!(missing.is_not_found());
        assert!(notifier.notifications.borrow().is_empty());
    }

    #[test]
    fn test_update_sends_only_patched_fields() {
        let transport = CannedTransport::default().with(
            Method::Put,
            "/repos/abc",
            200,
            &repo_body("abc", "new", ""),
        );
        let notifier = RecordingNotifier::default();

        let patch = RepoPatch {
            source_js: Some("new".to_string()),
            ..Default::default()
        };
        let repo = block_on(client(&transport, &notifier).update_repo("abc", &patch)).unwrap();

        assert_eq!(repo.source_js, "new");
        let requests = transport.requests.borrow();
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"sourceJs":"new"}"#));
        assert_eq!(notifier.notifications.borrow().len(), 1);
        assert!(notifier.errors().is_empty());
    }

    #[test]
    fn test_mutation_failure_toasts_server_message() {
        let transport = CannedTransport::default()
            .with(
                Method::Post,
                "/repos",
                422,
                r#"{"error":"Name already taken"}"#,
            )
            .with(Method::Delete, "/repos/abc", 403, "");
        let notifier = RecordingNotifier::default();
        let repo_client = client(&transport, &notifier);

        let created = block_on(repo_client.create_repo(&RepoDraft::default()));
        assert_eq!(created.unwrap_err().status(), Some(422));

        let deleted = block_on(repo_client.delete_repo("abc"));
        assert!(deleted.is_err());

        let errors = notifier.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Name already taken");
        assert_eq!(errors[1].message, "You do not have permission to do that.");
    }

    #[test]
    fn test_delete_success() {
        let transport = CannedTransport::default().with(Method::Delete, "/repos/abc", 204, "");
        let notifier = RecordingNotifier::default();
        assert!(block_on(client(&transport, &notifier).delete_repo("abc")).is_ok());
        assert!(notifier.errors().is_empty());
    }

    #[test]
    fn test_start_checkout_returns_client_secret() {
        let transport = CannedTransport::default().with(
            Method::Post,
            "/api/v1/repo/abc/checkout",
            200,
            r#"{"clientSecret":"pi_123_secret"}"#,
        );
        let notifier = RecordingNotifier::default();
        let repo_client = client(&transport, &notifier);

        assert_eq!(
            block_on(repo_client.start_checkout("abc")),
            Ok("pi_123_secret".to_string())
        );
        assert!(block_on(repo_client.start_checkout("other")).is_err());
        assert_eq!(notifier.errors().len(), 1);
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"message":" Bad price "}"#),
            Some("Bad price".to_string())
        );
        assert_eq!(
            server_message(r#"{"error":"nope","code":"X"}"#),
            Some("nope".to_string())
        );
        assert_eq!(server_message(r#"{"code":"X"}"#), None);
        assert_eq!(server_message("Gateway timeout"), Some("Gateway timeout".to_string()));
        assert_eq!(server_message("<html>oops</html>"), None);
        assert_eq!(server_message("   "), None);
    }

    #[test]
    fn test_repo_id_validation() {
        assert!(validate_repo_id("abc-123_X").is_ok());
        assert!(validate_repo_id("").is_err());
        assert!(validate_repo_id("a/b").is_err());
        assert!(validate_repo_id("a?b").is_err());
    }
}
