//! Signed-in user session
//!
//! The backend keeps the session in an HTTP-only cookie; the client only
//! asks who it is and carries the role into route guards.

use serde::{Deserialize, Serialize};

use super::access::Role;
use super::api::{ApiError, ApiRequest, Method, Transport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    user: SessionUser,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

fn parse_user(body: &str) -> Result<SessionUser, ApiError> {
    serde_json::from_str::<SessionEnvelope>(body)
        .map(|envelope| envelope.user)
        .map_err(|e| super::repo::SchemaError::Malformed(e.to_string()).into())
}

/// `GET /api/v1/auth/session`; 401 means signed out, not an error
pub async fn fetch_session<T: Transport>(transport: &T) -> Result<Option<SessionUser>, ApiError> {
    let response = transport
        .send(ApiRequest::get("/api/v1/auth/session"))
        .await?;
    if response.status == 401 {
        return Ok(None);
    }
    let response = response.error_for_status()?;
    parse_user(&response.body).map(Some)
}

/// `POST /api/v1/auth/login`
pub async fn login<T: Transport>(
    transport: &T,
    email: &str,
    password: &str,
) -> Result<SessionUser, ApiError> {
    let request = ApiRequest::json(
        Method::Post,
        "/api/v1/auth/login",
        &LoginRequest { email, password },
    )?;
    let response = transport.send(request).await?.error_for_status()?;
    parse_user(&response.body)
}

/// `POST /api/v1/auth/logout`
pub async fn logout<T: Transport>(transport: &T) -> Result<(), ApiError> {
    transport
        .send(ApiRequest::new(Method::Post, "/api/v1/auth/logout"))
        .await?
        .error_for_status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::testing::CannedTransport;
    use futures::executor::block_on;

    const USER: &str =
        r#"{"user":{"id":"u1","email":"a@b.c","username":"ann","role":"seller"}}"#;

    #[test]
    fn test_session_user_parsed_with_role() {
        let transport =
            CannedTransport::default().with(Method::Get, "/api/v1/auth/session", 200, USER);
        let user = block_on(fetch_session(&transport)).unwrap().unwrap();
        assert_eq!(user.username, "ann");
        assert_eq!(user.role, Role::Seller);
    }

    #[test]
    fn test_unauthorized_session_is_signed_out() {
        let transport =
            CannedTransport::default().with(Method::Get, "/api/v1/auth/session", 401, "");
        assert_eq!(block_on(fetch_session(&transport)), Ok(None));
    }

    #[test]
    fn test_missing_role_defaults_to_user() {
        let transport = CannedTransport::default().with(
            Method::Get,
            "/api/v1/auth/session",
            200,
            r#"{"user":{"id":"u1","email":"a@b.c","username":"ann"}}"#,
        );
        let user = block_on(fetch_session(&transport)).unwrap().unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_login_sends_credentials() {
        let transport =
            CannedTransport::default().with(Method::Post, "/api/v1/auth/login", 200, USER);
        let user = block_on(login(&transport, "a@b.c", "secret")).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(
            transport.requests.borrow()[0].body.as_deref(),
            Some(r#"{"email":"a@b.c","password":"secret"}"#)
        );
    }

    #[test]
    fn test_login_failure_carries_server_message() {
        let transport = CannedTransport::default().with(
            Method::Post,
            "/api/v1/auth/login",
            401,
            r#"{"message":"Invalid email or password"}"#,
        );
        let err = block_on(login(&transport, "a@b.c", "bad")).unwrap_err();
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[test]
    fn test_logout() {
        let transport =
            CannedTransport::default().with(Method::Post, "/api/v1/auth/logout", 204, "");
        assert!(block_on(logout(&transport)).is_ok());
    }
}
