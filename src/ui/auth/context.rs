//! Auth context for the signed-in session
//!
//! The session lives in an HTTP-only cookie owned by the backend. This context
//! only mirrors who is signed in (and with which role) so route guards and
//! headers can react to it.

use leptos::prelude::*;

use crate::core::session::{self, SessionUser};
use crate::core::{ApiError, Role};
use crate::ui::browser::FetchTransport;

/// Authentication state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// Session check in flight
    #[default]
    Loading,
    Unauthenticated,
    Authenticated(SessionUser),
}

impl AuthState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, AuthState::Loading)
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            AuthState::Authenticated(user) => Some(user.role),
            _ => None,
        }
    }
}

/// Auth context providing authentication state and actions
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: RwSignal<AuthState>,
    /// Login request in flight
    pub loading: RwSignal<bool>,
    /// Error message from the last login attempt
    pub error: RwSignal<Option<String>>,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state.get(), AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<SessionUser> {
        match self.state.get() {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }
}

/// Provide auth context to the component tree
pub fn provide_auth_context() -> AuthContext {
    // Loading on both server and client; the session is only known after hydration
    let ctx = AuthContext {
        state: RwSignal::new(AuthState::Loading),
        loading: RwSignal::new(false),
        error: RwSignal::new(None),
    };

    #[cfg(not(feature = "ssr"))]
    {
        use leptos::task::spawn_local;

        let state = ctx.state;
        Effect::new(move |_| {
            spawn_local(async move {
                match session::fetch_session(&FetchTransport).await {
                    Ok(Some(user)) => state.set(AuthState::Authenticated(user)),
                    Ok(None) => state.set(AuthState::Unauthenticated),
                    Err(e) => {
                        leptos::logging::warn!("Session check failed: {}", e);
                        state.set(AuthState::Unauthenticated);
                    }
                }
            });
        });
    }

    provide_context(ctx);
    ctx
}

/// Get auth context from the component tree
pub fn use_auth_context() -> AuthContext {
    expect_context::<AuthContext>()
}

/// Login with email and password
pub async fn login(email: &str, password: &str) -> Result<SessionUser, ApiError> {
    let ctx = use_auth_context();
    ctx.loading.set(true);
    ctx.error.set(None);

    let result = session::login(&FetchTransport, email, password).await;

    ctx.loading.set(false);
    match &result {
        Ok(user) => ctx.state.set(AuthState::Authenticated(user.clone())),
        Err(e) => {
            leptos::logging::warn!("Login failed: {}", e);
            ctx.error.set(Some(e.user_message()));
        }
    }
    result
}

/// Logout; local state is cleared whatever the backend answers
pub async fn logout() {
    let ctx = use_auth_context();
    if let Err(e) = session::logout(&FetchTransport).await {
        leptos::logging::warn!("Logout request failed: {}", e);
    }
    ctx.state.set(AuthState::Unauthenticated);
}
