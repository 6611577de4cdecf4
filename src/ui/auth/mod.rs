//! Authentication UI module
//!
//! Session context, login form and the role-based route guard.

mod context;
mod guard;
mod login_form;

pub use context::{AuthContext, AuthState, logout, provide_auth_context, use_auth_context};
pub use guard::RequireAccess;
pub use login_form::LoginForm;
