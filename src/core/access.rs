//! Role-based route access
//!
//! One declarative table maps path prefixes to the roles allowed to open
//! them. [`authorize`] is the only place that reads it; route guards call it
//! before any page logic runs.

use serde::{Deserialize, Serialize};

/// User role as reported by the backend session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    Seller,
    #[default]
    User,
}

impl Role {
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Moderator => "Moderator",
            Role::Seller => "Seller",
            Role::User => "User",
        }
    }

    /// Landing path after login and target of forbidden redirects
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/dashboard/admin",
            Role::Moderator => "/dashboard/moderation",
            Role::Seller => "/dashboard/repos",
            Role::User => "/dashboard",
        }
    }
}

/// Prefix rule: paths under `prefix` require one of `roles`
#[derive(Debug, Clone, Copy)]
pub struct AccessRule {
    pub prefix: &'static str,
    pub roles: &'static [Role],
}

const ANY_SIGNED_IN: &[Role] = &[Role::Admin, Role::Moderator, Role::Seller, Role::User];

/// Access table; the longest matching prefix wins
pub const ACCESS_TABLE: &[AccessRule] = &[
    AccessRule {
        prefix: "/dashboard",
        roles: ANY_SIGNED_IN,
    },
    AccessRule {
        prefix: "/dashboard/admin",
        roles: &[Role::Admin],
    },
    AccessRule {
        prefix: "/dashboard/moderation",
        roles: &[Role::Admin, Role::Moderator],
    },
    AccessRule {
        prefix: "/dashboard/repos",
        roles: &[Role::Admin, Role::Seller],
    },
    AccessRule {
        prefix: "/dashboard/sales",
        roles: &[Role::Admin, Role::Seller],
    },
    AccessRule {
        prefix: "/checkout",
        roles: ANY_SIGNED_IN,
    },
];

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// Not signed in; go to login and come back afterwards
    RequireLogin { redirect: String },
    /// Signed in without a suitable role
    Forbidden { redirect: &'static str },
}

/// True when `path` equals `prefix` or continues it with a new segment
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

/// Rule governing `path`, if any
pub fn rule_for(path: &str) -> Option<&'static AccessRule> {
    ACCESS_TABLE
        .iter()
        .filter(|rule| matches_prefix(path, rule.prefix))
        .max_by_key(|rule| rule.prefix.len())
}

/// Decide whether a user with `role` (None when signed out) may open `path`
pub fn authorize(role: Option<Role>, path: &str) -> AccessDecision {
    let Some(rule) = rule_for(path) else {
        return AccessDecision::Allow;
    };
    match role {
        None => AccessDecision::RequireLogin {
            redirect: login_redirect(path),
        },
        Some(role) if rule.roles.contains(&role) => AccessDecision::Allow,
        Some(role) => AccessDecision::Forbidden {
            redirect: role.home_path(),
        },
    }
}

/// `/login?redirect=<path>` with the path percent-encoded
pub fn login_redirect(path: &str) -> String {
    format!("/login?redirect={}", urlencoding::encode(path))
}
