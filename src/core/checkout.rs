//! Checkout session state
//!
//! Survives reloads so a buyer returning from the payment provider lands back
//! on the same checkout. Only the repo id, client secret and appearance are
//! persisted; the transient status is always reset on load.

use serde::{Deserialize, Serialize};

use super::store::Persist;

/// Payment element appearance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutAppearance {
    pub theme: String,
    pub color_primary: String,
}

impl Default for CheckoutAppearance {
    fn default() -> Self {
        Self {
            theme: "night".to_string(),
            color_primary: "#6366f1".to_string(),
        }
    }
}

/// Where the buyer currently is in the checkout
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum CheckoutStatus {
    #[default]
    Idle,
    /// Waiting for the backend to issue a client secret
    Starting,
    Open {
        resumed: bool,
    },
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct CheckoutSession {
    pub repo_id: Option<String>,
    pub client_secret: Option<String>,
    pub appearance: CheckoutAppearance,
    pub status: CheckoutStatus,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    repo_id: Option<String>,
    client_secret: Option<String>,
    appearance: CheckoutAppearance,
}

impl CheckoutSession {
    /// Reopen the stored session if it belongs to `repo_id`
    ///
    /// Returns false and moves to `Starting` when a new session is needed.
    pub fn resume(&mut self, repo_id: &str) -> bool {
        if self.is_active() && self.repo_id.as_deref() == Some(repo_id) {
            self.status = CheckoutStatus::Open { resumed: true };
            true
        } else {
            self.status = CheckoutStatus::Starting;
            false
        }
    }

    /// Start checkout for a repo with the client secret issued by the backend
    pub fn begin(&mut self, repo_id: impl Into<String>, client_secret: impl Into<String>) {
        self.repo_id = Some(repo_id.into());
        self.client_secret = Some(client_secret.into());
        self.status = CheckoutStatus::Open { resumed: false };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = CheckoutStatus::Failed(message.into());
    }

    /// Forget the session, keeping the buyer's appearance preference
    pub fn clear(&mut self) {
        self.repo_id = None;
        self.client_secret = None;
        self.status = CheckoutStatus::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.repo_id.is_some() && self.client_secret.is_some()
    }
}

impl Persist for CheckoutSession {
    const KEY: &'static str = "checkout-session";
    type Snapshot = CheckoutSnapshot;

    fn snapshot(&self) -> CheckoutSnapshot {
        CheckoutSnapshot {
            repo_id: self.repo_id.clone(),
            client_secret: self.client_secret.clone(),
            appearance: self.appearance.clone(),
        }
    }

    fn restore(&mut self, snapshot: CheckoutSnapshot) {
        self.repo_id = snapshot.repo_id;
        self.client_secret = snapshot.client_secret;
        self.appearance = snapshot.appearance;
        self.status = CheckoutStatus::Idle;
    }
}
