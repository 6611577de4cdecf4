//! Application pages
//!
//! Landing, login, dashboard sections, repo editor, public repo preview,
//! checkout and the 404/500 pages.

mod checkout;
mod dashboard;
mod landing;
mod layout;
mod login;
mod not_found;
mod repo_editor;
mod repo_preview;
mod server_error;

pub use checkout::CheckoutPage;
pub use dashboard::DashboardPage;
pub use landing::LandingPage;
pub use layout::{AppHeader, PageLayout};
pub use login::LoginPage;
pub use not_found::NotFoundPage;
pub use repo_editor::RepoEditorPage;
pub use repo_preview::RepoPreviewPage;
pub use server_error::ServerErrorPage;
