//! Dashboard page
//!
//! One component serves every `/dashboard/...` section. Section links are
//! filtered through the access table so users only see what they can open.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use leptos_router::hooks::{use_location, use_navigate};

use super::layout::PageLayout;
use crate::core::{AccessDecision, Language, RepoClient, RepoDraft, Role, authorize};
use crate::ui::auth::use_auth_context;
use crate::ui::browser::FetchTransport;
use crate::ui::notifications::use_notifications;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Section {
    path: &'static str,
    title: &'static str,
    blurb: &'static str,
}

const SECTIONS: &[Section] = &[
    Section {
        path: "/dashboard",
        title: "Overview",
        blurb: "Your purchases and account.",
    },
    Section {
        path: "/dashboard/repos",
        title: "My repos",
        blurb: "Create listings and edit their source.",
    },
    Section {
        path: "/dashboard/sales",
        title: "Sales",
        blurb: "Orders for the repos you sell.",
    },
    Section {
        path: "/dashboard/moderation",
        title: "Moderation",
        blurb: "Listings waiting for review.",
    },
    Section {
        path: "/dashboard/admin",
        title: "Admin",
        blurb: "Users and platform settings.",
    },
];

/// Sections `role` may open
fn visible_sections(role: Role) -> impl Iterator<Item = &'static Section> {
    SECTIONS
        .iter()
        .filter(move |s| authorize(Some(role), s.path) == AccessDecision::Allow)
}

/// Deepest section containing `path`
fn current_section(path: &str) -> &'static Section {
    SECTIONS
        .iter()
        .filter(|s| path == s.path || path.starts_with(&format!("{}/", s.path)))
        .max_by_key(|s| s.path.len())
        .unwrap_or(&SECTIONS[0])
}

fn parse_price(raw: &str) -> Result<f64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err("Price must be a non-negative number"),
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth_context();
    let location = use_location();
    let section = Memo::new(move |_| current_section(&location.pathname.get()));
    let role = Memo::new(move |_| auth.state.get().role().unwrap_or_default());

    view! {
        <PageLayout>
            <div class="dashboard">
                <nav class="dashboard-nav">
                    {move || {
                        let active = section.get().path;
                        visible_sections(role.get())
                            .map(|s| {
                                let class = if s.path == active { "nav-link active" } else { "nav-link" };
                                view! { <A href=s.path attr:class=class>{s.title}</A> }
                            })
                            .collect_view()
                    }}
                </nav>
                <section class="dashboard-content">
                    <h1 class="page-title">{move || section.get().title}</h1>
                    <p class="page-subtitle">{move || section.get().blurb}</p>
                    <Show when=move || section.get().path == "/dashboard/repos">
                        <CreateRepoForm />
                    </Show>
                </section>
            </div>
        </PageLayout>
    }
}

/// New listing form; opens the editor for the created repo
#[component]
fn CreateRepoForm() -> impl IntoView {
    let notifications = use_notifications();
    let name = RwSignal::new(String::new());
    let price = RwSignal::new(String::new());
    let language = RwSignal::new(Language::Tsx);
    let form_error = RwSignal::new(None::<&'static str>);
    let creating = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if creating.get_untracked() {
            return;
        }
        let name_val = name.get_untracked().trim().to_string();
        if name_val.is_empty() {
            form_error.set(Some("Name is required"));
            return;
        }
        let price_val = match parse_price(&price.get_untracked()) {
            Ok(price) => price,
            Err(e) => {
                form_error.set(Some(e));
                return;
            }
        };
        form_error.set(None);

        let mut draft = RepoDraft::new(name_val, language.get_untracked());
        draft.price = price_val;
        creating.set(true);
        spawn_local(async move {
            let client = RepoClient::new(FetchTransport, notifications);
            if let Ok(repo) = client.create_repo(&draft).await {
                let navigate = use_navigate();
                navigate(&format!("/dashboard/repos/{}/edit", repo.id), Default::default());
            }
            creating.set(false);
        });
    };

    view! {
        <form class="card create-repo-form" on:submit=on_submit novalidate>
            <h2 class="card-title">"New repo"</h2>
            {move || form_error.get().map(|e| view! { <p class="field-error">{e}</p> })}
            <label for="repo-name">"Name"</label>
            <input
                id="repo-name"
                type="text"
                prop:value=move || name.get()
                on:input=move |ev| name.set(event_target_value(&ev))
            />
            <label for="repo-price">"Price (USD)"</label>
            <input
                id="repo-price"
                type="text"
                inputmode="decimal"
                placeholder="0"
                prop:value=move || price.get()
                on:input=move |ev| price.set(event_target_value(&ev))
            />
            <label for="repo-language">"Language"</label>
            <select
                id="repo-language"
                on:change=move |ev| {
                    language.set(if event_target_value(&ev) == "jsx" { Language::Jsx } else { Language::Tsx });
                }
            >
                <option value="tsx" selected=move || language.get() == Language::Tsx>"TSX"</option>
                <option value="jsx" selected=move || language.get() == Language::Jsx>"JSX"</option>
            </select>
            <button type="submit" class="btn-primary" disabled=move || creating.get()>
                {move || if creating.get() { "Creating..." } else { "Create repo" }}
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(role: Role) -> Vec<&'static str> {
        visible_sections(role).map(|s| s.title).collect()
    }

    #[test]
    fn test_sections_follow_access_table() {
        assert_eq!(titles(Role::User), vec!["Overview"]);
        assert_eq!(titles(Role::Seller), vec!["Overview", "My repos", "Sales"]);
        assert_eq!(titles(Role::Moderator), vec!["Overview", "Moderation"]);
        assert_eq!(titles(Role::Admin).len(), SECTIONS.len());
    }

    #[test]
    fn test_current_section_picks_deepest_match() {
        assert_eq!(current_section("/dashboard").title, "Overview");
        assert_eq!(current_section("/dashboard/repos").title, "My repos");
        assert_eq!(current_section("/dashboard/repos/abc/edit").title, "My repos");
        assert_eq!(current_section("/dashboard/reposx").title, "Overview");
    }

    #[test]
    fn test_price_parsing() {
        assert_eq!(parse_price(""), Ok(0.0));
        assert_eq!(parse_price(" 19.5 "), Ok(19.5));
        assert!(parse_price("-1").is_err());
        assert!(parse_price("abc").is_err());
        assert!(parse_price("NaN").is_err());
    }
}
