//! Login form component
//!
//! Email/password sign-in against the session endpoint. Backend errors are
//! shown inline above the fields.

use leptos::prelude::*;
use leptos::task::spawn_local;

use super::context::{login, use_auth_context};
use crate::core::SessionUser;

fn email_error(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        Some("Email is required")
    } else if !value.contains('@') || !value.contains('.') {
        Some("Please enter a valid email")
    } else {
        None
    }
}

fn password_error(value: &str) -> Option<&'static str> {
    value.is_empty().then_some("Password is required")
}

#[component]
pub fn LoginForm(
    /// Called with the signed-in user
    #[prop(optional, into)]
    on_success: Option<Callback<SessionUser>>,
) -> impl IntoView {
    let auth = use_auth_context();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let email_message = RwSignal::new(None::<&'static str>);
    let password_message = RwSignal::new(None::<&'static str>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        auth.clear_error();

        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        email_message.set(email_error(&email_val));
        password_message.set(password_error(&password_val));
        if email_message.get_untracked().is_some() || password_message.get_untracked().is_some() {
            return;
        }

        spawn_local(async move {
            // Failures are surfaced through `auth.error`
            if let Ok(user) = login(email_val.trim(), &password_val).await
                && let Some(callback) = on_success
            {
                callback.run(user);
            }
        });
    };

    view! {
        <form on:submit=on_submit class="auth-form space-y-6" novalidate>
            <div class="text-center">
                <h2 class="text-2xl font-bold">"Welcome back"</h2>
                <p class="mt-2 text-sm">"Sign in to buy and sell components"</p>
            </div>

            {move || {
                auth.error.get().map(|error| {
                    view! { <div class="error-banner" role="alert">{error}</div> }
                })
            }}

            <div>
                <label for="email">"Email"</label>
                <input
                    type="email"
                    id="email"
                    name="email"
                    autocomplete="email"
                    placeholder="you@example.com"
                    prop:value=move || email.get()
                    on:input=move |ev| {
                        email.set(event_target_value(&ev));
                        email_message.set(None);
                    }
                    on:blur=move |_| email_message.set(email_error(&email.get_untracked()))
                />
                {move || email_message.get().map(|m| view! { <p class="field-error">{m}</p> })}
            </div>

            <div>
                <label for="password">"Password"</label>
                <input
                    type="password"
                    id="password"
                    name="password"
                    autocomplete="current-password"
                    prop:value=move || password.get()
                    on:input=move |ev| {
                        password.set(event_target_value(&ev));
                        password_message.set(None);
                    }
                />
                {move || password_message.get().map(|m| view! { <p class="field-error">{m}</p> })}
            </div>

            <button type="submit" class="btn-primary w-full" disabled=move || auth.loading.get()>
                {move || if auth.loading.get() { "Signing in..." } else { "Sign in" }}
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert_eq!(email_error(""), Some("Email is required"));
        assert_eq!(email_error("  "), Some("Email is required"));
        assert_eq!(email_error("ann"), Some("Please enter a valid email"));
        assert_eq!(email_error("ann@example.com"), None);
    }

    #[test]
    fn test_password_validation() {
        assert_eq!(password_error(""), Some("Password is required"));
        assert_eq!(password_error("x"), None);
    }
}
