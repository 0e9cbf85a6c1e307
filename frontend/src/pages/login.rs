use crate::api::LoginRequest;
use crate::components::layout::ErrorMessage;
use crate::state::auth::use_login_action;
use crate::utils::nav::{BrowserNavigator, Navigate};
use leptos::ev::SubmitEvent;
use leptos::*;

pub fn validate_login(email: &str, password: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Enter your email address".into());
    }
    if !email.contains('@') {
        return Err("Enter a valid email address".into());
    }
    if password.is_empty() {
        return Err("Enter your password".into());
    }
    Ok(())
}

/// The logout funnel redirects here with a `reason` query parameter; turn it
/// into the banner the user sees.
pub fn reason_banner(query: &str) -> Option<&'static str> {
    let reason = query
        .trim_start_matches('?')
        .split('&')
        .find_map(|pair| pair.strip_prefix("reason="))?;
    match reason {
        "session_expired" => Some("Your session expired. Please sign in again."),
        "logged_out_another_tab" => Some("You were signed out in another tab."),
        "logged_out_another_device" => Some("You were signed out from another device."),
        "security" => Some("You were signed out for security reasons."),
        "user_initiated" => Some("You signed out."),
        _ => None,
    }
}

fn current_query() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|window| window.location().search().ok())
            .unwrap_or_default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        String::new()
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);
    let banner = reason_banner(&current_query());

    let login_action = use_login_action();
    let pending = login_action.pending();

    create_effect(move |_| {
        if let Some(result) = login_action.value().get() {
            match result {
                Ok(()) => {
                    set_error.set(None);
                    BrowserNavigator.navigate("/");
                }
                Err(err) => set_error.set(Some(err.form_message())),
            }
        }
    });

    let handle_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }
        let email_value = email.get_untracked();
        let password_value = password.get_untracked();
        if let Err(message) = validate_login(&email_value, &password_value) {
            set_error.set(Some(message));
            return;
        }
        set_error.set(None);
        login_action.dispatch(LoginRequest {
            email: email_value.trim().to_string(),
            password: password_value,
        });
    };

    view! {
        <div class="min-h-screen bg-surface flex items-center justify-center px-4">
            <div class="max-w-md w-full bg-surface-elevated rounded-lg shadow p-8">
                <h1 class="text-2xl font-semibold text-fg mb-6">"Sign in to TaskDeck"</h1>
                {banner.map(|message| view! {
                    <div class="bg-status-info-bg border border-status-info-border text-status-info-text px-4 py-3 rounded mb-4">
                        <p class="text-sm">{message}</p>
                    </div>
                })}
                {move || error.get().map(|message| view! { <ErrorMessage message/> })}
                <form on:submit=handle_submit>
                    <label class="block text-sm font-medium text-fg-muted mb-1" for="email">
                        "Email"
                    </label>
                    <input
                        id="email"
                        type="email"
                        class="w-full border border-border rounded px-3 py-2 mb-4"
                        prop:value=email
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />
                    <label class="block text-sm font-medium text-fg-muted mb-1" for="password">
                        "Password"
                    </label>
                    <input
                        id="password"
                        type="password"
                        class="w-full border border-border rounded px-3 py-2 mb-6"
                        prop:value=password
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                    <button
                        type="submit"
                        class="w-full bg-action-primary-bg text-action-primary-fg py-2 rounded font-medium disabled:opacity-50"
                        disabled=move || pending.get()
                    >
                        {move || if pending.get() { "Signing in..." } else { "Sign in" }}
                    </button>
                </form>
                <p class="text-sm text-fg-muted mt-4">
                    "No account yet? "
                    <a href="/signup" class="text-action-primary-bg hover:underline">"Sign up"</a>
                </p>
            </div>
        </div>
    }
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::LoginPage;
    use crate::test_support::helpers::provide_anonymous;
    use crate::test_support::ssr::render_to_string;
    use leptos::*;

    #[test]
    fn login_page_renders_the_form() {
        let html = render_to_string(move || {
            provide_anonymous();
            view! { <LoginPage /> }
        });
        assert!(html.contains("Sign in to TaskDeck"));
        assert!(html.contains("Password"));
        assert!(html.contains("/signup"));
    }
}
