use crate::api::SignupRequest;
use crate::components::layout::ErrorMessage;
use crate::state::auth::use_signup_action;
use crate::utils::nav::{BrowserNavigator, Navigate};
use leptos::ev::SubmitEvent;
use leptos::*;

const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Enter your name".into());
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err("Enter a valid email address".into());
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 8 characters".into());
    }
    Ok(())
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let (name, set_name) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);

    let signup_action = use_signup_action();
    let pending = signup_action.pending();

    create_effect(move |_| {
        if let Some(result) = signup_action.value().get() {
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
        let name_value = name.get_untracked();
        let email_value = email.get_untracked();
        let password_value = password.get_untracked();
        if let Err(message) = validate_signup(&name_value, &email_value, &password_value) {
            set_error.set(Some(message));
            return;
        }
        set_error.set(None);
        signup_action.dispatch(SignupRequest {
            name: name_value.trim().to_string(),
            email: email_value.trim().to_string(),
            password: password_value,
        });
    };

    view! {
        <div class="min-h-screen bg-surface flex items-center justify-center px-4">
            <div class="max-w-md w-full bg-surface-elevated rounded-lg shadow p-8">
                <h1 class="text-2xl font-semibold text-fg mb-6">"Create your TaskDeck account"</h1>
                {move || error.get().map(|message| view! { <ErrorMessage message/> })}
                <form on:submit=handle_submit>
                    <label class="block text-sm font-medium text-fg-muted mb-1" for="name">
                        "Name"
                    </label>
                    <input
                        id="name"
                        type="text"
                        class="w-full border border-border rounded px-3 py-2 mb-4"
                        prop:value=name
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                    />
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
                        {move || if pending.get() { "Creating account..." } else { "Sign up" }}
                    </button>
                </form>
                <p class="text-sm text-fg-muted mt-4">
                    "Already have an account? "
                    <a href="/login" class="text-action-primary-bg hover:underline">"Sign in"</a>
                </p>
            </div>
        </div>
    }
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::SignupPage;
    use crate::test_support::helpers::provide_anonymous;
    use crate::test_support::ssr::render_to_string;
    use leptos::*;

    #[test]
    fn signup_page_renders_the_form() {
        let html = render_to_string(move || {
            provide_anonymous();
            view! { <SignupPage /> }
        });
        assert!(html.contains("Create your TaskDeck account"));
        assert!(html.contains("/login"));
    }
}
