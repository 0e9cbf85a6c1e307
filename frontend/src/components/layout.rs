use crate::components::notifications::NotificationList;
use crate::components::session_warning::SessionWarningBanner;
use crate::session::use_session;
use crate::state::auth::use_auth;
use crate::utils::time::format_countdown;
use leptos::*;

#[component]
pub fn Header() -> impl IntoView {
    let auth = use_auth().signal();
    let session = store_value(use_session());

    let countdown_label = move || {
        session.with_value(|session| {
            session
                .as_ref()
                .map(|session| format_countdown(session.remaining_ms().get()))
                .unwrap_or_default()
        })
    };
    let on_logout = move |_| {
        session.with_value(|session| {
            if let Some(session) = session {
                session.logout();
            }
        })
    };

    view! {
        <header class="bg-surface-elevated shadow-sm border-b border-border">
            <div class="max-w-5xl mx-auto px-4 sm:px-6 lg:px-8">
                <div class="flex justify-between items-center h-16">
                    <div class="flex items-center gap-6">
                        <h1 class="text-xl font-semibold text-fg">"TaskDeck"</h1>
                        <Show when=move || auth.get().is_authenticated>
                            <nav class="flex space-x-4">
                                <a href="/" class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium">
                                    "Todos"
                                </a>
                                <a href="/chat" class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium">
                                    "Chat"
                                </a>
                                <a href="/settings/sessions" class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium">
                                    "Devices"
                                </a>
                            </nav>
                        </Show>
                    </div>
                    <Show when=move || auth.get().is_authenticated>
                        <div class="flex items-center gap-4">
                            <span
                                class="text-xs font-mono text-fg-muted"
                                title="Time until automatic sign-out"
                            >
                                {countdown_label}
                            </span>
                            <span class="text-sm text-fg-muted">
                                {move || {
                                    auth.get().user.map(|user| user.name).unwrap_or_default()
                                }}
                            </span>
                            <button
                                on:click=on_logout
                                class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium"
                            >
                                "Sign out"
                            </button>
                        </div>
                    </Show>
                </div>
            </div>
        </header>
    }
}

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-surface">
            <Header/>
            <NotificationList/>
            <main class="max-w-5xl mx-auto py-6 sm:px-6 lg:px-8">
                <SessionWarningBanner/>
                {children()}
            </main>
        </div>
    }
}

#[component]
pub fn LoadingSpinner() -> impl IntoView {
    view! {
        <div class="flex justify-center items-center p-8">
            <div class="animate-spin rounded-full h-8 w-8 border-b-2 border-action-primary-bg"></div>
        </div>
    }
}

#[component]
pub fn ErrorMessage(message: String) -> impl IntoView {
    view! {
        <div class="bg-status-error-bg border border-status-error-border text-status-error-text px-4 py-3 rounded mb-4">
            <p class="text-sm">{message}</p>
        </div>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::state::notifications::provide_notifications;
    use crate::test_support::helpers::{provide_anonymous, provide_authenticated};
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn header_shows_nav_and_user_when_signed_in() {
        let html = render_to_string(move || {
            provide_notifications();
            provide_authenticated();
            view! { <Header /> }
        });
        assert!(html.contains("TaskDeck"));
        assert!(html.contains("Devices"));
        assert!(html.contains("Alice"));
        assert!(html.contains("Sign out"));
    }

    #[test]
    fn header_hides_nav_when_anonymous() {
        let html = render_to_string(move || {
            provide_notifications();
            provide_anonymous();
            view! { <Header /> }
        });
        assert!(html.contains("TaskDeck"));
        assert!(!html.contains("Devices"));
    }

    #[test]
    fn layout_renders_children() {
        let html = render_to_string(move || {
            provide_notifications();
            provide_authenticated();
            view! { <Layout><div>"page-body"</div></Layout> }
        });
        assert!(html.contains("page-body"));
    }

    #[test]
    fn feedback_components_render_their_messages() {
        let html = render_to_string(move || {
            view! {
                <div>
                    <LoadingSpinner />
                    <ErrorMessage message="boom".into() />
                </div>
            }
        });
        assert!(html.contains("animate-spin"));
        assert!(html.contains("boom"));
    }
}
