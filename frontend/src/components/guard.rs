use crate::components::layout::LoadingSpinner;
use crate::state::auth::use_auth;
use crate::utils::nav::{BrowserNavigator, Navigate};
use leptos::*;

#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let auth = use_auth().signal();
    let is_authenticated = create_memo(move |_| auth.get().is_authenticated);
    let is_loading = create_memo(move |_| auth.get().loading);
    create_effect(move |_| {
        let state = auth.get();
        if !state.loading && !state.is_authenticated {
            BrowserNavigator.navigate("/login");
        }
    });
    view! {
        <Show
            when=move || should_render_protected(is_authenticated.get(), is_loading.get())
            fallback=move || {
                if is_loading.get() {
                    view! { <LoadingSpinner /> }.into_view()
                } else {
                    ().into_view()
                }
            }
        >
            {children()}
        </Show>
    }
}

/// Login and signup make no sense for a signed-in user; send them home.
#[component]
pub fn PublicOnly(children: ChildrenFn) -> impl IntoView {
    let auth = use_auth().signal();
    let is_authenticated = create_memo(move |_| auth.get().is_authenticated);
    let is_loading = create_memo(move |_| auth.get().loading);
    create_effect(move |_| {
        let state = auth.get();
        if !state.loading && state.is_authenticated {
            BrowserNavigator.navigate("/");
        }
    });
    view! {
        <Show when=move || should_render_public(is_authenticated.get(), is_loading.get())>
            {children()}
        </Show>
    }
}

fn should_render_protected(is_authenticated: bool, is_loading: bool) -> bool {
    is_authenticated && !is_loading
}

fn should_render_public(is_authenticated: bool, is_loading: bool) -> bool {
    !is_authenticated && !is_loading
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::{PublicOnly, RequireAuth};
    use crate::test_support::helpers::{provide_anonymous, provide_authenticated};
    use crate::test_support::ssr::render_to_string;
    use leptos::*;

    #[test]
    fn require_auth_renders_children_when_authenticated() {
        let html = render_to_string(move || {
            provide_authenticated();
            view! {
                <RequireAuth>
                    {|| view! { <div>"protected-content"</div> }}
                </RequireAuth>
            }
        });
        assert!(html.contains("protected-content"));
    }

    #[test]
    fn require_auth_hides_children_when_anonymous() {
        let html = render_to_string(move || {
            provide_anonymous();
            view! {
                <RequireAuth>
                    {|| view! { <div>"protected-content"</div> }}
                </RequireAuth>
            }
        });
        assert!(!html.contains("protected-content"));
    }

    #[test]
    fn require_auth_shows_spinner_while_loading() {
        let html = render_to_string(move || {
            let store = provide_anonymous();
            store.signal().update(|state| state.loading = true);
            view! {
                <RequireAuth>
                    {|| view! { <div>"protected-content"</div> }}
                </RequireAuth>
            }
        });
        assert!(html.contains("animate-spin"));
        assert!(!html.contains("protected-content"));
    }

    #[test]
    fn public_only_hides_children_from_signed_in_users() {
        let html = render_to_string(move || {
            provide_authenticated();
            view! {
                <PublicOnly>
                    {|| view! { <div>"login-form"</div> }}
                </PublicOnly>
            }
        });
        assert!(!html.contains("login-form"));
    }

    #[test]
    fn public_only_renders_children_for_anonymous_users() {
        let html = render_to_string(move || {
            provide_anonymous();
            view! {
                <PublicOnly>
                    {|| view! { <div>"login-form"</div> }}
                </PublicOnly>
            }
        });
        assert!(html.contains("login-form"));
    }
}
