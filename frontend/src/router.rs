use leptos::*;
use leptos_router::*;

use crate::{
    components::guard::{PublicOnly, RequireAuth},
    pages::{
        chat::ChatPage, home::HomePage, login::LoginPage, sessions::SessionsPage,
        signup::SignupPage,
    },
    session::SessionProvider,
    state::auth::AuthProvider,
};

pub const ROUTE_PATHS: &[&str] = &["/", "/login", "/signup", "/settings/sessions", "/chat"];

pub const PROTECTED_ROUTE_PATHS: &[&str] = &["/", "/settings/sessions", "/chat"];

pub const PUBLIC_ONLY_ROUTE_PATHS: &[&str] = &["/login", "/signup"];

/// Cross-tab logout only redirects tabs sitting on one of these.
pub fn is_protected_path(path: &str) -> bool {
    PROTECTED_ROUTE_PATHS.contains(&path)
}

/// Cross-tab login redirects tabs parked on login/signup to the app.
pub fn is_public_only_path(path: &str) -> bool {
    PUBLIC_ONLY_ROUTE_PATHS.contains(&path)
}

#[cfg(target_arch = "wasm32")]
pub fn mount_app() {
    mount_to_body(app_root);
}

pub fn app_root() -> impl IntoView {
    provide_context(crate::api::ApiClient::new());
    crate::state::notifications::provide_notifications();
    view! {
        <AuthProvider>
            <SessionProvider>
                <Router>
                    <Routes>
                        <Route path="/" view=ProtectedHome/>
                        <Route path="/login" view=PublicLogin/>
                        <Route path="/signup" view=PublicSignup/>
                        <Route path="/settings/sessions" view=ProtectedSessions/>
                        <Route path="/chat" view=ProtectedChat/>
                    </Routes>
                </Router>
            </SessionProvider>
        </AuthProvider>
    }
}

#[component]
fn ProtectedHome() -> impl IntoView {
    view! { <RequireAuth><HomePage/></RequireAuth> }
}

#[component]
fn ProtectedSessions() -> impl IntoView {
    view! { <RequireAuth><SessionsPage/></RequireAuth> }
}

#[component]
fn ProtectedChat() -> impl IntoView {
    view! { <RequireAuth><ChatPage/></RequireAuth> }
}

#[component]
fn PublicLogin() -> impl IntoView {
    view! { <PublicOnly><LoginPage/></PublicOnly> }
}

#[component]
fn PublicSignup() -> impl IntoView {
    view! { <PublicOnly><SignupPage/></PublicOnly> }
}
