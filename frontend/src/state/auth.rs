use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::api::{ApiClient, ApiError, AuthPayload, LoginRequest, SignupRequest, UserProfile};
use crate::session::broadcast::{BroadcastBus, BroadcastKind, TabBroadcast};
use crate::state::credentials::{BrowserCredentialStore, CredentialSnapshot, CredentialStore};
use crate::utils::time;

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    pub is_authenticated: bool,
    pub loading: bool,
}

struct BroadcastHook {
    bus: Rc<dyn BroadcastBus>,
    tab_id: String,
}

/// Process-wide (per tab) owner of the credential. Constructed fresh per
/// test; the running app provides one instance via context.
#[derive(Clone)]
pub struct AuthStore {
    state: RwSignal<AuthState>,
    credentials: Rc<dyn CredentialStore>,
    api: ApiClient,
    broadcast: Rc<RefCell<Option<BroadcastHook>>>,
}

impl AuthStore {
    pub fn new(api: ApiClient, credentials: Rc<dyn CredentialStore>) -> Self {
        let store = Self {
            state: create_rw_signal(AuthState::default()),
            credentials,
            api,
            broadcast: Rc::new(RefCell::new(None)),
        };
        // Same-tab reload: restore whatever snapshot survived. A malformed
        // snapshot loads as None and we stay anonymous.
        if let Some(snapshot) = store.credentials.load() {
            store.install(snapshot);
        }
        store
    }

    pub fn signal(&self) -> RwSignal<AuthState> {
        self.state
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with_untracked(|s| s.is_authenticated)
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.with_untracked(|s| s.access_token.clone())
    }

    /// Wired once at startup; login/logout transitions are announced to
    /// sibling tabs through this bus.
    pub fn attach_broadcast(&self, bus: Rc<dyn BroadcastBus>, tab_id: String) {
        *self.broadcast.borrow_mut() = Some(BroadcastHook { bus, tab_id });
    }

    pub async fn login(&self, request: LoginRequest) -> Result<(), ApiError> {
        self.set_loading(true);
        match self.api.login(&request).await {
            Ok(payload) => {
                self.apply_login(payload);
                Ok(())
            }
            Err(error) => {
                self.set_loading(false);
                Err(error)
            }
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<(), ApiError> {
        self.set_loading(true);
        match self.api.signup(&request).await {
            Ok(payload) => {
                self.apply_login(payload);
                Ok(())
            }
            Err(error) => {
                self.set_loading(false);
                Err(error)
            }
        }
    }

    /// Successful local login/signup: persist the snapshot, swap the token,
    /// and tell sibling tabs.
    pub fn apply_login(&self, payload: AuthPayload) {
        let snapshot = CredentialSnapshot {
            user: payload.user,
            access_token: payload.access_token,
        };
        self.credentials.save(&snapshot);
        self.install(snapshot);
        self.announce(BroadcastKind::Login);
    }

    /// Adopt a login that happened in another tab by reading the snapshot
    /// that tab already persisted. No re-broadcast, no network call.
    pub fn adopt_persisted(&self) -> bool {
        match self.credentials.load() {
            Some(snapshot) => {
                self.install(snapshot);
                true
            }
            None => false,
        }
    }

    /// Drop local credential state without touching the network. Used by the
    /// logout path and by cross-tab logout application.
    pub fn clear_local(&self) {
        self.credentials.clear();
        self.api.set_access_token(None);
        self.state.set(AuthState::default());
    }

    /// The one place a tab-initiated logout is announced to sibling tabs.
    pub fn announce_logout(&self) {
        self.announce(BroadcastKind::Logout);
    }

    /// Mount-time revalidation answer. Dropped when a logout landed while
    /// the request was in flight; a signed-out state must not carry a user.
    pub fn apply_revalidated_user(&self, user: UserProfile) {
        self.state.update(|s| {
            if s.is_authenticated {
                s.user = Some(user);
            }
        });
    }

    fn install(&self, snapshot: CredentialSnapshot) {
        self.api.set_access_token(Some(snapshot.access_token.clone()));
        self.state.set(AuthState {
            user: Some(snapshot.user),
            access_token: Some(snapshot.access_token),
            is_authenticated: true,
            loading: false,
        });
    }

    fn set_loading(&self, loading: bool) {
        self.state.update(|s| s.loading = loading);
    }

    fn announce(&self, kind: BroadcastKind) {
        if let Some(hook) = self.broadcast.borrow().as_ref() {
            hook.bus
                .publish(&TabBroadcast::new(kind, hook.tab_id.clone(), time::now_ms()));
        }
    }
}

#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let api = use_context::<ApiClient>().unwrap_or_else(ApiClient::new);
    let store = AuthStore::new(api, Rc::new(BrowserCredentialStore));

    // Revalidate a restored session against the server. A 401 with the
    // session-expired code funnels into the expiry reactor via the
    // in-page signal; other failures keep the restored state.
    #[cfg(target_arch = "wasm32")]
    if store.is_authenticated() {
        let revalidate = store.clone();
        spawn_local(async move {
            match revalidate.api().get_me().await {
                Ok(user) => revalidate.apply_revalidated_user(user),
                Err(e) if e.is_session_expired() => {}
                Err(e) => log::warn!("session revalidation failed: {}", e),
            }
        });
    }

    provide_context(store);
    view! { <>{children()}</> }
}

pub fn use_auth() -> AuthStore {
    use_context::<AuthStore>()
        .unwrap_or_else(|| AuthStore::new(ApiClient::new(), Rc::new(BrowserCredentialStore)))
}

pub fn use_login_action() -> Action<LoginRequest, Result<(), ApiError>> {
    let store = use_auth();
    create_action(move |request: &LoginRequest| {
        let payload = request.clone();
        let store = store.clone();
        async move { store.login(payload).await }
    })
}

pub fn use_signup_action() -> Action<SignupRequest, Result<(), ApiError>> {
    let store = use_auth();
    create_action(move |request: &SignupRequest| {
        let payload = request.clone();
        let store = store.clone();
        async move { store.signup(payload).await }
    })
}
