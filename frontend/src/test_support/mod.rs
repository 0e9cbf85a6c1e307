#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod ssr;

#[cfg(test)]
pub mod helpers {
    use crate::api::{ApiClient, UserProfile};
    use crate::state::auth::AuthStore;
    use crate::state::credentials::memory::MemoryCredentialStore;
    use crate::state::credentials::{CredentialSnapshot, CredentialStore};
    use leptos::*;
    use std::rc::Rc;

    pub fn sample_user() -> UserProfile {
        UserProfile {
            id: "u1".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
        }
    }

    /// Auth store context backed by in-memory credentials, already signed in.
    pub fn provide_authenticated() -> AuthStore {
        let credentials = Rc::new(MemoryCredentialStore::new());
        credentials.save(&CredentialSnapshot {
            user: sample_user(),
            access_token: "tok-1".into(),
        });
        let store = AuthStore::new(ApiClient::new(), credentials);
        provide_context(store.clone());
        store
    }

    pub fn provide_anonymous() -> AuthStore {
        let store = AuthStore::new(ApiClient::new(), Rc::new(MemoryCredentialStore::new()));
        provide_context(store.clone());
        store
    }
}
