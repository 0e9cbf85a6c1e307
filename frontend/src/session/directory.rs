use leptos::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::api::{ActiveSessionRecord, ApiError};
use crate::state::notifications::Notifications;

pub const DIRECTORY_POLL_INTERVAL_MS: u32 = 30_000;

/// The slice of the API the directory needs. Kept narrow so tests can drive
/// the directory with an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait SessionsApi {
    async fn list(&self) -> Result<Vec<ActiveSessionRecord>, ApiError>;
    async fn revoke(&self, session_id: &str) -> Result<(), ApiError>;
    async fn revoke_others(&self) -> Result<(), ApiError>;
}

/// Reactive view of the account's active sessions. Revocations apply
/// optimistically: the list updates immediately, then either the server's
/// authoritative list replaces it or the exact pre-mutation snapshot is
/// restored on failure.
pub struct SessionDirectory<A: SessionsApi + Clone + 'static> {
    api: A,
    current_token: Rc<dyn Fn() -> Option<String>>,
    sessions: RwSignal<Vec<ActiveSessionRecord>>,
    loading: RwSignal<bool>,
    mutation_in_flight: Rc<Cell<bool>>,
    refresh_deferred: Rc<Cell<bool>>,
    notifications: Notifications,
    revoke_hint: Rc<RefCell<Option<Rc<dyn Fn(&str)>>>>,
}

impl<A: SessionsApi + Clone + 'static> Clone for SessionDirectory<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            current_token: Rc::clone(&self.current_token),
            sessions: self.sessions,
            loading: self.loading,
            mutation_in_flight: Rc::clone(&self.mutation_in_flight),
            refresh_deferred: Rc::clone(&self.refresh_deferred),
            notifications: self.notifications,
            revoke_hint: Rc::clone(&self.revoke_hint),
        }
    }
}

impl<A: SessionsApi + Clone + 'static> SessionDirectory<A> {
    pub fn new(
        api: A,
        current_token: Rc<dyn Fn() -> Option<String>>,
        notifications: Notifications,
    ) -> Self {
        Self {
            api,
            current_token,
            sessions: create_rw_signal(Vec::new()),
            loading: create_rw_signal(false),
            mutation_in_flight: Rc::new(Cell::new(false)),
            refresh_deferred: Rc::new(Cell::new(false)),
            notifications,
            revoke_hint: Rc::new(RefCell::new(None)),
        }
    }

    pub fn sessions(&self) -> RwSignal<Vec<ActiveSessionRecord>> {
        self.sessions
    }

    pub fn loading(&self) -> RwSignal<bool> {
        self.loading
    }

    /// Called after a successful revocation so the push channel can nudge the
    /// revoked device.
    pub fn set_revoke_hint(&self, hook: Rc<dyn Fn(&str)>) {
        *self.revoke_hint.borrow_mut() = Some(hook);
    }

    /// This device's session id, once the directory has been fetched at least
    /// once. `None` until then; targeted force-logout notifications simply
    /// will not match an unknown id.
    pub fn current_session_id(&self) -> Option<String> {
        let token = (self.current_token)()?;
        self.sessions.with_untracked(|list| {
            list.iter()
                .find(|record| record.is_current(&token))
                .map(|record| record.id.clone())
        })
    }

    /// Server-side change signal (push message or poll tick). Returns true
    /// when the caller should refetch now; during a mutation the refresh is
    /// deferred instead, and any number of deferrals coalesce into one.
    pub fn note_remote_change(&self) -> bool {
        if self.mutation_in_flight.get() {
            self.refresh_deferred.set(true);
            return false;
        }
        true
    }

    pub async fn refresh(&self) {
        if self.mutation_in_flight.get() {
            self.refresh_deferred.set(true);
            return;
        }
        self.fetch().await;
    }

    pub async fn logout_device(&self, session_id: &str) {
        let id = session_id.to_string();
        let committed = self
            .revoke_optimistically(
                |list| list.retain(|record| record.id != id),
                |api| {
                    let id = id.clone();
                    async move { api.revoke(&id).await }
                },
                "Could not sign out that device. Please try again.",
            )
            .await;
        if committed {
            let hint = self.revoke_hint.borrow().as_ref().cloned();
            if let Some(hint) = hint {
                hint(session_id);
            }
        }
    }

    pub async fn logout_all_other_devices(&self) {
        let token = (self.current_token)();
        self.revoke_optimistically(
            |list| {
                list.retain(|record| {
                    token
                        .as_deref()
                        .map_or(false, |token| record.is_current(token))
                })
            },
            |api| async move { api.revoke_others().await },
            "Could not sign out other devices. Please try again.",
        )
        .await;
    }

    /// Shared protocol for every directory mutation: snapshot, speculative
    /// apply, then commit (authoritative refetch) or rollback (exact
    /// snapshot restore plus a user-facing notice). Returns whether the
    /// mutation committed.
    async fn revoke_optimistically<F, Fut>(
        &self,
        apply: impl FnOnce(&mut Vec<ActiveSessionRecord>),
        call: F,
        failure_notice: &'static str,
    ) -> bool
    where
        F: FnOnce(A) -> Fut,
        Fut: std::future::Future<Output = Result<(), ApiError>>,
    {
        if self.mutation_in_flight.replace(true) {
            log::debug!("revocation already in flight; ignoring");
            return false;
        }

        let snapshot = self.sessions.get_untracked();
        self.sessions.update(apply);

        let committed = match call(self.api.clone()).await {
            Ok(()) => {
                // The server's list is authoritative over the optimistic guess.
                self.fetch().await;
                true
            }
            Err(error) => {
                log::warn!("session revocation failed: {}", error);
                self.sessions.set(snapshot);
                self.notifications.error(failure_notice);
                false
            }
        };

        self.finish_mutation().await;
        committed
    }

    async fn finish_mutation(&self) {
        self.mutation_in_flight.set(false);
        if self.refresh_deferred.replace(false) {
            self.fetch().await;
        }
    }

    async fn fetch(&self) {
        self.loading.set(true);
        match self.api.list().await {
            Ok(sessions) => self.sessions.set(sessions),
            // Stale data stays visible; the next poll or push retries.
            Err(error) => log::warn!("session directory refresh failed: {}", error),
        }
        self.loading.set(false);
    }
}
