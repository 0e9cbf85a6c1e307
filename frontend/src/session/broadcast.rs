use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

use crate::router;
use crate::session::expiry::LogoutReason;
use crate::state::auth::AuthStore;
use crate::utils::nav::Navigate;
use crate::utils::storage as storage_utils;

/// Shared per-origin slot used purely as a broadcast bus: write, let sibling
/// tabs observe the change, then delete. The deletion is not an event.
pub const BROADCAST_KEY: &str = "taskdeck.broadcast";

/// Events older than this lost a race somewhere; acting on them would apply
/// stale state.
pub const MAX_EVENT_AGE_MS: u64 = 5_000;

pub const SLOT_CLEANUP_DELAY_MS: u32 = 100;

#[cfg(target_arch = "wasm32")]
const APPLY_COOLDOWN_MS: u32 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastKind {
    Login,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabBroadcast {
    pub kind: BroadcastKind,
    pub origin_tab_id: String,
    pub timestamp_ms: u64,
}

impl TabBroadcast {
    pub fn new(kind: BroadcastKind, origin_tab_id: String, timestamp_ms: u64) -> Self {
        Self {
            kind,
            origin_tab_id,
            timestamp_ms,
        }
    }
}

/// Acceptance filter: a tab never applies its own events, and never applies
/// events past the staleness bound.
pub fn should_accept(event: &TabBroadcast, own_tab_id: &str, now_ms: u64) -> bool {
    if event.origin_tab_id == own_tab_id {
        return false;
    }
    now_ms.saturating_sub(event.timestamp_ms) <= MAX_EVENT_AGE_MS
}

/// Message-passing view of the storage slot, so tests can swap in an
/// in-memory bus.
pub trait BroadcastBus {
    fn publish(&self, event: &TabBroadcast);
    fn subscribe(&self, handler: Rc<dyn Fn(TabBroadcast)>);
}

/// localStorage-backed bus. Every failure path degrades to a no-op: if the
/// browser denies storage, the app keeps working without cross-tab sync.
#[derive(Clone, Default)]
pub struct StorageBus;

impl StorageBus {
    pub fn new() -> Self {
        Self
    }
}

impl BroadcastBus for StorageBus {
    fn publish(&self, event: &TabBroadcast) {
        let Ok(storage) = storage_utils::local_storage() else {
            return;
        };
        let Ok(raw) = serde_json::to_string(event) else {
            return;
        };
        if storage.set_item(BROADCAST_KEY, &raw).is_err() {
            log::warn!("cross-tab broadcast write failed");
            return;
        }
        gloo_timers::callback::Timeout::new(SLOT_CLEANUP_DELAY_MS, move || {
            if let Ok(storage) = storage_utils::local_storage() {
                let _ = storage.remove_item(BROADCAST_KEY);
            }
        })
        .forget();
    }

    fn subscribe(&self, handler: Rc<dyn Fn(TabBroadcast)>) {
        use wasm_bindgen::prelude::*;
        use wasm_bindgen::JsCast;

        let Ok(window) = storage_utils::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(
            move |event: web_sys::StorageEvent| {
                if event.key().as_deref() != Some(BROADCAST_KEY) {
                    return;
                }
                // A missing new value is the author cleaning up the slot.
                let Some(raw) = event.new_value() else {
                    return;
                };
                match serde_json::from_str::<TabBroadcast>(&raw) {
                    Ok(parsed) => handler(parsed),
                    Err(e) => log::warn!("ignoring malformed tab broadcast: {}", e),
                }
            },
        );
        if window
            .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("storage events unavailable; cross-tab sync disabled");
        }
        closure.forget();
    }
}

/// Applies accepted broadcasts to this tab's auth state.
pub struct CrossTabSync<N: Navigate> {
    tab_id: String,
    auth: AuthStore,
    nav: N,
    applying: Rc<Cell<bool>>,
}

impl<N: Navigate> CrossTabSync<N> {
    pub fn new(tab_id: String, auth: AuthStore, nav: N) -> Self {
        Self {
            tab_id,
            auth,
            nav,
            applying: Rc::new(Cell::new(false)),
        }
    }

    /// Returns true when the event was applied. Events are dropped while a
    /// previous one is still being applied; the flag clears after a short
    /// cool-down.
    pub fn handle(&self, event: &TabBroadcast, now_ms: u64, current_path: &str) -> bool {
        if !should_accept(event, &self.tab_id, now_ms) {
            return false;
        }
        if self.applying.replace(true) {
            return false;
        }
        match event.kind {
            BroadcastKind::Logout => self.apply_remote_logout(current_path),
            BroadcastKind::Login => self.apply_remote_login(current_path),
        }
        self.schedule_cooldown();
        true
    }

    fn apply_remote_logout(&self, current_path: &str) {
        if self.auth.is_authenticated() {
            // The originating tab already made the network logout call.
            self.auth.clear_local();
        }
        if router::is_protected_path(current_path) {
            self.nav.navigate(&LogoutReason::AnotherTab.login_path());
        }
    }

    fn apply_remote_login(&self, current_path: &str) {
        if self.auth.is_authenticated() {
            return;
        }
        // Adopt from the durable snapshot the writer persisted, not from the
        // event payload.
        if self.auth.adopt_persisted() && router::is_public_only_path(current_path) {
            self.nav.navigate("/");
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn schedule_cooldown(&self) {
        let applying = Rc::clone(&self.applying);
        gloo_timers::callback::Timeout::new(APPLY_COOLDOWN_MS, move || {
            applying.set(false);
        })
        .forget();
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn schedule_cooldown(&self) {}

    pub fn finish_apply(&self) {
        self.applying.set(false);
    }
}

#[cfg(test)]
pub mod memory {
    use super::{BroadcastBus, TabBroadcast};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Delivers every published event to every subscriber, including the
    /// publisher's own tab; the self-origin filter is expected to cope.
    #[derive(Clone, Default)]
    pub struct MemoryBus {
        handlers: Rc<RefCell<Vec<Rc<dyn Fn(TabBroadcast)>>>>,
    }

    impl MemoryBus {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl BroadcastBus for MemoryBus {
        fn publish(&self, event: &TabBroadcast) {
            let handlers = self.handlers.borrow().clone();
            for handler in handlers {
                handler(event.clone());
            }
        }

        fn subscribe(&self, handler: Rc<dyn Fn(TabBroadcast)>) {
            self.handlers.borrow_mut().push(handler);
        }
    }
}
