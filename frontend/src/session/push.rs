use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Delay between a forced-logout notification arriving and the logout being
/// applied, so the user sees the reason before the redirect.
pub const GRACE_WINDOW_MS: u32 = 3_000;

pub const BACKOFF_BASE_MS: u64 = 1_000;
pub const BACKOFF_CAP_MS: u64 = 30_000;
pub const BACKOFF_MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForceLogoutReason {
    UserInitiated,
    RemoteLogout,
    SessionExpired,
    Security,
}

impl ForceLogoutReason {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UserInitiated => "You signed out.",
            Self::RemoteLogout => "You were signed out from another device.",
            Self::SessionExpired => "Your session expired. Please sign in again.",
            Self::Security => "You were signed out for security reasons.",
        }
    }
}

/// Server-initiated logout order. Targeting is resolved locally: an exact
/// session id match, an inverse token match, or (with neither field) every
/// session of the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceLogoutNotification {
    pub reason: ForceLogoutReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_session_token: Option<String>,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn applies_to(
    notification: &ForceLogoutNotification,
    session_id: Option<&str>,
    access_token: Option<&str>,
) -> bool {
    if let Some(target) = notification.target_session_id.as_deref() {
        return session_id == Some(target);
    }
    if let Some(excluded) = notification.exclude_session_token.as_deref() {
        return access_token != Some(excluded);
    }
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerPush {
    ForceLogout(ForceLogoutNotification),
    /// Something about the user's session set changed; refetch the directory.
    SessionUpdate { timestamp: u64 },
    /// The server extended this session after seeing activity elsewhere.
    SessionRefreshed {
        #[serde(rename = "lastActivityAt")]
        last_activity_at: u64,
    },
}

/// What the coordinator should do with an incoming push.
#[derive(Debug, Clone, PartialEq)]
pub enum PushAction {
    BeginForcedLogout(ForceLogoutNotification),
    RefreshDirectory,
    ResetTimer(u64),
}

pub fn classify_push(
    push: ServerPush,
    session_id: Option<&str>,
    access_token: Option<&str>,
) -> PushAction {
    match push {
        ServerPush::ForceLogout(notification) => {
            if applies_to(&notification, session_id, access_token) {
                PushAction::BeginForcedLogout(notification)
            } else {
                // Aimed at a sibling session; our directory view is stale now.
                PushAction::RefreshDirectory
            }
        }
        ServerPush::SessionUpdate { .. } => PushAction::RefreshDirectory,
        ServerPush::SessionRefreshed { last_activity_at } => {
            PushAction::ResetTimer(last_activity_at)
        }
    }
}

/// Bounded exponential backoff for the push channel. Doubles from the base,
/// caps the delay, and gives up entirely after a fixed attempt count.
#[derive(Debug, Clone)]
pub struct Backoff {
    attempt: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Backoff {
    pub fn new() -> Self {
        Self { attempt: 0 }
    }

    pub fn next_delay_ms(&mut self) -> Option<u64> {
        if self.attempt >= BACKOFF_MAX_ATTEMPTS {
            return None;
        }
        let delay = BACKOFF_BASE_MS
            .saturating_mul(1u64 << self.attempt.min(63))
            .min(BACKOFF_CAP_MS);
        self.attempt += 1;
        Some(delay)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Connected,
    Reconnected,
    Disconnected,
    Message(ServerPush),
}

/// Transport seam so the coordinator can be driven by a fake in tests.
pub trait PushTransport {
    fn connect(&self, url: &str, handler: Rc<dyn Fn(PushEvent)>);
    fn close(&self);
    /// Best-effort nudge so other devices refresh promptly after a local
    /// revocation. Loss is fine; polling catches up.
    fn send_revoke_hint(&self, session_id: &str);
}

/// Browser WebSocket transport with automatic reconnection.
#[derive(Clone, Default)]
pub struct WebSocketTransport {
    socket: Rc<RefCell<Option<web_sys::WebSocket>>>,
    closed: Rc<Cell<bool>>,
    backoff: Rc<RefCell<Backoff>>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn open(&self, url: String, handler: Rc<dyn Fn(PushEvent)>, reconnecting: bool) {
        use wasm_bindgen::prelude::Closure;
        use wasm_bindgen::JsCast;

        let Ok(socket) = web_sys::WebSocket::new(&url) else {
            self.schedule_reconnect(url, handler);
            return;
        };

        {
            let handler = Rc::clone(&handler);
            let backoff = Rc::clone(&self.backoff);
            let onopen = Closure::<dyn FnMut()>::new(move || {
                backoff.borrow_mut().reset();
                handler(if reconnecting {
                    PushEvent::Reconnected
                } else {
                    PushEvent::Connected
                });
            });
            socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
            onopen.forget();
        }

        {
            let handler = Rc::clone(&handler);
            let onmessage = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
                move |event: web_sys::MessageEvent| {
                    let Some(raw) = event.data().as_string() else {
                        return;
                    };
                    match serde_json::from_str::<ServerPush>(&raw) {
                        Ok(push) => handler(PushEvent::Message(push)),
                        Err(e) => log::warn!("ignoring malformed push message: {}", e),
                    }
                },
            );
            socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
            onmessage.forget();
        }

        {
            let this = self.clone();
            let onclose = Closure::<dyn FnMut(web_sys::CloseEvent)>::new(
                move |_: web_sys::CloseEvent| {
                    if this.closed.get() {
                        return;
                    }
                    handler(PushEvent::Disconnected);
                    this.schedule_reconnect(url.clone(), Rc::clone(&handler));
                },
            );
            socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
            onclose.forget();
        }

        *self.socket.borrow_mut() = Some(socket);
    }

    fn schedule_reconnect(&self, url: String, handler: Rc<dyn Fn(PushEvent)>) {
        let Some(delay) = self.backoff.borrow_mut().next_delay_ms() else {
            log::warn!("push channel gave up after repeated reconnect failures");
            return;
        };
        let this = self.clone();
        gloo_timers::callback::Timeout::new(delay as u32, move || {
            if !this.closed.get() {
                this.open(url, handler, true);
            }
        })
        .forget();
    }
}

impl PushTransport for WebSocketTransport {
    fn connect(&self, url: &str, handler: Rc<dyn Fn(PushEvent)>) {
        self.closed.set(false);
        self.backoff.borrow_mut().reset();
        self.open(url.to_string(), handler, false);
    }

    fn close(&self) {
        self.closed.set(true);
        if let Some(socket) = self.socket.borrow_mut().take() {
            let _ = socket.close();
        }
    }

    fn send_revoke_hint(&self, session_id: &str) {
        if let Some(socket) = self.socket.borrow().as_ref() {
            if socket.send_with_str(&logout_device_payload(session_id)).is_err() {
                log::debug!("revoke hint not delivered; push channel not open");
            }
        }
    }
}

/// Outbound `logout-device` frame nudging the server to push the revocation
/// to the named session's device.
pub fn logout_device_payload(session_id: &str) -> String {
    serde_json::json!({"type": "logout-device", "sessionId": session_id}).to_string()
}
