use std::cell::Cell;

/// Why this tab is being logged out. The reason travels to the login page as
/// a query parameter so the user sees an explanation after the redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    UserInitiated,
    SessionExpired,
    AnotherDevice,
    AnotherTab,
    Security,
}

impl LogoutReason {
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::UserInitiated => "user_initiated",
            Self::SessionExpired => "session_expired",
            Self::AnotherDevice => "logged_out_another_device",
            Self::AnotherTab => "logged_out_another_tab",
            Self::Security => "security",
        }
    }

    pub fn login_path(&self) -> String {
        format!("/login?reason={}", self.query_value())
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UserInitiated => "You signed out.",
            Self::SessionExpired => "Your session expired. Please sign in again.",
            Self::AnotherDevice => "You were signed out from another device.",
            Self::AnotherTab => "You were signed out in another tab.",
            Self::Security => "You were signed out for security reasons.",
        }
    }
}

/// Side effects a logout performs, in the order the reactor invokes them.
/// All methods are synchronous; `server_logout` is expected to fire and
/// forget its network call.
pub trait LogoutEffects {
    fn server_logout(&self);
    fn clear_credentials(&self);
    fn announce_logout(&self);
    fn teardown_push(&self);
    fn notify(&self, reason: LogoutReason);
    fn navigate_to_login(&self, reason: LogoutReason);
}

/// Funnel for every expiry-class trigger: local countdown hitting zero, a 401
/// with the expired code, a forced-logout push, a manual logout click. All of
/// them may fire in a burst; the latch guarantees the effect sequence runs
/// exactly once per authenticated session.
pub struct ExpiryReactor<E: LogoutEffects> {
    effects: E,
    latched: Cell<bool>,
}

impl<E: LogoutEffects> ExpiryReactor<E> {
    pub fn new(effects: E) -> Self {
        Self {
            effects,
            latched: Cell::new(false),
        }
    }

    /// Returns true when this call performed the logout.
    pub fn trigger(&self, reason: LogoutReason) -> bool {
        if self.latched.replace(true) {
            return false;
        }
        log::info!("logging out: {}", reason.query_value());
        self.effects.server_logout();
        self.effects.clear_credentials();
        self.effects.announce_logout();
        self.effects.teardown_push();
        self.effects.notify(reason);
        self.effects.navigate_to_login(reason);
        true
    }

    /// Only a successful login re-arms the reactor.
    pub fn reset_after_login(&self) {
        self.latched.set(false);
    }

    pub fn is_latched(&self) -> bool {
        self.latched.get()
    }
}
