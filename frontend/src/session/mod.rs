//! Session lifecycle coordination: the local inactivity countdown, activity
//! reporting, cross-tab and cross-device synchronization, the active-session
//! directory, and the single logout funnel they all feed into.

pub mod activity;
pub mod broadcast;
pub mod directory;
pub mod expiry;
pub mod push;
pub mod timer;

use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::api::ApiClient;
use crate::state::auth::{use_auth, AuthStore};
use crate::state::notifications::{use_notifications, Notifications};
use crate::utils::nav::{BrowserNavigator, Navigate};
use crate::utils::time;

use broadcast::{BroadcastBus, StorageBus};
use directory::SessionDirectory;
use expiry::{ExpiryReactor, LogoutEffects, LogoutReason};
use push::{ForceLogoutReason, PushTransport, WebSocketTransport};
use timer::SessionCountdown;

/// Logout side effects wired to the real app: API, credential store, tab
/// broadcast, push channel, toasts, and the browser location.
pub struct AppLogoutEffects {
    auth: AuthStore,
    transport: WebSocketTransport,
    notifications: Notifications,
    nav: BrowserNavigator,
}

impl LogoutEffects for AppLogoutEffects {
    fn server_logout(&self) {
        // The credential clear runs before the spawned future is ever
        // polled, so the token has to be captured here.
        let Some(token) = self.auth.access_token() else {
            return;
        };
        // Fire and forget: a server failure must not block the local logout.
        #[cfg(target_arch = "wasm32")]
        {
            let api = self.auth.api().clone();
            spawn_local(async move {
                if let Err(error) = api.logout_with_token(token).await {
                    log::warn!("server-side logout failed: {}", error);
                }
            });
        }
        #[cfg(not(target_arch = "wasm32"))]
        let _ = token;
    }

    fn clear_credentials(&self) {
        self.auth.clear_local();
    }

    fn announce_logout(&self) {
        self.auth.announce_logout();
    }

    fn teardown_push(&self) {
        self.transport.close();
    }

    fn notify(&self, reason: LogoutReason) {
        self.notifications.info(reason.user_message());
    }

    fn navigate_to_login(&self, reason: LogoutReason) {
        self.nav.navigate(&reason.login_path());
    }
}

/// How a server-side forced logout maps onto the local reason vocabulary.
pub fn logout_reason_for(reason: ForceLogoutReason) -> LogoutReason {
    match reason {
        ForceLogoutReason::UserInitiated => LogoutReason::UserInitiated,
        ForceLogoutReason::RemoteLogout => LogoutReason::AnotherDevice,
        ForceLogoutReason::SessionExpired => LogoutReason::SessionExpired,
        ForceLogoutReason::Security => LogoutReason::Security,
    }
}

/// Context handle the UI reads: the countdown signals, the session directory,
/// and the logout entry point.
#[derive(Clone)]
pub struct SessionHandle {
    remaining_ms: RwSignal<u64>,
    warning_active: RwSignal<bool>,
    reactor: Rc<ExpiryReactor<AppLogoutEffects>>,
    directory: SessionDirectory<ApiClient>,
    countdown: Rc<RefCell<Option<SessionCountdown>>>,
    auth: AuthStore,
}

impl SessionHandle {
    pub fn remaining_ms(&self) -> RwSignal<u64> {
        self.remaining_ms
    }

    pub fn warning_active(&self) -> RwSignal<bool> {
        self.warning_active
    }

    pub fn directory(&self) -> &SessionDirectory<ApiClient> {
        &self.directory
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    /// User-initiated logout (header button). Goes through the same latched
    /// funnel as every other logout trigger.
    pub fn logout(&self) {
        self.reactor.trigger(LogoutReason::UserInitiated);
    }

    /// "Stay signed in" on the warning banner: reset the countdown and let
    /// the server know this session is alive.
    pub fn stay_signed_in(&self) {
        let now = time::now_ms();
        {
            let mut slot = self.countdown.borrow_mut();
            if let Some(countdown) = slot.as_mut() {
                if countdown.record_activity(now) {
                    self.remaining_ms.set(countdown.remaining_ms(now));
                    self.warning_active.set(false);
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let api = self.auth.api().clone();
            spawn_local(async move {
                if let Err(error) = api.get_me().await {
                    if !error.is_session_expired() {
                        log::warn!("session extension ping failed: {}", error);
                    }
                }
            });
        }
    }
}

pub fn use_session() -> Option<SessionHandle> {
    use_context::<SessionHandle>()
}

#[component]
pub fn SessionProvider(children: Children) -> impl IntoView {
    let auth = use_auth();
    let notifications = use_notifications();

    let tab_id = uuid::Uuid::new_v4().to_string();
    let transport = WebSocketTransport::new();
    let bus: Rc<dyn BroadcastBus> = Rc::new(StorageBus::new());
    auth.attach_broadcast(Rc::clone(&bus), tab_id.clone());

    let directory = {
        let token_source = auth.clone();
        SessionDirectory::new(
            auth.api().clone(),
            Rc::new(move || token_source.access_token()),
            notifications,
        )
    };
    {
        let transport = transport.clone();
        directory.set_revoke_hint(Rc::new(move |session_id| {
            transport.send_revoke_hint(session_id)
        }));
    }

    let reactor = Rc::new(ExpiryReactor::new(AppLogoutEffects {
        auth: auth.clone(),
        transport: transport.clone(),
        notifications,
        nav: BrowserNavigator,
    }));

    let handle = SessionHandle {
        remaining_ms: create_rw_signal(0),
        warning_active: create_rw_signal(false),
        reactor,
        directory,
        countdown: Rc::new(RefCell::new(None)),
        auth: auth.clone(),
    };

    #[cfg(target_arch = "wasm32")]
    browser::wire(
        handle.clone(),
        auth,
        transport,
        bus,
        tab_id,
        notifications,
    );

    provide_context(handle);
    view! { <>{children()}</> }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use crate::api::SESSION_EXPIRED_EVENT;
    use crate::config;
    use crate::session::activity::ActivityThrottle;
    use crate::session::broadcast::CrossTabSync;
    use crate::session::directory::DIRECTORY_POLL_INTERVAL_MS;
    use crate::session::push::{classify_push, PushAction, PushEvent, GRACE_WINDOW_MS};
    use crate::session::timer::{DEFAULT_WARNING_THRESHOLD_MS, TICK_INTERVAL_MS};
    use crate::utils::nav;
    use crate::utils::storage;
    use gloo_timers::callback::{Interval, Timeout};
    use std::cell::Cell;
    use wasm_bindgen::prelude::Closure;
    use wasm_bindgen::JsCast;

    /// Timers that live only while the user is signed in. Dropping them
    /// cancels the underlying browser intervals.
    struct Live {
        _tick: Interval,
        _poll: Interval,
    }

    pub(super) fn wire(
        handle: SessionHandle,
        auth: AuthStore,
        transport: WebSocketTransport,
        bus: Rc<dyn BroadcastBus>,
        tab_id: String,
        notifications: Notifications,
    ) {
        subscribe_cross_tab(&bus, tab_id, auth.clone());
        listen_for_expired_responses(Rc::clone(&handle.reactor));
        install_activity_listeners(handle.clone());

        let live: Rc<RefCell<Option<Live>>> = Rc::new(RefCell::new(None));
        let was_authenticated = Rc::new(Cell::new(false));
        let auth_signal = auth.signal();
        create_effect(move |_| {
            let authenticated = auth_signal.with(|s| s.is_authenticated);
            if authenticated == was_authenticated.replace(authenticated) {
                return;
            }
            if authenticated {
                start(
                    handle.clone(),
                    transport.clone(),
                    notifications,
                    Rc::clone(&live),
                );
            } else {
                stop(&handle, &transport, &live);
            }
        });
    }

    fn subscribe_cross_tab(bus: &Rc<dyn BroadcastBus>, tab_id: String, auth: AuthStore) {
        let sync = Rc::new(CrossTabSync::new(tab_id, auth, BrowserNavigator));
        bus.subscribe(Rc::new(move |event| {
            sync.handle(&event, time::now_ms(), &nav::current_path());
        }));
    }

    /// The API client raises an in-page event on any 401 carrying the
    /// expired code; funnel it into the reactor.
    fn listen_for_expired_responses(reactor: Rc<ExpiryReactor<AppLogoutEffects>>) {
        let Ok(window) = storage::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            reactor.trigger(LogoutReason::SessionExpired);
        });
        if window
            .add_event_listener_with_callback(SESSION_EXPIRED_EVENT, closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("could not attach session-expired listener");
        }
        closure.forget();
    }

    fn install_activity_listeners(handle: SessionHandle) {
        let Ok(window) = storage::window() else {
            return;
        };
        let throttle = Rc::new(RefCell::new(ActivityThrottle::with_defaults()));
        for event_name in ["pointerdown", "pointermove", "keydown", "click"] {
            let handle = handle.clone();
            let throttle = Rc::clone(&throttle);
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
                if handle.countdown.borrow().is_none() {
                    return;
                }
                let now = time::now_ms();
                let decision = throttle.borrow_mut().observe(now);
                if decision.reset_timer {
                    let mut slot = handle.countdown.borrow_mut();
                    if let Some(countdown) = slot.as_mut() {
                        if countdown.record_activity(now) {
                            handle.remaining_ms.set(countdown.remaining_ms(now));
                            handle.warning_active.set(false);
                        }
                    }
                }
                if decision.start_ping {
                    let api = handle.auth.api().clone();
                    let throttle = Rc::clone(&throttle);
                    spawn_local(async move {
                        // An expired 401 already raised the in-page event.
                        if let Err(error) = api.get_me().await {
                            if !error.is_session_expired() {
                                log::debug!("liveness ping failed: {}", error);
                            }
                        }
                        throttle.borrow_mut().ping_settled();
                    });
                }
            });
            if window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())
                .is_err()
            {
                log::warn!("could not attach {} activity listener", event_name);
            }
            closure.forget();
        }
    }

    fn start(
        handle: SessionHandle,
        transport: WebSocketTransport,
        notifications: Notifications,
        live: Rc<RefCell<Option<Live>>>,
    ) {
        handle.reactor.reset_after_login();

        // Timeout length comes from the server; fall back to the default.
        {
            let handle = handle.clone();
            spawn_local(async move {
                let timeout_ms = match handle.auth.api().get_session_config().await {
                    Ok(config) => config.session_timeout_ms,
                    Err(error) => {
                        log::warn!("session config fetch failed, using default: {}", error);
                        timer::DEFAULT_SESSION_TIMEOUT_MS
                    }
                };
                let now = time::now_ms();
                let countdown =
                    SessionCountdown::new(timeout_ms, DEFAULT_WARNING_THRESHOLD_MS, now);
                handle.remaining_ms.set(countdown.remaining_ms(now));
                handle.warning_active.set(false);
                *handle.countdown.borrow_mut() = Some(countdown);
                handle.directory.refresh().await;
            });
        }

        let tick = {
            let handle = handle.clone();
            Interval::new(TICK_INTERVAL_MS, move || {
                let now = time::now_ms();
                let ticked = handle
                    .countdown
                    .borrow_mut()
                    .as_mut()
                    .map(|countdown| (countdown.tick(now), countdown.warning_threshold_ms()));
                if let Some((tick, threshold)) = ticked {
                    handle.remaining_ms.set(tick.remaining_ms);
                    handle
                        .warning_active
                        .set(tick.remaining_ms > 0 && tick.remaining_ms <= threshold);
                    if tick.signal == Some(timer::CountdownSignal::Expired) {
                        handle.reactor.trigger(LogoutReason::SessionExpired);
                    }
                }
            })
        };

        let poll = {
            let handle = handle.clone();
            Interval::new(DIRECTORY_POLL_INTERVAL_MS, move || {
                refresh_directory(&handle);
            })
        };
        *live.borrow_mut() = Some(Live {
            _tick: tick,
            _poll: poll,
        });

        let pending_forced = Rc::new(Cell::new(false));
        spawn_local(async move {
            // No token means start() raced a logout; the next login edge
            // reconnects with the fresh credential.
            let Some(token) = handle.auth.access_token() else {
                return;
            };
            let base = config::await_api_base_url().await;
            let url = config::push_url_for(&base, &token);
            let handler_handle = handle.clone();
            transport.connect(
                &url,
                Rc::new(move |event| {
                    handle_push_event(
                        event,
                        &handler_handle,
                        notifications,
                        &pending_forced,
                    );
                }),
            );
        });
    }

    fn stop(
        handle: &SessionHandle,
        transport: &WebSocketTransport,
        live: &Rc<RefCell<Option<Live>>>,
    ) {
        live.borrow_mut().take();
        *handle.countdown.borrow_mut() = None;
        handle.remaining_ms.set(0);
        handle.warning_active.set(false);
        transport.close();
    }

    fn handle_push_event(
        event: PushEvent,
        handle: &SessionHandle,
        notifications: Notifications,
        pending_forced: &Rc<Cell<bool>>,
    ) {
        match event {
            PushEvent::Connected => {}
            // A gap in coverage may have swallowed updates; catch up.
            PushEvent::Reconnected => refresh_directory(handle),
            PushEvent::Disconnected => {
                log::debug!("push channel disconnected; reconnecting");
            }
            PushEvent::Message(push) => {
                let session_id = handle.directory.current_session_id();
                let token = handle.auth.access_token();
                match classify_push(push, session_id.as_deref(), token.as_deref()) {
                    PushAction::RefreshDirectory => refresh_directory(handle),
                    PushAction::ResetTimer(last_activity_at) => {
                        let mut slot = handle.countdown.borrow_mut();
                        if let Some(countdown) = slot.as_mut() {
                            if countdown.record_activity(last_activity_at) {
                                let now = time::now_ms();
                                handle.remaining_ms.set(countdown.remaining_ms(now));
                                handle.warning_active.set(false);
                            }
                        }
                    }
                    PushAction::BeginForcedLogout(notification) => {
                        if pending_forced.replace(true) || handle.reactor.is_latched() {
                            return;
                        }
                        let reason = logout_reason_for(notification.reason);
                        let message = notification
                            .message
                            .unwrap_or_else(|| reason.user_message().to_string());
                        notifications.warn(message);

                        // Grace window so the user sees why before the redirect.
                        let handle = handle.clone();
                        let pending = Rc::clone(pending_forced);
                        Timeout::new(GRACE_WINDOW_MS, move || {
                            pending.set(false);
                            handle.reactor.trigger(reason);
                        })
                        .forget();
                    }
                }
            }
        }
    }

    fn refresh_directory(handle: &SessionHandle) {
        if handle.directory.note_remote_change() {
            let directory = handle.directory.clone();
            spawn_local(async move { directory.refresh().await });
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Session handle wired to whatever auth/notification contexts the test
    /// provided, installed as context like the real provider does.
    pub fn provide_session_handle() -> SessionHandle {
        let auth = crate::state::auth::use_auth();
        let notifications = crate::state::notifications::use_notifications();
        let directory = {
            let token_source = auth.clone();
            SessionDirectory::new(
                auth.api().clone(),
                Rc::new(move || token_source.access_token()),
                notifications,
            )
        };
        let handle = SessionHandle {
            remaining_ms: create_rw_signal(0),
            warning_active: create_rw_signal(false),
            reactor: Rc::new(ExpiryReactor::new(AppLogoutEffects {
                auth: auth.clone(),
                transport: WebSocketTransport::new(),
                notifications,
                nav: BrowserNavigator,
            })),
            directory,
            countdown: Rc::new(RefCell::new(None)),
            auth,
        };
        provide_context(handle.clone());
        handle
    }
}
