use crate::session::use_session;
use crate::utils::time::format_countdown;
use leptos::*;

/// Banner shown once the inactivity countdown drops below the warning
/// threshold. Any interaction elsewhere on the page also clears it, since
/// activity resets the countdown.
#[component]
pub fn SessionWarningBanner() -> impl IntoView {
    let session = store_value(use_session());

    let warning_active = move || {
        session.with_value(|session| {
            session
                .as_ref()
                .map(|session| session.warning_active().get())
                .unwrap_or(false)
        })
    };
    let remaining = move || {
        session.with_value(|session| {
            session
                .as_ref()
                .map(|session| format_countdown(session.remaining_ms().get()))
                .unwrap_or_default()
        })
    };
    let on_stay = move |_| {
        session.with_value(|session| {
            if let Some(session) = session {
                session.stay_signed_in();
            }
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
        <Show when=warning_active>
            <div class="mb-4 bg-status-warning-bg border border-status-warning-border text-status-warning-text px-4 py-3 rounded">
                <div class="flex flex-col gap-3 lg:flex-row lg:items-center lg:justify-between">
                    <div>
                        <p class="font-semibold">"Are you still there?"</p>
                        <p class="text-sm mt-1">
                            "You will be signed out in " {remaining} " due to inactivity."
                        </p>
                    </div>
                    <div class="flex gap-2">
                        <button
                            class="px-4 py-2 border border-status-warning-border text-sm font-medium rounded"
                            on:click=on_stay
                        >
                            "Stay signed in"
                        </button>
                        <button
                            class="px-4 py-2 text-sm font-medium rounded opacity-70 hover:opacity-100"
                            on:click=on_logout
                        >
                            "Sign out now"
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
