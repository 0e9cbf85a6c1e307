use crate::api::ActiveSessionRecord;
use crate::components::layout::{Layout, LoadingSpinner};
use crate::session::use_session;
use crate::state::auth::use_auth;
use leptos::*;

pub fn device_label(record: &ActiveSessionRecord) -> String {
    format!(
        "{} on {} ({})",
        record.device_info.browser, record.device_info.os, record.device_info.device
    )
}

fn last_activity_label(record: &ActiveSessionRecord) -> String {
    record.last_activity.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[component]
pub fn SessionsPage() -> impl IntoView {
    let auth = use_auth().signal();
    let session = store_value(use_session());

    let rows = move || {
        session.with_value(|session| {
            session
                .as_ref()
                .map(|session| session.directory().sessions().get())
                .unwrap_or_default()
        })
    };
    let loading = move || {
        session.with_value(|session| {
            session
                .as_ref()
                .map(|session| session.directory().loading().get())
                .unwrap_or(false)
        })
    };
    let current_token = move || auth.get().access_token.unwrap_or_default();
    let has_other_devices = move || {
        let token = current_token();
        rows().iter().any(|record| !record.is_current(&token))
    };

    // First load; afterwards pushes and polling keep the list current.
    #[cfg(target_arch = "wasm32")]
    session.with_value(|session| {
        if let Some(session) = session {
            let directory = session.directory().clone();
            spawn_local(async move { directory.refresh().await });
        }
    });

    let on_logout_device = move |session_id: String| {
        session.with_value(|session| {
            if let Some(session) = session {
                let directory = session.directory().clone();
                spawn_local(async move { directory.logout_device(&session_id).await });
            }
        })
    };
    let on_logout_others = move |_| {
        session.with_value(|session| {
            if let Some(session) = session {
                let directory = session.directory().clone();
                spawn_local(async move { directory.logout_all_other_devices().await });
            }
        })
    };

    view! {
        <Layout>
            <div class="bg-surface-elevated rounded-lg shadow p-6">
                <div class="flex items-center justify-between mb-4">
                    <h2 class="text-lg font-semibold text-fg">"Active devices"</h2>
                    <Show when=has_other_devices>
                        <button
                            class="text-sm font-medium text-status-error-text hover:underline"
                            on:click=on_logout_others
                        >
                            "Sign out all other devices"
                        </button>
                    </Show>
                </div>
                <Show when=loading>
                    <LoadingSpinner/>
                </Show>
                <ul class="divide-y divide-border">
                    <For each=rows key=|record| record.id.clone() let:record>
                        {
                            let id = record.id.clone();
                            let is_current = create_memo({
                                let token_record = record.clone();
                                move |_| token_record.is_current(&current_token())
                            });
                            view! {
                                <li class="py-3 flex items-center justify-between">
                                    <div>
                                        <p class="text-sm font-medium text-fg">
                                            {device_label(&record)}
                                        </p>
                                        <p class="text-xs text-fg-muted">
                                            {record.ip_address.clone()}
                                            " · last active "
                                            {last_activity_label(&record)}
                                        </p>
                                    </div>
                                    <Show
                                        when=move || is_current.get()
                                        fallback={
                                            let id = id.clone();
                                            move || {
                                                let id = id.clone();
                                                view! {
                                                    <button
                                                        class="text-sm font-medium text-status-error-text hover:underline"
                                                        on:click=move |_| on_logout_device(id.clone())
                                                    >
                                                        "Sign out"
                                                    </button>
                                                }
                                            }
                                        }
                                    >
                                        <span class="text-xs font-medium text-status-success-text border border-status-success-border rounded px-2 py-1">
                                            "This device"
                                        </span>
                                    </Show>
                                </li>
                            }
                        }
                    </For>
                </ul>
                <Show when=move || rows().is_empty() && !loading()>
                    <p class="text-sm text-fg-muted">"No active devices found."</p>
                </Show>
            </div>
        </Layout>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::DeviceInfo;
    use crate::session::testing::provide_session_handle;
    use crate::state::notifications::provide_notifications;
    use crate::test_support::helpers::provide_authenticated;
    use crate::test_support::ssr::render_to_string;
    use chrono::Utc;

    fn record(id: &str, token: &str, browser: &str) -> ActiveSessionRecord {
        let now = Utc::now();
        ActiveSessionRecord {
            id: id.into(),
            session_token: token.into(),
            device_info: DeviceInfo {
                browser: browser.into(),
                os: "Linux".into(),
                device: "Desktop".into(),
            },
            ip_address: "10.0.0.1".into(),
            created_at: now,
            last_activity: now,
            expires_at: now,
        }
    }

    #[test]
    fn directory_rows_mark_the_current_device() {
        let html = render_to_string(move || {
            provide_notifications();
            provide_authenticated();
            let handle = provide_session_handle();
            handle.directory().sessions().set(vec![
                record("s1", "tok-1", "Firefox"),
                record("s2", "tok-other", "Chrome"),
            ]);
            view! { <SessionsPage /> }
        });
        assert!(html.contains("Firefox on Linux"));
        assert!(html.contains("Chrome on Linux"));
        assert!(html.contains("This device"));
        assert!(html.contains("Sign out all other devices"));
    }

    #[test]
    fn empty_directory_shows_the_placeholder() {
        let html = render_to_string(move || {
            provide_notifications();
            provide_authenticated();
            provide_session_handle();
            view! { <SessionsPage /> }
        });
        assert!(html.contains("No active devices found."));
        assert!(!html.contains("Sign out all other devices"));
    }

    #[test]
    fn device_label_combines_browser_os_and_form_factor() {
        let record = record("s1", "tok", "Safari");
        assert_eq!(device_label(&record), "Safari on Linux (Desktop)");
    }
}
