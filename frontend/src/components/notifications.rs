use crate::state::notifications::{use_notifications, Notice, NoticeLevel};
use leptos::*;

fn notice_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "bg-status-info-bg border-status-info-border text-status-info-text",
        NoticeLevel::Warn => {
            "bg-status-warning-bg border-status-warning-border text-status-warning-text"
        }
        NoticeLevel::Error => "bg-status-error-bg border-status-error-border text-status-error-text",
    }
}

#[component]
fn NoticeToast(notice: Notice) -> impl IntoView {
    let notifications = use_notifications();
    let id = notice.id;
    view! {
        <div class=format!(
            "flex items-center justify-between gap-4 border px-4 py-3 rounded shadow-sm {}",
            notice_class(notice.level),
        )>
            <p class="text-sm">{notice.message}</p>
            <button
                class="text-sm opacity-70 hover:opacity-100"
                on:click=move |_| notifications.dismiss(id)
            >
                "Dismiss"
            </button>
        </div>
    }
}

#[component]
pub fn NotificationList() -> impl IntoView {
    let notices = use_notifications().signal();
    view! {
        <div class="fixed top-4 right-4 z-50 w-80 space-y-2">
            <For each=move || notices.get() key=|notice| notice.id let:notice>
                <NoticeToast notice/>
            </For>
        </div>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::state::notifications::provide_notifications;
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn list_renders_queued_notices() {
        let html = render_to_string(move || {
            let notifications = provide_notifications();
            notifications.info("saved");
            notifications.error("that device could not be signed out");
            view! { <NotificationList /> }
        });
        assert!(html.contains("saved"));
        assert!(html.contains("that device could not be signed out"));
    }

    #[test]
    fn list_is_empty_without_notices() {
        let html = render_to_string(move || {
            provide_notifications();
            view! { <NotificationList /> }
        });
        assert!(!html.contains("Dismiss"));
    }
}
