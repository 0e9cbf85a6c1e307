use leptos::*;

#[cfg(target_arch = "wasm32")]
const AUTO_DISMISS_MS: u32 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Transient toast queue. Everything user-visible that is not an inline form
/// error goes through here.
#[derive(Clone, Copy)]
pub struct Notifications {
    notices: RwSignal<Vec<Notice>>,
    next_id: RwSignal<u64>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifications {
    pub fn new() -> Self {
        Self {
            notices: create_rw_signal(Vec::new()),
            next_id: create_rw_signal(1),
        }
    }

    pub fn signal(&self) -> RwSignal<Vec<Notice>> {
        self.notices
    }

    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);
        self.notices.update(|list| {
            list.push(Notice {
                id,
                level,
                message: message.into(),
            })
        });

        #[cfg(target_arch = "wasm32")]
        {
            let notifications = *self;
            gloo_timers::callback::Timeout::new(AUTO_DISMISS_MS, move || {
                notifications.dismiss(id);
            })
            .forget();
        }

        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message)
    }

    pub fn warn(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Warn, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message)
    }

    pub fn dismiss(&self, id: u64) {
        self.notices.update(|list| list.retain(|n| n.id != id));
    }
}

pub fn provide_notifications() -> Notifications {
    let notifications = Notifications::new();
    provide_context(notifications);
    notifications
}

pub fn use_notifications() -> Notifications {
    use_context::<Notifications>().unwrap_or_default()
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::test_support::ssr::with_runtime;

    #[test]
    fn push_and_dismiss_maintain_queue_order() {
        with_runtime(|| {
            let notifications = Notifications::new();
            let first = notifications.info("first");
            let second = notifications.error("second");

            let messages: Vec<String> = notifications
                .signal()
                .get_untracked()
                .into_iter()
                .map(|n| n.message)
                .collect();
            assert_eq!(messages, vec!["first", "second"]);

            notifications.dismiss(first);
            let remaining = notifications.signal().get_untracked();
            assert_eq!(remaining.len(), 1);
            assert_eq!(remaining[0].id, second);
        });
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        with_runtime(|| {
            let notifications = Notifications::new();
            let a = notifications.info("a");
            let b = notifications.warn("b");
            assert!(b > a);
        });
    }
}
