//! Transient notifications shown in the corner of the page.

use dioxus::prelude::*;

use crate::Icon;
use crate::icons::{FaCircleCheck, FaCircleExclamation, FaCircleInfo, FaXmark};

/// How long a notice stays up before it is dismissed on its own.
#[cfg(target_arch = "wasm32")]
const NOTICE_LIFETIME_MS: u32 = 4_000;

/// Notices shown at once. Older ones drop off the top.
const MAX_VISIBLE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub timestamp: String,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct NoticeLog {
    entries: Vec<Notice>,
    next_id: u64,
}

impl NoticeLog {
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Notice {
            id,
            timestamp: current_time(),
            level,
            message: message.into(),
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|n| n.id != id);
    }

    /// The newest notices, oldest of them first.
    pub fn visible(&self) -> &[Notice] {
        let start = self.entries.len().saturating_sub(MAX_VISIBLE);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn use_notices() -> Signal<NoticeLog> {
    use_context::<Signal<NoticeLog>>()
}

/// Show a notice and schedule its dismissal.
pub fn notify(log: &mut Signal<NoticeLog>, level: NoticeLevel, message: &str) {
    let id = log.write().push(level, message);

    // Outside the browser there is no timer; the notice stays until closed.
    #[cfg(target_arch = "wasm32")]
    {
        let mut log = *log;
        spawn(async move {
            gloo_timers::future::TimeoutFuture::new(NOTICE_LIFETIME_MS).await;
            log.write().dismiss(id);
        });
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = id;
}

#[cfg(target_arch = "wasm32")]
fn current_time() -> String {
    let date = js_sys::Date::new_0();
    let h = date.get_hours();
    let m = date.get_minutes();
    let s = date.get_seconds();
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(not(target_arch = "wasm32"))]
fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Provides the [`NoticeLog`] context and renders the toaster above `children`.
#[component]
pub fn NoticeProvider(children: Element) -> Element {
    use_context_provider(|| Signal::new(NoticeLog::default()));

    rsx! {
        {children}
        Toaster {}
    }
}

#[component]
pub fn Toaster() -> Element {
    let mut log = use_notices();
    let notices = log().visible().to_vec();

    rsx! {
        div {
            class: "toaster",
            for notice in notices {
                div {
                    key: "{notice.id}",
                    class: match notice.level {
                        NoticeLevel::Success => "toast toast--success",
                        NoticeLevel::Error => "toast toast--error",
                        NoticeLevel::Info => "toast toast--info",
                    },
                    {match notice.level {
                        NoticeLevel::Success => rsx! { Icon { icon: FaCircleCheck, width: 16, height: 16 } },
                        NoticeLevel::Error => rsx! { Icon { icon: FaCircleExclamation, width: 16, height: 16 } },
                        NoticeLevel::Info => rsx! { Icon { icon: FaCircleInfo, width: 16, height: 16 } },
                    }}
                    span { class: "toast-time", "{notice.timestamp}" }
                    span { class: "toast-message", "{notice.message}" }
                    button {
                        class: "toast-close",
                        title: "Dismiss",
                        onclick: move |_| log.write().dismiss(notice.id),
                        Icon { icon: FaXmark, width: 12, height: 12 }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut log = NoticeLog::default();
        let first = log.push(NoticeLevel::Success, "Data refreshed successfully");
        let second = log.push(NoticeLevel::Error, "No data to export");
        assert_ne!(first, second);
        assert_eq!(log.len(), 2);

        log.dismiss(first);
        assert_eq!(log.len(), 1);
        assert_eq!(log.visible()[0].message, "No data to export");

        log.dismiss(first);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_only_newest_are_visible() {
        let mut log = NoticeLog::default();
        for i in 0..8 {
            log.push(NoticeLevel::Info, format!("notice {i}"));
        }
        let visible = log.visible();
        assert_eq!(visible.len(), MAX_VISIBLE);
        assert_eq!(visible[0].message, "notice 3");
        assert_eq!(visible[MAX_VISIBLE - 1].message, "notice 7");
    }
}
