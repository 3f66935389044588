//! Admin view of every registration, kept live by the insert feed.

use chrono::Utc;
use dioxus::prelude::*;
use roster::{CsvExport, LoadError, LoadKind, Registration, RegistrationStore, Roster};

use crate::Icon;
use crate::icons::{
    FaArrowsRotate, FaCalendar, FaDownload, FaEnvelope, FaGraduationCap, FaMagnifyingGlass,
    FaPhone, FaSpinner, FaUsers,
};
use crate::notifications::{notify, use_notices, NoticeLevel};
use crate::store::use_store;

#[component]
pub fn AdminDashboard() -> Element {
    let store = use_store();
    let mut notices = use_notices();
    let mut roster = use_signal(|| {
        let mut roster = Roster::new();
        roster.begin_load(LoadKind::Initial);
        roster
    });

    // Open the feed before the initial load, so a registration made while the list
    // is in flight arrives through one or both. Duplicates collapse by id. The
    // subscription lives inside this future and is released when the dashboard unmounts.
    use_future(move || async move {
        let subscription = match store.subscribe_inserts().await {
            Ok(subscription) => {
                tracing::debug!("registration feed opened");
                Some(subscription)
            }
            Err(e) => {
                let e = LoadError::Subscribe(e);
                tracing::error!(error = %e, "could not open registration feed");
                notify(&mut notices, NoticeLevel::Error, &e.to_string());
                None
            }
        };

        let result = store.list().await;
        let loaded = roster.write().finish_load(result);
        if let Err(e) = loaded {
            notify(&mut notices, NoticeLevel::Error, &e.to_string());
        }

        let Some(mut subscription) = subscription else {
            return;
        };
        while let Some(event) = subscription.next_event().await {
            let fresh = roster.write().apply(event);
            if fresh {
                notify(&mut notices, NoticeLevel::Success, "New registration received!");
            }
        }

        tracing::warn!("registration feed ended");
        notify(&mut notices, NoticeLevel::Error, "Live updates stopped. Refresh to catch up.");
    });

    let handle_refresh = move |_: MouseEvent| {
        if roster.read().refreshing() {
            return;
        }
        roster.write().begin_load(LoadKind::Refresh);
        spawn(async move {
            let result = store.list().await;
            let loaded = roster.write().finish_load(result);
            match loaded {
                Ok(_) => notify(&mut notices, NoticeLevel::Success, "Data refreshed successfully"),
                Err(e) => notify(&mut notices, NoticeLevel::Error, &e.to_string()),
            }
        });
    };

    let handle_export = move |_: MouseEvent| {
        let export = roster.read().export(Utc::now().date_naive());
        let outcome = export
            .map_err(|e| e.to_string())
            .and_then(|export| download(&export));
        match outcome {
            Ok(()) => notify(&mut notices, NoticeLevel::Success, "Data exported successfully"),
            Err(message) => notify(&mut notices, NoticeLevel::Error, &message),
        }
    };

    if roster.read().loading() {
        return rsx! {
            div {
                class: "dashboard-loading",
                Icon { icon: FaSpinner, width: 48, height: 48, class: "spin".to_string() }
                p { "Loading student registrations..." }
            }
        };
    }

    let stats = roster.read().stats(Utc::now().date_naive());
    let refreshing = roster.read().refreshing();
    let spin_class = if refreshing { "spin" } else { "" }.to_string();
    let search = roster.read().search().to_string();
    let rows: Vec<Registration> = roster.read().filtered().into_iter().cloned().collect();

    rsx! {
        div {
            class: "dashboard",
            header {
                class: "dashboard-header",
                h1 { "Student Registrations" }
                p { "Manage and view all student registrations for Pixel Plus Tech Community" }
            }

            div {
                class: "dashboard-stats",
                StatCard { label: "Total Registrations", value: stats.total,
                    Icon { icon: FaUsers, width: 24, height: 24 }
                }
                StatCard { label: "Today's Registrations", value: stats.today,
                    Icon { icon: FaCalendar, width: 24, height: 24 }
                }
                StatCard { label: "Filtered Results", value: stats.filtered,
                    Icon { icon: FaMagnifyingGlass, width: 24, height: 24 }
                }
            }

            div {
                class: "dashboard-toolbar",
                div {
                    class: "dashboard-search",
                    Icon { icon: FaMagnifyingGlass, width: 14, height: 14 }
                    input {
                        r#type: "search",
                        placeholder: "Search by name, email, college, or course...",
                        value: "{search}",
                        oninput: move |evt: FormEvent| roster.write().set_search(evt.value()),
                    }
                }
                button {
                    class: "dashboard-button",
                    disabled: refreshing,
                    onclick: handle_refresh,
                    Icon { icon: FaArrowsRotate, width: 14, height: 14, class: spin_class }
                    " Refresh"
                }
                button {
                    class: "dashboard-button dashboard-button--primary",
                    onclick: handle_export,
                    Icon { icon: FaDownload, width: 14, height: 14 }
                    " Export CSV"
                }
            }

            if rows.is_empty() {
                div {
                    class: "dashboard-empty",
                    Icon { icon: FaUsers, width: 48, height: 48 }
                    if search.is_empty() {
                        p { "No registrations yet" }
                    } else {
                        p { "No registrations match your search" }
                    }
                }
            } else {
                table {
                    class: "dashboard-table",
                    thead {
                        tr {
                            th { "Student" }
                            th { "Contact" }
                            th { "Education" }
                            th { "Tech Knowledge" }
                            th { "Registered" }
                        }
                    }
                    tbody {
                        for record in rows {
                            RegistrationRow { key: "{record.id}", record }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn StatCard(label: &'static str, value: usize, children: Element) -> Element {
    rsx! {
        div {
            class: "stat-card",
            div { class: "stat-card-icon", {children} }
            div {
                p { class: "stat-card-label", "{label}" }
                p { class: "stat-card-value", "{value}" }
            }
        }
    }
}

#[component]
fn RegistrationRow(record: Registration) -> Element {
    let badge = record.tech_level().badge_class();
    let registered = record.created_at.format("%Y-%m-%d %H:%M").to_string();

    rsx! {
        tr {
            td { strong { "{record.name}" } }
            td {
                div {
                    class: "dashboard-cell-line",
                    Icon { icon: FaEnvelope, width: 12, height: 12 }
                    " {record.email}"
                }
                div {
                    class: "dashboard-cell-line",
                    Icon { icon: FaPhone, width: 12, height: 12 }
                    " {record.mobile}"
                }
            }
            td {
                div {
                    class: "dashboard-cell-line",
                    Icon { icon: FaGraduationCap, width: 12, height: 12 }
                    " {record.college}"
                }
                div { class: "dashboard-cell-muted", "{record.course} · {record.year}" }
            }
            td { span { class: badge, "{record.tech_knowledge}" } }
            td { "{registered}" }
        }
    }
}

/// Hand the CSV to the browser as a `data:` link and click it.
#[cfg(target_arch = "wasm32")]
fn download(export: &CsvExport) -> Result<(), String> {
    use web_sys::wasm_bindgen::JsCast;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document to download into")?;
    let body = document.body().ok_or("document has no body")?;

    let link = document
        .create_element("a")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "could not create download link".to_string())?;
    let encoded: String = js_sys::encode_uri_component(&export.body).into();
    link.set_href(&format!("data:{},{encoded}", CsvExport::MIME_TYPE));
    link.set_download(&export.filename);

    body.append_child(&link).map_err(|e| format!("{e:?}"))?;
    link.click();
    body.remove_child(&link).map_err(|e| format!("{e:?}"))?;

    tracing::info!(file = %export.filename, rows = export.rows, "exported registrations");
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn download(export: &CsvExport) -> Result<(), String> {
    tracing::warn!(file = %export.filename, "CSV download requested outside the browser");
    Err("Downloads are only available in the browser".to_string())
}
