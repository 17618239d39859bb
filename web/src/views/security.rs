use crate::use_error;
use dioxus::prelude::*;
use types::audit::{SecurityDashboard, SecurityEvent, SecurityFilters, Severity, humanize};
use types::{Action, Page, Profile, Resource};
use ui::{
    EmptyRow, FlashBanner, LoadingRow, Modal, Pagination, StatusChip, format_timestamp, opt_display,
};

const COLUMNS: usize = 7;

fn parse_resolved(value: &str) -> Option<bool> {
    match value {
        "resolved" => Some(true),
        "open" => Some(false),
        _ => None,
    }
}

#[component]
pub fn SecurityEventsPanel() -> Element {
    let profile = use_context::<Profile>();
    let mut error_state = use_error();
    let mut flash = ui::use_flash();
    let mut latest = ui::use_latest_request();

    let mut filters = use_signal(SecurityFilters::default);
    let mut events = use_signal(Page::<SecurityEvent>::default);
    let mut dashboard = use_signal(|| None::<SecurityDashboard>);
    let mut loading = use_signal(|| true);
    let mut reload = use_signal(|| 0u32);
    let mut resolving = use_signal(|| None::<SecurityEvent>);
    let mut notes = use_signal(String::new);
    let mut busy = use_signal(|| false);

    use_effect(move || {
        reload();
        spawn(async move {
            match api::security_dashboard().await {
                Ok(d) => dashboard.set(Some(d)),
                Err(e) if ui::is_unauthorized(&e) => ui::force_logout(),
                Err(e) => tracing::warn!(error = %e, "security dashboard unavailable"),
            }
        });
    });

    use_effect(move || {
        let filters = filters();
        reload();
        spawn(async move {
            let ticket = latest.issue();
            loading.set(true);
            let result = api::list_security_events(filters).await;
            if !latest.is_current(ticket) {
                return;
            }
            match result {
                Ok(page) => events.set(page),
                Err(e) => error_state.set_server_error(&e, "Failed to load security events"),
            }
            loading.set(false);
        });
    });

    let mut close = move || {
        resolving.set(None);
        notes.set(String::new());
    };

    let mut resolve = move |id: i64| {
        let notes = notes();
        spawn(async move {
            busy.set(true);
            match api::resolve_security_event(id, notes).await {
                Ok(()) => {
                    flash.success("Security event resolved");
                    reload += 1;
                }
                Err(e) => flash.server_error(&e, "Failed to resolve security event"),
            }
            busy.set(false);
            close();
        });
    };

    let can_resolve = profile.can(Action::Resolve, Resource::SecurityEvent);
    let page = filters.read().page.max(1);
    let severity_value = filters.read().severity.map(|s| s.as_str()).unwrap_or_default();
    let resolved_value = match filters.read().is_resolved {
        Some(true) => "resolved",
        Some(false) => "open",
        None => "",
    };

    rsx! {
        FlashBanner { flash }

        if let Some(dashboard) = dashboard() {
            div { class: "stats-grid",
                div { class: "stat-card",
                    div { class: "stat-label", "Total events" }
                    div { class: "stat-value", "{dashboard.total_events}" }
                }
                div { class: "stat-card",
                    div { class: "stat-label", "Unresolved" }
                    div { class: "stat-value", "{dashboard.unresolved_events}" }
                }
                div { class: "stat-card",
                    div { class: "stat-label", "Last 24 hours" }
                    div { class: "stat-value", "{dashboard.recent_events}" }
                }
                div { class: "stat-card",
                    div { class: "stat-label", "By severity" }
                    ul { class: "breakdown",
                        for (severity, count) in dashboard.events_by_severity.iter() {
                            li { key: "{severity}",
                                span { {humanize(severity)} }
                                span { class: "breakdown-count", "{count}" }
                            }
                        }
                    }
                }
            }
        }

        div { class: "card",
            div { class: "filter-grid",
                div { class: "form-group",
                    label { class: "form-label", r#for: "severity", "Severity" }
                    select {
                        id: "severity",
                        class: "form-input",
                        value: severity_value,
                        onchange: move |e| {
                            let severity = Severity::ALL.into_iter().find(|s| s.as_str() == e.value());
                            let mut filters = filters.write();
                            filters.severity = severity;
                            filters.page = 1;
                        },
                        option { value: "", "All severities" }
                        for severity in Severity::ALL {
                            option {
                                key: "{severity.as_str()}",
                                value: severity.as_str(),
                                selected: severity_value == severity.as_str(),
                                "{severity.label()}"
                            }
                        }
                    }
                }
                div { class: "form-group",
                    label { class: "form-label", r#for: "is_resolved", "Status" }
                    select {
                        id: "is_resolved",
                        class: "form-input",
                        value: resolved_value,
                        onchange: move |e| {
                            let is_resolved = parse_resolved(&e.value());
                            let mut filters = filters.write();
                            filters.is_resolved = is_resolved;
                            filters.page = 1;
                        },
                        option { value: "", "All" }
                        option { value: "open", "Open" }
                        option { value: "resolved", "Resolved" }
                    }
                }
            }

            div { class: "table-container",
                table {
                    thead {
                        tr {
                            th { "Time" }
                            th { "Event" }
                            th { "Severity" }
                            th { "User" }
                            th { "IP Address" }
                            th { "Status" }
                            th { "" }
                        }
                    }
                    tbody {
                        if loading() {
                            LoadingRow { colspan: COLUMNS }
                        } else if events.read().is_empty() {
                            EmptyRow { colspan: COLUMNS, noun: "security events" }
                        } else {
                            for event in events.read().results.iter().cloned() {
                                tr { key: "{event.id}",
                                    td { "{format_timestamp(event.timestamp)}" }
                                    td {
                                        div { "{event.event_label()}" }
                                        if !event.description.is_empty() {
                                            div { class: "text-muted text-sm", "{event.description}" }
                                        }
                                    }
                                    td { StatusChip { label: event.severity.label(), tone: event.severity.tone() } }
                                    td {
                                        {opt_display(if event.user_name.is_empty() { &event.username } else { &event.user_name })}
                                    }
                                    td { "{opt_display(&event.ip_address)}" }
                                    td {
                                        if event.is_resolved {
                                            StatusChip { label: "Resolved", tone: "success" }
                                            if !event.resolved_by_name.is_empty() {
                                                div { class: "text-muted text-sm", "by {event.resolved_by_name}" }
                                            }
                                        } else {
                                            StatusChip { label: "Open", tone: "warning" }
                                        }
                                    }
                                    td { class: "row-actions",
                                        if can_resolve && !event.is_resolved {
                                            button {
                                                class: "btn btn-link",
                                                onclick: {
                                                    let event = event.clone();
                                                    move |_| resolving.set(Some(event.clone()))
                                                },
                                                "Resolve"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            Pagination {
                page,
                has_next: events.read().next.is_some(),
                on_change: move |page| filters.write().page = page,
            }
        }

        if let Some(event) = resolving() {
            Modal {
                title: "Resolve Security Event",
                busy: busy(),
                on_close: move |_| close(),
                footer: rsx! {
                    button {
                        class: "btn btn-secondary",
                        disabled: busy(),
                        onclick: move |_| close(),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-primary",
                        disabled: busy(),
                        onclick: move |_| resolve(event.id),
                        if busy() { "Resolving..." } else { "Mark Resolved" }
                    }
                },
                p { "{event.event_label()}" }
                if !event.description.is_empty() {
                    p { class: "text-muted", "{event.description}" }
                }
                div { class: "form-group",
                    label { class: "form-label", r#for: "resolution_notes", "Resolution notes" }
                    textarea {
                        id: "resolution_notes",
                        class: "form-input",
                        rows: "3",
                        value: "{notes}",
                        oninput: move |e| notes.set(e.value()),
                    }
                }
            }
        }
    }
}
