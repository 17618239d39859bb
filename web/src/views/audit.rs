use crate::use_error;
use dioxus::prelude::*;
use types::audit::{
    AUDIT_PAGE_SIZE, AUDITED_TABLES, AuditAction, AuditAnalytics, AuditFilters, AuditLog, format_value,
};
use types::{Action, Page, Profile, QueryPairs, Resource};
use ui::{EmptyRow, LoadingRow, Modal, Pagination, StatusChip, format_timestamp, opt_display};

use super::companies::TextField;
use super::security::SecurityEventsPanel;

const COLUMNS: usize = 7;
const ANALYTICS_DAYS: u32 = 30;

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    Logs,
    Security,
}

#[component]
pub fn AuditPage() -> Element {
    let profile = use_context::<Profile>();
    let mut tab = use_signal(|| Tab::Logs);
    let show_security = profile.can(Action::View, Resource::SecurityEvent);

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Audit Trail" }
                    p { class: "page-subtitle", "Who changed what, and when." }
                }
            }

            if show_security {
                div { class: "tabs",
                    button {
                        class: if tab() == Tab::Logs { "tab active" } else { "tab" },
                        onclick: move |_| tab.set(Tab::Logs),
                        "Audit Logs"
                    }
                    button {
                        class: if tab() == Tab::Security { "tab active" } else { "tab" },
                        onclick: move |_| tab.set(Tab::Security),
                        "Security Events"
                    }
                }
            }

            {match tab() {
                Tab::Logs => rsx! { AuditLogsPanel {} },
                Tab::Security => rsx! { SecurityEventsPanel {} },
            }}
        }
    }
}

#[component]
fn AuditLogsPanel() -> Element {
    let profile = use_context::<Profile>();
    let mut error_state = use_error();
    let mut latest = ui::use_latest_request();

    let mut draft = use_signal(AuditFilters::default);
    let mut filters = use_signal(AuditFilters::default);
    let mut search = use_signal(String::new);
    let mut show_filters = use_signal(|| false);
    let mut logs = use_signal(Page::<AuditLog>::default);
    let mut loading = use_signal(|| true);
    let mut selected = use_signal(|| None::<AuditLog>);

    use_effect(move || {
        let filters = filters();
        spawn(async move {
            let ticket = latest.issue();
            loading.set(true);
            let result = api::list_audit_logs(filters).await;
            if !latest.is_current(ticket) {
                return;
            }
            match result {
                Ok(page) => logs.set(page),
                Err(e) => error_state.set_server_error(&e, "Failed to load audit logs"),
            }
            loading.set(false);
        });
    });

    let apply = move |_: MouseEvent| {
        filters.set(AuditFilters {
            search: search(),
            page: 1,
            ..draft.read().clone()
        });
    };

    let clear = move |_: MouseEvent| {
        draft.set(AuditFilters::default());
        search.set(String::new());
        filters.set(AuditFilters::default());
    };

    let active = filters.read().active_count();
    let page = filters.read().page.max(1);
    let total_pages = logs.read().total_pages(AUDIT_PAGE_SIZE);
    let export_href = format!("/download/audit-logs.csv?{}", filters.read().query_string());
    let can_export = profile.can(Action::Export, Resource::AuditLog);

    let action_value = draft.read().action.as_ref().map(|a| a.as_str().to_string()).unwrap_or_default();
    let table_value = draft.read().table_name.clone();
    let start_value = draft.read().start_date.map(|d| d.to_string()).unwrap_or_default();
    let end_value = draft.read().end_date.map(|d| d.to_string()).unwrap_or_default();

    rsx! {
        AnalyticsPanel {}

        div { class: "card",
            form { class: "search-bar",
                onsubmit: move |e| {
                    e.prevent_default();
                    let current = filters.read().clone();
                    filters.set(AuditFilters { search: search(), page: 1, ..current });
                },
                input {
                    class: "form-input",
                    r#type: "search",
                    placeholder: "Search descriptions, users and records",
                    value: "{search}",
                    oninput: move |e| search.set(e.value()),
                }
                button { r#type: "submit", class: "btn btn-secondary", "Search" }
                button {
                    r#type: "button",
                    class: "btn btn-link",
                    onclick: move |_| show_filters.toggle(),
                    if active > 0 { "Filters ({active})" } else { "Filters" }
                }
                if can_export {
                    a {
                        class: "btn btn-secondary",
                        href: "{export_href}",
                        rel: "external",
                        "Export CSV"
                    }
                }
            }

            if show_filters() {
                div { class: "filter-grid",
                    div { class: "form-group",
                        label { class: "form-label", r#for: "action", "Action" }
                        select {
                            id: "action",
                            class: "form-input",
                            value: "{action_value}",
                            onchange: move |e| {
                                let value = e.value();
                                draft.write().action = (!value.is_empty()).then(|| AuditAction::from(value));
                            },
                            option { value: "", "All actions" }
                            for action in AuditAction::KNOWN {
                                option {
                                    key: "{action.as_str()}",
                                    value: "{action.as_str()}",
                                    selected: action_value == action.as_str(),
                                    "{action.label()}"
                                }
                            }
                        }
                    }
                    div { class: "form-group",
                        label { class: "form-label", r#for: "table_name", "Object Type" }
                        select {
                            id: "table_name",
                            class: "form-input",
                            value: "{table_value}",
                            onchange: move |e| draft.write().table_name = e.value(),
                            option { value: "", "All types" }
                            for (table, display) in AUDITED_TABLES {
                                option {
                                    key: "{table}",
                                    value: table,
                                    selected: table_value == table,
                                    "{display}"
                                }
                            }
                        }
                    }
                    TextField { id: "user", label: "User", value: draft.read().user.clone(),
                        on_input: move |v| draft.write().user = v }
                    TextField { id: "start_date", label: "From", input_type: "date",
                        value: start_value,
                        on_input: move |v: String| draft.write().start_date = v.parse().ok() }
                    TextField { id: "end_date", label: "To", input_type: "date",
                        value: end_value,
                        on_input: move |v: String| draft.write().end_date = v.parse().ok() }
                }
                div { class: "filter-actions",
                    button { class: "btn btn-primary", onclick: apply, "Apply Filters" }
                    button { class: "btn btn-secondary", onclick: clear, "Clear" }
                }
            }

            div { class: "table-container",
                table {
                    thead {
                        tr {
                            th { "Time" }
                            th { "Action" }
                            th { "Object Type" }
                            th { "Record" }
                            th { "User" }
                            th { "Changes" }
                            th { "" }
                        }
                    }
                    tbody {
                        if loading() {
                            LoadingRow { colspan: COLUMNS }
                        } else if logs.read().is_empty() {
                            EmptyRow { colspan: COLUMNS, noun: "audit logs" }
                        } else {
                            for log in logs.read().results.iter().cloned() {
                                tr { key: "{log.id}",
                                    td { "{format_timestamp(log.timestamp)}" }
                                    td { StatusChip { label: log.action.label(), tone: log.action.tone() } }
                                    td { "{log.table_display_name()}" }
                                    td { {log.record_id.clone().unwrap_or_else(|| "-".into())} }
                                    td { "{log.actor()}" }
                                    td { class: "text-truncate", "{log.changes_summary()}" }
                                    td { class: "row-actions",
                                        button {
                                            class: "btn btn-link",
                                            onclick: {
                                                let log = log.clone();
                                                move |_| selected.set(Some(log.clone()))
                                            },
                                            "Details"
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
                total_pages,
                on_change: move |page| filters.write().page = page,
            }
        }

        if let Some(log) = selected() {
            AuditDetailModal { log, on_close: move |_| selected.set(None) }
        }
    }
}

#[component]
fn AnalyticsPanel() -> Element {
    let mut analytics = use_signal(|| None::<AuditAnalytics>);
    let mut recent = use_signal(Vec::<AuditLog>::new);

    use_effect(move || {
        spawn(async move {
            match api::audit_analytics(ANALYTICS_DAYS).await {
                Ok(a) => analytics.set(Some(a)),
                Err(e) if ui::is_unauthorized(&e) => ui::force_logout(),
                Err(e) => tracing::warn!(error = %e, "audit analytics unavailable"),
            }
            match api::recent_activity().await {
                Ok(logs) => recent.set(logs),
                Err(e) => tracing::warn!(error = %e, "recent activity unavailable"),
            }
        });
    });

    let Some(analytics) = analytics() else {
        return rsx! {};
    };

    rsx! {
        div { class: "stats-grid",
            div { class: "stat-card",
                div { class: "stat-label", "Actions (last {ANALYTICS_DAYS} days)" }
                div { class: "stat-value", "{analytics.total_actions}" }
            }
            div { class: "stat-card",
                div { class: "stat-label", "By action" }
                ul { class: "breakdown",
                    for (action, count) in analytics.by_action().into_iter().take(5) {
                        li { key: "{action.as_str()}",
                            span { "{action.label()}" }
                            span { class: "breakdown-count", "{count}" }
                        }
                    }
                }
            }
            div { class: "stat-card",
                div { class: "stat-label", "Most active users" }
                ul { class: "breakdown",
                    for user in analytics.most_active_users.iter().take(5) {
                        li { key: "{user.username}",
                            span {
                                if user.display_name.is_empty() { "{user.username}" } else { "{user.display_name}" }
                            }
                            span { class: "breakdown-count", "{user.action_count}" }
                        }
                    }
                }
            }
            if !recent.read().is_empty() {
                div { class: "stat-card",
                    div { class: "stat-label", "Recent activity" }
                    ul { class: "breakdown",
                        for log in recent.read().iter().take(5) {
                            li { key: "{log.id}",
                                span { "{log.actor()} · {log.action.label()} {log.table_display_name()}" }
                                span { class: "text-muted text-sm", "{format_timestamp(log.timestamp)}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn AuditDetailModal(log: AuditLog, on_close: EventHandler<()>) -> Element {
    let changes = log.changes();
    let old_values = log.old_values.as_ref().map(format_value);
    let new_values = log.new_values.as_ref().map(format_value);
    let extra = log.extra_data.as_ref().map(format_value);

    rsx! {
        Modal {
            title: "Audit Log Details",
            wide: true,
            on_close,
            dl { class: "detail-list",
                dt { "Time" }
                dd { "{format_timestamp(log.timestamp)}" }
                dt { "Action" }
                dd { StatusChip { label: log.action.label(), tone: log.action.tone() } }
                dt { "Object Type" }
                dd { "{log.table_display_name()}" }
                dt { "Record ID" }
                dd { {log.record_id.clone().unwrap_or_else(|| "-".into())} }
                dt { "User" }
                dd { "{log.actor()}" }
                dt { "IP Address" }
                dd { "{opt_display(&log.ip_address)}" }
                dt { "User Agent" }
                dd { class: "text-sm", "{opt_display(&log.user_agent)}" }
                if !log.description.is_empty() {
                    dt { "Description" }
                    dd { "{log.description}" }
                }
                if !changes.is_empty() {
                    dt { "Changed Fields" }
                    dd { {changes.join(", ")} }
                }
            }
            if let Some(old) = old_values {
                h3 { class: "detail-heading", "Previous Values" }
                pre { class: "code-block", "{old}" }
            }
            if let Some(new) = new_values {
                h3 { class: "detail-heading", "New Values" }
                pre { class: "code-block", "{new}" }
            }
            if let Some(extra) = extra {
                h3 { class: "detail-heading", "Additional Data" }
                pre { class: "code-block", "{extra}" }
            }
        }
    }
}
