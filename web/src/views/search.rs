use crate::use_error;
use dioxus::prelude::*;
use types::employee::{Employee, EmployeeFilters, EmploymentType, PAGE_SIZES};
use types::{Action, Page, Profile, QueryPairs, Resource};
use ui::{EmptyRow, LoadingRow, Pagination, format_date, opt_display};

use super::companies::TextField;
use super::components::{EmploymentTypeSelect, HistoryModal};

const COLUMNS: usize = 8;

/// Empty input clears the filter; junk is ignored.
fn parse_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

fn parse_status(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn number_text<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[component]
pub fn SearchPage() -> Element {
    let profile = use_context::<Profile>();
    let mut error_state = use_error();
    let mut latest = ui::use_latest_request();

    // Edited in the filter panel, applied on search.
    let mut draft = use_signal(EmployeeFilters::default);
    let mut filters = use_signal(EmployeeFilters::default);
    let mut results = use_signal(Page::<Employee>::default);
    let mut loading = use_signal(|| true);
    let mut history = use_signal(|| None::<Employee>);

    use_effect(move || {
        let filters = filters();
        spawn(async move {
            let ticket = latest.issue();
            loading.set(true);
            let result = api::list_employees(filters).await;
            if !latest.is_current(ticket) {
                return;
            }
            match result {
                Ok(page) => results.set(page),
                Err(e) => error_state.set_server_error(&e, "Failed to search employees"),
            }
            loading.set(false);
        });
    });

    let apply = move |_: MouseEvent| {
        filters.set(EmployeeFilters {
            page: 1,
            ..draft.read().clone()
        });
    };

    let clear = move |_: MouseEvent| {
        let cleared = draft.read().cleared();
        draft.set(cleared.clone());
        filters.set(cleared);
    };

    let active = filters.read().active_count();
    let page = filters.read().page;
    let page_size = filters.read().page_size;
    let total_pages = results.read().total_pages(page_size);
    let count = results.read().count;
    let export_href = format!("/download/employees.csv?{}", filters.read().query_string());
    let can_export = profile.can(Action::Export, Resource::Employee);

    let status_value = match draft.read().is_current {
        Some(true) => "true",
        Some(false) => "false",
        None => "",
    };

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Advanced Search" }
                    p { class: "page-subtitle", "Find employees by company, role, dates and experience." }
                }
                if can_export {
                    div { class: "page-header-actions",
                        a {
                            class: "btn btn-secondary",
                            href: "{export_href}",
                            rel: "external",
                            "Export Results"
                        }
                    }
                }
            }

            div { class: "card filter-panel",
                div { class: "filter-panel-header",
                    h2 { class: "card-title", "Filters" }
                    if active > 0 {
                        span { class: "filter-count", "{active} active" }
                    }
                }
                div { class: "filter-grid",
                    TextField { id: "name", label: "Name", value: draft.read().name.clone(),
                        on_input: move |v| draft.write().name = v }
                    div { class: "form-group",
                        label { class: "form-label", r#for: "company", "Company" }
                        ui::CompanySelect {
                            id: "company",
                            value: draft.read().company,
                            on_change: move |company| draft.write().company = company,
                        }
                    }
                    TextField { id: "department", label: "Department",
                        value: draft.read().department.clone(),
                        on_input: move |v| draft.write().department = v }
                    TextField { id: "role", label: "Role", value: draft.read().role.clone(),
                        on_input: move |v| draft.write().role = v }
                    div { class: "form-group",
                        label { class: "form-label", r#for: "employment_type", "Employment Type" }
                        EmploymentTypeSelect {
                            id: "employment_type",
                            value: draft.read().employment_type,
                            any_label: "Any type",
                            on_change: move |kind: Option<EmploymentType>| draft.write().employment_type = kind,
                        }
                    }
                    TextField { id: "year_started", label: "Year Started", input_type: "number",
                        value: number_text(draft.read().year_started),
                        on_input: move |v: String| draft.write().year_started = parse_number(&v) }
                    TextField { id: "year_left", label: "Year Left", input_type: "number",
                        value: number_text(draft.read().year_left),
                        on_input: move |v: String| draft.write().year_left = parse_number(&v) }
                    div { class: "form-group",
                        label { class: "form-label", r#for: "is_current", "Current Status" }
                        select {
                            id: "is_current",
                            class: "form-input",
                            value: status_value,
                            onchange: move |e| draft.write().is_current = parse_status(&e.value()),
                            option { value: "", "Any" }
                            option { value: "true", "Currently employed" }
                            option { value: "false", "Former employees" }
                        }
                    }
                    TextField { id: "experience_years", label: "Minimum Experience (years)",
                        input_type: "number",
                        value: number_text(draft.read().experience_years),
                        on_input: move |v: String| draft.write().experience_years = parse_number(&v) }
                }
                div { class: "filter-actions",
                    button { class: "btn btn-primary", onclick: apply, "Search" }
                    button { class: "btn btn-secondary", onclick: clear, "Clear Filters" }
                }
            }

            div { class: "card",
                div { class: "results-header",
                    span { class: "text-muted", "{count} employees found" }
                    label { class: "page-size",
                        "Show "
                        select {
                            class: "form-input form-input-sm",
                            value: "{page_size}",
                            onchange: move |e| {
                                if let Some(size) = parse_number::<u32>(&e.value()) {
                                    let mut filters = filters.write();
                                    filters.page_size = size;
                                    filters.page = 1;
                                    draft.write().page_size = size;
                                }
                            },
                            for size in PAGE_SIZES {
                                option { key: "{size}", value: "{size}", selected: size == page_size, "{size}" }
                            }
                        }
                        " per page"
                    }
                }
                div { class: "table-container",
                    table {
                        thead {
                            tr {
                                th { "Name" }
                                th { "Company" }
                                th { "Current Role" }
                                th { "Department" }
                                th { "Type" }
                                th { "Started" }
                                th { "Status" }
                                th { "" }
                            }
                        }
                        tbody {
                            if loading() {
                                LoadingRow { colspan: COLUMNS }
                            } else if results.read().is_empty() {
                                EmptyRow { colspan: COLUMNS, noun: "employees" }
                            } else {
                                for employee in results.read().results.iter().cloned() {
                                    {
                                        let position = employee.current_position().cloned();
                                        rsx! {
                                            tr { key: "{employee.id}",
                                                td { "{employee.name}" }
                                                td { "{opt_display(&employee.company_name)}" }
                                                td { "{opt_display(employee.current_role())}" }
                                                td { {opt_display(position.as_ref().map_or("", |p| p.department_name()))} }
                                                td { {position.as_ref().map_or("-", |p| p.employment_type.label())} }
                                                td { {format_date(position.as_ref().map(|p| p.start_date))} }
                                                td {
                                                    if position.is_some() {
                                                        ui::StatusChip { label: "Current", tone: "success" }
                                                    } else {
                                                        ui::StatusChip { label: "Former", tone: "neutral" }
                                                    }
                                                }
                                                td { class: "row-actions",
                                                    button {
                                                        class: "btn btn-link",
                                                        onclick: {
                                                            let employee = employee.clone();
                                                            move |_| history.set(Some(employee.clone()))
                                                        },
                                                        "View History"
                                                    }
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
                    total_pages,
                    on_change: move |page| filters.write().page = page,
                }
            }

            if let Some(employee) = history() {
                HistoryModal {
                    employee_id: employee.id,
                    employee_name: employee.name,
                    on_close: move |_| history.set(None),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_numbers_clear_the_filter() {
        assert_eq!(parse_number::<i16>(""), None);
        assert_eq!(parse_number::<i16>(" 2021 "), Some(2021));
        assert_eq!(parse_number::<u32>("three"), None);
    }

    #[test]
    fn status_select_values() {
        assert_eq!(parse_status("true"), Some(true));
        assert_eq!(parse_status("false"), Some(false));
        assert_eq!(parse_status(""), None);
    }
}
