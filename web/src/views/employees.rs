use crate::use_error;
use dioxus::prelude::*;
use types::employee::{Employee, EmployeeFilters, NewEmployee};
use types::{Action, Page, Profile, Resource};
use ui::{ConfirmModal, EmptyRow, FlashBanner, LoadingRow, Pagination, opt_display};

use super::components::{AddPositionModal, EmployeeFormModal, HistoryModal};

const COLUMNS: usize = 7;

#[derive(Clone, PartialEq)]
enum Dialog {
    Create,
    Edit(Employee),
    Delete(Employee),
    History(Employee),
    AddPosition(Employee),
}

#[component]
pub fn EmployeesPage() -> Element {
    let profile = use_context::<Profile>();
    let mut error_state = use_error();
    let mut flash = ui::use_flash();
    let mut latest = ui::use_latest_request();

    let mut filters = use_signal(EmployeeFilters::default);
    let mut search = use_signal(String::new);
    let mut employees = use_signal(Page::<Employee>::default);
    let mut loading = use_signal(|| true);
    let mut reload = use_signal(|| 0u32);
    let mut dialog = use_signal(|| None::<Dialog>);
    let mut busy = use_signal(|| false);
    let mut form_error = use_signal(|| None::<String>);

    use_effect(move || {
        let filters = filters();
        reload();
        spawn(async move {
            let ticket = latest.issue();
            loading.set(true);
            let result = api::list_employees(filters).await;
            if !latest.is_current(ticket) {
                return;
            }
            match result {
                Ok(page) => employees.set(page),
                Err(e) => error_state.set_server_error(&e, "Failed to load employees"),
            }
            loading.set(false);
        });
    });

    let mut close = move || {
        dialog.set(None);
        form_error.set(None);
    };

    let mut save = move |(existing, employee): (Option<i64>, NewEmployee)| {
        spawn(async move {
            busy.set(true);
            let result = match existing {
                Some(id) => api::update_employee(id, employee).await.map(|_| "Employee updated successfully"),
                None => api::create_employee(employee).await.map(|_| "Employee created successfully"),
            };
            match result {
                Ok(message) => {
                    close();
                    flash.success(message);
                    reload += 1;
                }
                Err(e) if ui::is_unauthorized(&e) => ui::force_logout(),
                Err(e) => form_error.set(Some(ui::error_message(&e, "Failed to save employee"))),
            }
            busy.set(false);
        });
    };

    let mut delete = move |employee: Employee| {
        spawn(async move {
            busy.set(true);
            match api::delete_employee(employee.id).await {
                Ok(()) => {
                    flash.success(format!("{} was deleted", employee.name));
                    reload += 1;
                }
                Err(e) => flash.server_error(&e, "Failed to delete employee"),
            }
            busy.set(false);
            close();
        });
    };

    let can_create = profile.can(Action::Create, Resource::Employee);
    let can_update = profile.can(Action::Update, Resource::Employee);
    let can_delete = profile.can(Action::Delete, Resource::Employee);
    let lock_company = !profile.can(Action::Update, Resource::CompanyAssignment);
    let own_company = profile.company;
    let page = filters.read().page;

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Employees" }
                    p { class: "page-subtitle", "Employee records and their employment history." }
                }
                if can_create {
                    div { class: "page-header-actions",
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| dialog.set(Some(Dialog::Create)),
                            "Add Employee"
                        }
                    }
                }
            }

            FlashBanner { flash }

            form { class: "search-bar",
                onsubmit: move |e| {
                    e.prevent_default();
                    filters.set(EmployeeFilters { search: search(), ..EmployeeFilters::default() });
                },
                input {
                    class: "form-input",
                    r#type: "search",
                    placeholder: "Search by name, employee ID or email",
                    value: "{search}",
                    oninput: move |e| search.set(e.value()),
                }
                button { r#type: "submit", class: "btn btn-secondary", "Search" }
                if !filters.read().search.is_empty() {
                    button {
                        r#type: "button",
                        class: "btn btn-link",
                        onclick: move |_| {
                            search.set(String::new());
                            filters.set(EmployeeFilters::default());
                        },
                        "Clear"
                    }
                }
            }

            div { class: "card",
                div { class: "table-container",
                    table {
                        thead {
                            tr {
                                th { "Name" }
                                th { "Employee ID" }
                                th { "Email" }
                                th { "Phone" }
                                th { "Company" }
                                th { "Current Role" }
                                th { "" }
                            }
                        }
                        tbody {
                            if loading() {
                                LoadingRow { colspan: COLUMNS }
                            } else if employees.read().is_empty() {
                                EmptyRow { colspan: COLUMNS, noun: "employees" }
                            } else {
                                for employee in employees.read().results.iter().cloned() {
                                    tr { key: "{employee.id}",
                                        td {
                                            "{employee.name}"
                                            if !employee.is_active {
                                                span { class: "status-chip status-chip-neutral", "Inactive" }
                                            }
                                        }
                                        td { "{opt_display(&employee.employee_id)}" }
                                        td { "{opt_display(&employee.email)}" }
                                        td { "{opt_display(&employee.phone)}" }
                                        td { "{opt_display(&employee.company_name)}" }
                                        td { "{opt_display(employee.current_role())}" }
                                        td { class: "row-actions",
                                            button {
                                                class: "btn btn-link",
                                                onclick: {
                                                    let employee = employee.clone();
                                                    move |_| dialog.set(Some(Dialog::History(employee.clone())))
                                                },
                                                "History"
                                            }
                                            if can_update {
                                                button {
                                                    class: "btn btn-link",
                                                    onclick: {
                                                        let employee = employee.clone();
                                                        move |_| dialog.set(Some(Dialog::AddPosition(employee.clone())))
                                                    },
                                                    "Add Position"
                                                }
                                                button {
                                                    class: "btn btn-link",
                                                    onclick: {
                                                        let employee = employee.clone();
                                                        move |_| dialog.set(Some(Dialog::Edit(employee.clone())))
                                                    },
                                                    "Edit"
                                                }
                                            }
                                            if can_delete {
                                                button {
                                                    class: "btn btn-link btn-link-danger",
                                                    onclick: {
                                                        let employee = employee.clone();
                                                        move |_| dialog.set(Some(Dialog::Delete(employee.clone())))
                                                    },
                                                    "Delete"
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
                    has_next: employees.read().next.is_some(),
                    on_change: move |page| filters.write().page = page,
                }
            }

            {match dialog() {
                Some(Dialog::Create) => rsx! {
                    EmployeeFormModal {
                        title: "Add Employee",
                        initial: NewEmployee {
                            company: own_company.filter(|_| lock_company),
                            is_active: true,
                            ..NewEmployee::default()
                        },
                        lock_company,
                        busy: busy(),
                        error: form_error(),
                        on_close: move |_| close(),
                        on_submit: move |employee| save((None, employee)),
                    }
                },
                Some(Dialog::Edit(employee)) => {
                    let id = employee.id;
                    rsx! {
                        EmployeeFormModal {
                            title: format!("Edit {}", employee.name),
                            initial: NewEmployee::from(&employee),
                            lock_company,
                            busy: busy(),
                            error: form_error(),
                            on_close: move |_| close(),
                            on_submit: move |employee| save((Some(id), employee)),
                        }
                    }
                }
                Some(Dialog::Delete(employee)) => {
                    let message = format!(
                        "Delete {}? Their employment history will be removed as well.",
                        employee.name
                    );
                    rsx! {
                        ConfirmModal {
                            title: "Delete Employee",
                            message,
                            busy: busy(),
                            on_close: move |_| close(),
                            on_confirm: move |_| delete(employee.clone()),
                        }
                    }
                }
                Some(Dialog::History(employee)) => rsx! {
                    HistoryModal {
                        employee_id: employee.id,
                        employee_name: employee.name.clone(),
                        on_close: move |_| close(),
                    }
                },
                Some(Dialog::AddPosition(employee)) => rsx! {
                    AddPositionModal {
                        employee,
                        on_close: move |_| close(),
                        on_added: move |_| {
                            close();
                            flash.success("Position added successfully");
                            reload += 1;
                        },
                    }
                },
                None => rsx! {},
            }}
        }
    }
}
