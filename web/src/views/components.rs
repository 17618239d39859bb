use dioxus::prelude::*;
use jiff::Zoned;
use types::employee::{
    Employee, EmployeeHistory, EmploymentType, NewEmployee, NewPosition, format_duration,
};
use ui::{CompanySelect, Modal, format_date, format_money, opt_display};

use super::companies::TextField;

/// `<select>` over employment types, with an optional "any" entry.
#[component]
pub fn EmploymentTypeSelect(
    id: String,
    value: Option<EmploymentType>,
    on_change: EventHandler<Option<EmploymentType>>,
    #[props(default)] any_label: Option<String>,
) -> Element {
    let selected = value.map(|t| t.as_str()).unwrap_or_default();

    rsx! {
        select {
            id,
            class: "form-input",
            value: "{selected}",
            onchange: move |e| on_change.call(EmploymentType::parse(&e.value())),
            if let Some(any_label) = any_label {
                option { value: "", "{any_label}" }
            }
            for kind in EmploymentType::ALL {
                option {
                    key: "{kind.as_str()}",
                    value: kind.as_str(),
                    selected: value == Some(kind),
                    "{kind.label()}"
                }
            }
        }
    }
}

/// Every position an employee has held, newest first.
#[component]
pub fn HistoryModal(employee_id: i64, employee_name: String, on_close: EventHandler<()>) -> Element {
    let mut history = use_signal(|| None::<EmployeeHistory>);
    let mut error = use_signal(|| None::<String>);

    use_effect(move || {
        spawn(async move {
            match api::employee_history(employee_id).await {
                Ok(h) => history.set(Some(h)),
                Err(e) if ui::is_unauthorized(&e) => ui::force_logout(),
                Err(e) => error.set(Some(ui::error_message(&e, "Failed to load employment history"))),
            }
        });
    });

    let today = Zoned::now().date();

    rsx! {
        Modal {
            title: format!("Employment History: {employee_name}"),
            wide: true,
            on_close,
            if let Some(message) = error() {
                div { class: "banner banner-error", "{message}" }
            }
            {match history() {
                None if error.read().is_none() => rsx! {
                    div { class: "loading", "Loading history..." }
                },
                None => rsx! {},
                Some(history) => {
                    let total = history.total_days(today);
                    let distinct = history.distinct_days(today);
                    rsx! {
                        div { class: "history-summary",
                            div {
                                span { class: "form-label", "Company" }
                                div { class: "form-value", "{opt_display(&history.company_name)}" }
                            }
                            div {
                                span { class: "form-label", "Positions" }
                                div { class: "form-value", "{history.positions.len()}" }
                            }
                            div {
                                span { class: "form-label", "Total experience" }
                                div { class: "form-value",
                                    "{format_duration(total)}"
                                    if distinct != total {
                                        span { class: "text-muted",
                                            " ({format_duration(distinct)} excluding overlaps)"
                                        }
                                    }
                                }
                            }
                        }
                        div { class: "table-container",
                            table {
                                thead {
                                    tr {
                                        th { "Role" }
                                        th { "Department" }
                                        th { "Type" }
                                        th { "Start" }
                                        th { "End" }
                                        th { "Duration" }
                                        th { "Salary" }
                                    }
                                }
                                tbody {
                                    if history.positions.is_empty() {
                                        ui::EmptyRow { colspan: 7usize, noun: "positions" }
                                    }
                                    for position in history.timeline() {
                                        tr { key: "{position.id}",
                                            class: if position.is_current { "current" },
                                            td {
                                                "{position.role}"
                                                if position.is_current {
                                                    span { class: "status-chip status-chip-success", "Current" }
                                                }
                                            }
                                            td { "{opt_display(position.department_name())}" }
                                            td { "{position.employment_type.label()}" }
                                            td { "{format_date(Some(position.start_date))}" }
                                            td {
                                                if position.end_date.is_some() {
                                                    "{format_date(position.end_date)}"
                                                } else {
                                                    "Present"
                                                }
                                            }
                                            td { "{format_duration(position.days(today))}" }
                                            td { "{format_money(position.salary)}" }
                                        }
                                        if !position.duties.is_empty() {
                                            tr { key: "{position.id}-duties", class: "duties-row",
                                                td { colspan: "7", "{position.duties}" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }}
        }
    }
}

/// Record a new position. The backend ends the current one.
/// The backend ends the current position on the new start date.
fn closing_warning(current_role: &str) -> String {
    format!(
        "The current position ({current_role}) will be closed with an end date \
         equal to the new position's start date."
    )
}

#[component]
pub fn AddPositionModal(employee: Employee, on_close: EventHandler<()>, on_added: EventHandler<()>) -> Element {
    let mut form = use_signal(NewPosition::default);
    let mut error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);

    let employee_id = employee.id;
    let current_role = employee.current_role().to_string();

    let submit = move |_: MouseEvent| {
        let position = form.read().clone();
        let missing = position.missing_fields();
        if !missing.is_empty() {
            error.set(Some(format!("Please fill in: {}", missing.join(", "))));
            return;
        }
        if !position.salary_is_valid() {
            error.set(Some("Salary must be a number".into()));
            return;
        }

        spawn(async move {
            saving.set(true);
            error.set(None);
            match api::add_position(employee_id, position).await {
                Ok(_) => on_added.call(()),
                Err(e) if ui::is_unauthorized(&e) => ui::force_logout(),
                Err(e) => error.set(Some(ui::error_message(&e, "Failed to add position"))),
            }
            saving.set(false);
        });
    };

    let start_date = form.read().start_date.map(|d| d.to_string()).unwrap_or_default();
    let salary = form.read().salary.clone().unwrap_or_default();

    rsx! {
        Modal {
            title: format!("Add Position: {}", employee.name),
            busy: saving(),
            on_close,
            footer: rsx! {
                button {
                    class: "btn btn-secondary",
                    disabled: saving(),
                    onclick: move |_| on_close.call(()),
                    "Cancel"
                }
                button {
                    class: "btn btn-primary",
                    disabled: saving(),
                    onclick: submit,
                    if saving() { "Saving..." } else { "Add Position" }
                }
            },
            if !current_role.is_empty() {
                div { class: "banner banner-warning",
                    "{closing_warning(&current_role)}"
                }
            }
            if let Some(message) = error() {
                div { class: "banner banner-error", "{message}" }
            }
            div { class: "form-row",
                TextField { id: "role", label: "Role *", value: form.read().role.clone(),
                    on_input: move |v| form.write().role = v }
                TextField { id: "department_name", label: "Department *",
                    value: form.read().department_name.clone(),
                    on_input: move |v| form.write().department_name = v }
            }
            div { class: "form-row",
                div { class: "form-group",
                    label { class: "form-label", r#for: "employment_type", "Employment Type" }
                    EmploymentTypeSelect {
                        id: "employment_type",
                        value: Some(form.read().employment_type),
                        on_change: move |kind: Option<EmploymentType>| {
                            if let Some(kind) = kind {
                                form.write().employment_type = kind;
                            }
                        },
                    }
                }
                TextField { id: "start_date", label: "Start Date *", input_type: "date",
                    value: start_date,
                    on_input: move |v: String| form.write().start_date = v.parse().ok() }
            }
            TextField { id: "salary", label: "Salary", input_type: "number",
                value: salary,
                on_input: move |v: String| form.write().salary = Some(v) }
            div { class: "form-group",
                label { class: "form-label", r#for: "duties", "Duties" }
                textarea {
                    id: "duties",
                    class: "form-input",
                    rows: "3",
                    value: "{form.read().duties}",
                    oninput: move |e| form.write().duties = e.value(),
                }
            }
        }
    }
}

/// Create or edit an employee's basic details.
#[component]
pub fn EmployeeFormModal(
    title: String,
    initial: NewEmployee,
    /// Company admins and users can only add to their own company.
    #[props(default)] lock_company: bool,
    busy: bool,
    error: Option<String>,
    on_close: EventHandler<()>,
    on_submit: EventHandler<NewEmployee>,
) -> Element {
    let mut form = use_signal(|| initial.clone());
    let mut local_error = use_signal(|| None::<String>);

    let submit = move |_: MouseEvent| {
        let employee = form.read().clone();
        let missing = employee.missing_fields();
        if !missing.is_empty() {
            local_error.set(Some(format!("Please fill in: {}", missing.join(", "))));
            return;
        }
        local_error.set(None);
        on_submit.call(employee);
    };

    let shown_error = local_error().or(error);

    rsx! {
        Modal {
            title,
            busy,
            on_close,
            footer: rsx! {
                button {
                    class: "btn btn-secondary",
                    disabled: busy,
                    onclick: move |_| on_close.call(()),
                    "Cancel"
                }
                button {
                    class: "btn btn-primary",
                    disabled: busy,
                    onclick: submit,
                    if busy { "Saving..." } else { "Save" }
                }
            },
            if let Some(message) = shown_error {
                div { class: "banner banner-error", "{message}" }
            }
            div { class: "form-row",
                TextField { id: "name", label: "Full Name *", value: form.read().name.clone(),
                    on_input: move |v| form.write().name = v }
                TextField { id: "employee_id", label: "Employee ID",
                    value: form.read().employee_id.clone(),
                    on_input: move |v| form.write().employee_id = v }
            }
            div { class: "form-row",
                TextField { id: "email", label: "Email", input_type: "email",
                    value: form.read().email.clone(),
                    on_input: move |v| form.write().email = v }
                TextField { id: "phone", label: "Phone", input_type: "tel",
                    value: form.read().phone.clone(),
                    on_input: move |v| form.write().phone = v }
            }
            if !lock_company {
                div { class: "form-group",
                    label { class: "form-label", r#for: "company", "Company *" }
                    CompanySelect {
                        id: "company",
                        value: form.read().company,
                        placeholder: "Select a company",
                        on_change: move |company| form.write().company = company,
                    }
                }
            }
            label { class: "checkbox-label",
                input {
                    r#type: "checkbox",
                    checked: form.read().is_active,
                    onchange: move |e| form.write().is_active = e.checked(),
                }
                span { "Active" }
            }
        }
    }
}
