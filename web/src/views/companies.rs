use crate::use_error;
use dioxus::prelude::*;
use types::Page;
use types::company::{Company, CompanyQuery, NewCompany};
use ui::{ConfirmModal, EmptyRow, FlashBanner, LoadingRow, Modal, Pagination, opt_display};

const COLUMNS: usize = 7;

#[derive(Clone, PartialEq)]
enum Dialog {
    Create,
    Edit(Company),
    Delete(Company),
}

#[component]
pub fn CompaniesPage() -> Element {
    let mut error_state = use_error();
    let mut flash = ui::use_flash();
    let mut latest = ui::use_latest_request();

    let mut query = use_signal(CompanyQuery::default);
    let mut search = use_signal(String::new);
    let mut companies = use_signal(Page::<Company>::default);
    let mut loading = use_signal(|| true);
    let mut reload = use_signal(|| 0u32);
    let mut dialog = use_signal(|| None::<Dialog>);
    let mut busy = use_signal(|| false);
    let mut form_error = use_signal(|| None::<String>);

    use_effect(move || {
        let query = query();
        reload();
        spawn(async move {
            let ticket = latest.issue();
            loading.set(true);
            let result = api::list_companies(query).await;
            if !latest.is_current(ticket) {
                return;
            }
            match result {
                Ok(page) => companies.set(page),
                Err(e) => error_state.set_server_error(&e, "Failed to load companies"),
            }
            loading.set(false);
        });
    });

    let mut close = move || {
        dialog.set(None);
        form_error.set(None);
    };

    let mut save = move |(existing, company): (Option<i64>, NewCompany)| {
        let missing = company.missing_fields();
        if !missing.is_empty() {
            form_error.set(Some(format!("Please fill in: {}", missing.join(", "))));
            return;
        }

        spawn(async move {
            busy.set(true);
            let result = match existing {
                Some(id) => api::update_company(id, company).await.map(|_| "Company updated successfully"),
                None => api::create_company(company).await.map(|_| "Company created successfully"),
            };
            match result {
                Ok(message) => {
                    close();
                    flash.success(message);
                    reload += 1;
                }
                Err(e) => {
                    if ui::is_unauthorized(&e) {
                        ui::force_logout();
                    } else {
                        form_error.set(Some(ui::error_message(&e, "Failed to save company")));
                    }
                }
            }
            busy.set(false);
        });
    };

    let mut delete = move |company: Company| {
        spawn(async move {
            busy.set(true);
            match api::delete_company(company.id).await {
                Ok(()) => {
                    flash.success(format!("{} was deleted", company.name));
                    reload += 1;
                }
                Err(e) => flash.server_error(&e, "Failed to delete company"),
            }
            busy.set(false);
            close();
        });
    };

    let page = query.read().page.unwrap_or(1);

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Companies" }
                    p { class: "page-subtitle", "Companies registered with Talent Verify." }
                }
                div { class: "page-header-actions",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| dialog.set(Some(Dialog::Create)),
                        "Add Company"
                    }
                }
            }

            FlashBanner { flash }

            form { class: "search-bar",
                onsubmit: move |e| {
                    e.prevent_default();
                    query.set(CompanyQuery { search: search(), page: None });
                },
                input {
                    class: "form-input",
                    r#type: "search",
                    placeholder: "Search by name or registration number",
                    value: "{search}",
                    oninput: move |e| search.set(e.value()),
                }
                button { r#type: "submit", class: "btn btn-secondary", "Search" }
            }

            div { class: "card",
                div { class: "table-container",
                    table {
                        thead {
                            tr {
                                th { "Name" }
                                th { "Registration #" }
                                th { "Contact Person" }
                                th { "Email" }
                                th { "Phone" }
                                th { "Employees" }
                                th { "" }
                            }
                        }
                        tbody {
                            if loading() {
                                LoadingRow { colspan: COLUMNS }
                            } else if companies.read().is_empty() {
                                EmptyRow { colspan: COLUMNS, noun: "companies" }
                            } else {
                                for company in companies.read().results.iter().cloned() {
                                    tr { key: "{company.id}",
                                        td { "{company.name}" }
                                        td { "{opt_display(&company.registration_number)}" }
                                        td { "{opt_display(&company.contact_person)}" }
                                        td { "{opt_display(&company.email)}" }
                                        td { "{opt_display(&company.phone)}" }
                                        td { {company.employee_count.map(|n| n.to_string()).unwrap_or_else(|| "-".into())} }
                                        td { class: "row-actions",
                                            button {
                                                class: "btn btn-link",
                                                onclick: {
                                                    let company = company.clone();
                                                    move |_| dialog.set(Some(Dialog::Edit(company.clone())))
                                                },
                                                "Edit"
                                            }
                                            button {
                                                class: "btn btn-link btn-link-danger",
                                                onclick: {
                                                    let company = company.clone();
                                                    move |_| dialog.set(Some(Dialog::Delete(company.clone())))
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
                Pagination {
                    page,
                    has_next: companies.read().next.is_some(),
                    on_change: move |page| query.write().page = Some(page),
                }
            }

            {match dialog() {
                Some(Dialog::Create) => rsx! {
                    CompanyFormModal {
                        title: "Add Company",
                        initial: NewCompany::default(),
                        busy: busy(),
                        error: form_error(),
                        on_close: move |_| close(),
                        on_submit: move |company| save((None, company)),
                    }
                },
                Some(Dialog::Edit(company)) => {
                    let id = company.id;
                    rsx! {
                        CompanyFormModal {
                            title: "Edit Company",
                            initial: NewCompany::from(&company),
                            busy: busy(),
                            error: form_error(),
                            on_close: move |_| close(),
                            on_submit: move |form| save((Some(id), form)),
                        }
                    }
                }
                Some(Dialog::Delete(company)) => {
                    let message = format!("Are you sure you want to delete {}?", company.name);
                    rsx! {
                        ConfirmModal {
                            title: "Delete Company",
                            message,
                            busy: busy(),
                            on_close: move |_| close(),
                            on_confirm: move |_| delete(company.clone()),
                        }
                    }
                }
                None => rsx! {},
            }}
        }
    }
}

#[component]
fn CompanyFormModal(
    title: String,
    initial: NewCompany,
    busy: bool,
    error: Option<String>,
    on_close: EventHandler<()>,
    on_submit: EventHandler<NewCompany>,
) -> Element {
    let mut form = use_signal(|| initial.clone());
    let mut employee_count = use_signal(|| {
        initial
            .employee_count
            .map(|n| n.to_string())
            .unwrap_or_default()
    });
    let mut local_error = use_signal(|| None::<String>);

    let submit = move |_: MouseEvent| {
        let mut company = form.read().clone();
        company.employee_count = match employee_count.read().trim() {
            "" => None,
            count => match count.parse() {
                Ok(count) => Some(count),
                Err(_) => {
                    local_error.set(Some("Employee count must be a whole number".into()));
                    return;
                }
            },
        };
        local_error.set(None);
        on_submit.call(company);
    };

    let registration_date = form
        .read()
        .registration_date
        .map(|d| d.to_string())
        .unwrap_or_default();
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
                TextField { id: "name", label: "Company Name *", value: form.read().name.clone(),
                    on_input: move |v| form.write().name = v }
                TextField { id: "registration_number", label: "Registration Number *",
                    value: form.read().registration_number.clone(),
                    on_input: move |v| form.write().registration_number = v }
            }
            div { class: "form-row",
                TextField { id: "contact_person", label: "Contact Person",
                    value: form.read().contact_person.clone(),
                    on_input: move |v| form.write().contact_person = v }
                TextField { id: "email", label: "Email", input_type: "email",
                    value: form.read().email.clone(),
                    on_input: move |v| form.write().email = v }
            }
            div { class: "form-row",
                TextField { id: "phone", label: "Phone", input_type: "tel",
                    value: form.read().phone.clone(),
                    on_input: move |v| form.write().phone = v }
                TextField { id: "employee_count", label: "Employee Count", input_type: "number",
                    value: employee_count(),
                    on_input: move |v| employee_count.set(v) }
            }
            div { class: "form-row",
                TextField { id: "registration_date", label: "Registration Date", input_type: "date",
                    value: registration_date,
                    on_input: move |v: String| form.write().registration_date = v.parse().ok() }
            }
            div { class: "form-group",
                label { class: "form-label", r#for: "address", "Address" }
                textarea {
                    id: "address",
                    class: "form-input",
                    rows: "3",
                    value: "{form.read().address}",
                    oninput: move |e| form.write().address = e.value(),
                }
            }
        }
    }
}

/// A labelled single-line input.
#[component]
pub(super) fn TextField(
    id: String,
    label: String,
    value: String,
    on_input: EventHandler<String>,
    #[props(default = "text".to_string())] input_type: String,
    #[props(default)] placeholder: String,
) -> Element {
    rsx! {
        div { class: "form-group",
            label { class: "form-label", r#for: "{id}", "{label}" }
            input {
                id: "{id}",
                class: "form-input",
                r#type: "{input_type}",
                placeholder: "{placeholder}",
                value: "{value}",
                oninput: move |e| on_input.call(e.value()),
            }
        }
    }
}
