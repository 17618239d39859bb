use crate::use_error;
use dioxus::prelude::*;
use types::bulk::{BulkJob, NewUpload, OperationType, PollPolicy, UploadFile, check_file_name};
use types::{Action, Profile, Resource};
use uuid::Uuid;
use ui::{EmptyRow, FlashBanner, LoadingRow, Modal, StatusChip, format_timestamp};

const COLUMNS: usize = 8;

fn millis(delay: std::time::Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}

#[component]
pub fn BulkUploadPage() -> Element {
    let profile = use_context::<Profile>();
    let mut error_state = use_error();
    let mut flash = ui::use_flash();
    let mut latest = ui::use_latest_request();

    let mut jobs = use_signal(Vec::<BulkJob>::new);
    let mut loading = use_signal(|| true);
    let mut reload = use_signal(|| 0u32);
    let mut uploading = use_signal(|| false);
    let mut expanded = use_signal(|| None::<Uuid>);
    let mut retrying = use_signal(|| None::<Uuid>);

    // Fetch, then keep polling only while some job is still running. A new
    // reload replaces the loop.
    use_effect(move || {
        reload();
        spawn(async move {
            let ticket = latest.issue();
            let policy = PollPolicy::default();
            let mut failures = 0u32;
            loop {
                let result = api::list_bulk_jobs().await;
                if !latest.is_current(ticket) {
                    return;
                }
                match result {
                    Ok(page) => {
                        failures = 0;
                        jobs.set(page.results);
                    }
                    Err(e) if ui::is_unauthorized(&e) => {
                        ui::force_logout();
                        return;
                    }
                    Err(e) => {
                        if failures == 0 {
                            error_state.set_server_error(&e, "Failed to load upload jobs");
                        }
                        failures += 1;
                    }
                }
                loading.set(false);

                let Some(delay) = policy.next_delay(&jobs.peek(), failures) else {
                    return;
                };
                tracing::debug!(?delay, failures, "polling upload jobs");
                ui::sleep(millis(delay)).await;
                if !latest.is_current(ticket) {
                    return;
                }
            }
        });
    });

    let mut retry = move |id: Uuid| {
        spawn(async move {
            retrying.set(Some(id));
            match api::retry_bulk_job(id).await {
                Ok(_) => {
                    flash.success("Job restarted");
                    reload += 1;
                }
                Err(e) => flash.server_error(&e, "Failed to retry job"),
            }
            retrying.set(None);
        });
    };

    let operations: Vec<OperationType> = OperationType::ALL
        .into_iter()
        .filter(|op| profile.can_import(*op))
        .collect();
    let can_upload = !operations.is_empty();
    let choose_company = profile.can(Action::Update, Resource::CompanyAssignment);

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Bulk Upload" }
                    p { class: "page-subtitle", "Import companies, employees and positions from CSV or Excel files." }
                }
                div { class: "page-header-actions",
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| reload += 1,
                        "Refresh"
                    }
                    if can_upload {
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| uploading.set(true),
                            "Upload File"
                        }
                    }
                }
            }

            FlashBanner { flash }

            if can_upload {
                div { class: "card",
                    h2 { class: "card-title", "Templates" }
                    p { class: "text-muted",
                        "Start from a template so the columns match what the importer expects."
                    }
                    div { class: "template-links",
                        for op in operations.iter().copied() {
                            a {
                                key: "{op.as_str()}",
                                class: "btn btn-link",
                                href: "/download/template?type={op.as_str()}",
                                rel: "external",
                                "{op.label()} Template"
                            }
                        }
                    }
                }
            }

            div { class: "card",
                div { class: "table-container",
                    table {
                        thead {
                            tr {
                                th { "File" }
                                th { "Operation" }
                                th { "Status" }
                                th { "Progress" }
                                th { "Imported" }
                                th { "Errors" }
                                th { "Uploaded" }
                                th { "" }
                            }
                        }
                        tbody {
                            if loading() {
                                LoadingRow { colspan: COLUMNS }
                            } else if jobs.read().is_empty() {
                                EmptyRow { colspan: COLUMNS, noun: "bulk upload jobs" }
                            } else {
                                for job in jobs.read().iter().cloned() {
                                    JobRow {
                                        key: "{job.id}",
                                        expanded: expanded() == Some(job.id),
                                        retrying: retrying() == Some(job.id),
                                        on_toggle: move |id: Uuid| {
                                            let next = if expanded() == Some(id) { None } else { Some(id) };
                                            expanded.set(next);
                                        },
                                        on_retry: move |id| retry(id),
                                        job,
                                    }
                                }
                            }
                        }
                    }
                }
            }

            if uploading() {
                UploadModal {
                    operations: operations.clone(),
                    choose_company,
                    on_close: move |_| uploading.set(false),
                    on_uploaded: move |job: BulkJob| {
                        uploading.set(false);
                        flash.success(format!("{} uploaded. Processing has started.", job.file_name));
                        reload += 1;
                    },
                }
            }
        }
    }
}

#[component]
fn JobRow(
    job: BulkJob,
    expanded: bool,
    retrying: bool,
    on_toggle: EventHandler<Uuid>,
    on_retry: EventHandler<Uuid>,
) -> Element {
    let id = job.id;
    let progress = job.progress();
    let (preview, more) = job.error_preview();
    let preview: Vec<String> = preview.iter().map(ToString::to_string).collect();

    rsx! {
        tr {
            td {
                div { "{job.file_name}" }
                if !job.created_by_name.is_empty() {
                    div { class: "text-muted text-sm", "by {job.created_by_name}" }
                }
            }
            td { "{job.operation_type.label()}" }
            td { StatusChip { label: job.status.label(), tone: job.status.tone() } }
            td {
                div { class: "progress",
                    div { class: "progress-bar", style: "width: {progress:.0}%" }
                }
                span { class: "text-sm", "{progress:.0}%" }
            }
            td { "{job.success_records} / {job.total_records}" }
            td {
                if job.error_records > 0 {
                    button {
                        class: "btn btn-link btn-link-danger",
                        onclick: move |_| on_toggle.call(id),
                        "{job.error_records}"
                    }
                } else {
                    "0"
                }
            }
            td { "{format_timestamp(job.created_at)}" }
            td { class: "row-actions",
                if job.can_retry() {
                    button {
                        class: "btn btn-link",
                        disabled: retrying,
                        onclick: move |_| on_retry.call(id),
                        if retrying { "Retrying..." } else { "Retry" }
                    }
                }
            }
        }
        if expanded && !preview.is_empty() {
            tr { class: "error-details",
                td { colspan: "{COLUMNS}",
                    ul {
                        for (i, line) in preview.into_iter().enumerate() {
                            li { key: "{i}", "{line}" }
                        }
                    }
                    if more > 0 {
                        p { class: "text-muted", "... and {more} more errors" }
                    }
                }
            }
        }
    }
}

#[component]
fn UploadModal(
    operations: Vec<OperationType>,
    choose_company: bool,
    on_close: EventHandler<()>,
    on_uploaded: EventHandler<BulkJob>,
) -> Element {
    let first = operations.first().copied().unwrap_or(OperationType::EmployeeImport);
    let mut operation = use_signal(|| first);
    let mut company = use_signal(|| None::<i64>);
    let mut file = use_signal(|| None::<UploadFile>);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let pick = move |e: FormEvent| async move {
        let Some(picked) = e.files().into_iter().next() else {
            file.set(None);
            return;
        };
        let name = picked.name();
        if let Err(message) = check_file_name(&name) {
            file.set(None);
            error.set(Some(message.to_string()));
            return;
        }
        match picked.read_bytes().await {
            Ok(bytes) => {
                error.set(None);
                file.set(Some(UploadFile::new(name, &bytes)));
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read picked file");
                error.set(Some("Could not read the selected file.".into()));
            }
        }
    };

    let submit = move |_: MouseEvent| {
        let Some(upload_file) = file() else {
            error.set(Some(types::bulk::INVALID_FILE_MESSAGE.into()));
            return;
        };
        let upload = NewUpload {
            operation_type: operation(),
            company: company(),
            file: upload_file,
        };
        spawn(async move {
            busy.set(true);
            error.set(None);
            match api::upload_file(upload).await {
                Ok(job) => on_uploaded.call(job),
                Err(e) if ui::is_unauthorized(&e) => ui::force_logout(),
                Err(e) => error.set(Some(ui::error_message(&e, "Upload failed"))),
            }
            busy.set(false);
        });
    };

    rsx! {
        Modal {
            title: "Upload File",
            busy: busy(),
            on_close,
            footer: rsx! {
                button {
                    class: "btn btn-secondary",
                    disabled: busy(),
                    onclick: move |_| on_close.call(()),
                    "Cancel"
                }
                button {
                    class: "btn btn-primary",
                    disabled: busy() || file.read().is_none(),
                    onclick: submit,
                    if busy() { "Uploading..." } else { "Upload" }
                }
            },
            if let Some(message) = error() {
                div { class: "banner banner-error", "{message}" }
            }
            div { class: "form-group",
                label { class: "form-label", r#for: "operation_type", "Operation" }
                select {
                    id: "operation_type",
                    class: "form-input",
                    onchange: move |e| {
                        if let Some(op) = OperationType::parse(&e.value()) {
                            operation.set(op);
                        }
                    },
                    for op in operations.iter().copied() {
                        option {
                            key: "{op.as_str()}",
                            value: op.as_str(),
                            selected: operation() == op,
                            "{op.label()}"
                        }
                    }
                }
            }
            if choose_company && operation() != OperationType::CompanyImport {
                div { class: "form-group",
                    label { class: "form-label", r#for: "upload_company", "Company" }
                    ui::CompanySelect {
                        id: "upload_company",
                        value: company(),
                        placeholder: "Taken from each row",
                        on_change: move |c| company.set(c),
                    }
                }
            }
            div { class: "form-group",
                label { class: "form-label", r#for: "file", "File" }
                input {
                    id: "file",
                    class: "form-input",
                    r#type: "file",
                    accept: ".csv,.xlsx,.xls",
                    onchange: pick,
                }
                if let Some(picked) = file() {
                    p { class: "text-muted text-sm", "Selected: {picked.name}" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn delays_fit_the_timer() {
        assert_eq!(millis(Duration::from_secs(30)), 30_000);
        assert_eq!(millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }
}
