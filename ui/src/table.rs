use dioxus::prelude::*;

/// What an empty table says, e.g. "No companies found".
pub fn nothing_found(noun: &str) -> String {
    format!("No {noun} found")
}

/// The single row a table shows when there is nothing to list.
#[component]
pub fn EmptyRow(colspan: usize, noun: String) -> Element {
    let message = nothing_found(&noun);
    rsx! {
        tr { class: "empty-row",
            td { colspan: "{colspan}", "{message}" }
        }
    }
}

#[component]
pub fn LoadingRow(colspan: usize) -> Element {
    rsx! {
        tr { class: "loading-row",
            td { colspan: "{colspan}", "Loading..." }
        }
    }
}

#[component]
pub fn StatusChip(label: String, tone: String) -> Element {
    rsx! {
        span { class: "status-chip status-chip-{tone}", "{label}" }
    }
}

/// Previous/next controls; pages are numbered from one. Without
/// `total_pages` the backend's `next` link decides whether there is more.
#[component]
pub fn Pagination(
    page: u32,
    #[props(default)] has_next: bool,
    total_pages: Option<u32>,
    on_change: EventHandler<u32>,
) -> Element {
    let has_next = match total_pages {
        Some(total) => page < total,
        None => has_next,
    };
    if page <= 1 && !has_next {
        return rsx! {};
    }

    rsx! {
        div { class: "pagination",
            button {
                class: "btn btn-secondary btn-sm",
                disabled: page <= 1,
                onclick: move |_| on_change.call(page - 1),
                "Previous"
            }
            span { class: "pagination-status",
                if let Some(total) = total_pages {
                    "Page {page} of {total}"
                } else {
                    "Page {page}"
                }
            }
            button {
                class: "btn btn-secondary btn-sm",
                disabled: !has_next,
                onclick: move |_| on_change.call(page + 1),
                "Next"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tables_share_one_wording() {
        assert_eq!(nothing_found("employees"), "No employees found");
        assert_eq!(nothing_found("bulk upload jobs"), "No bulk upload jobs found");
    }
}
