use dioxus::prelude::*;

/// A dialog over a dimmed page. Clicking outside closes it unless `busy`.
#[component]
pub fn Modal(
    title: String,
    on_close: EventHandler<()>,
    #[props(default)] busy: bool,
    #[props(default)] wide: bool,
    children: Element,
    footer: Option<Element>,
) -> Element {
    rsx! {
        div { class: "modal-overlay",
            onclick: move |_| if !busy { on_close.call(()) },
            div { class: if wide { "modal modal-lg" } else { "modal" },
                onclick: move |e| e.stop_propagation(),
                div { class: "modal-header",
                    h2 { class: "modal-title", "{title}" }
                    if !busy {
                        button {
                            class: "modal-close",
                            onclick: move |_| on_close.call(()),
                            "×"
                        }
                    }
                }
                div { class: "modal-body", {children} }
                if let Some(footer) = footer {
                    div { class: "modal-footer", {footer} }
                }
            }
        }
    }
}

#[component]
pub fn ConfirmModal(
    title: String,
    message: String,
    #[props(default = "Delete".to_string())] confirm_label: String,
    busy: bool,
    on_close: EventHandler<()>,
    on_confirm: EventHandler<()>,
) -> Element {
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
                    class: "btn btn-danger",
                    disabled: busy,
                    onclick: move |_| on_confirm.call(()),
                    if busy { "Working..." } else { "{confirm_label}" }
                }
            },
            p { "{message}" }
            p { class: "text-muted", "This action cannot be undone." }
        }
    }
}
