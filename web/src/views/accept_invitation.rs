use dioxus::prelude::*;
use types::LoginNotice;
use types::user::AcceptInvitation as AcceptForm;

use crate::Route;

#[component]
pub fn AcceptInvitation(token: String) -> Element {
    let mut form = use_signal(|| AcceptForm {
        token: token.clone(),
        ..Default::default()
    });
    let mut error = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    let submit = move |e: FormEvent| {
        e.prevent_default();
        let current = form.read().clone();
        if let Err(message) = current.validate() {
            error.set(Some(message));
            return;
        }

        spawn(async move {
            submitting.set(true);
            error.set(None);
            match api::accept_invitation(current).await {
                Ok(()) => {
                    let notice = LoginNotice::InvitationAccepted;
                    navigator().push(Route::Login {
                        error: None,
                        notice: Some(notice.code().to_string()),
                    });
                }
                Err(e) => error.set(Some(ui::error_message(
                    &e,
                    "Failed to accept invitation. The link may have expired.",
                ))),
            }
            submitting.set(false);
        });
    };

    rsx! {
        div { class: "login-page",
            div { class: "login-card",
                div { class: "login-header",
                    h1 { class: "login-title", "Accept Invitation" }
                    p { class: "login-subtitle", "Set up your Talent Verify account" }
                }
                if let Some(message) = error() {
                    div { class: "banner banner-error", "{message}" }
                }
                form { onsubmit: submit,
                    div { class: "form-row",
                        div { class: "form-group",
                            label { class: "form-label", r#for: "first_name", "First Name *" }
                            input {
                                id: "first_name",
                                class: "form-input",
                                value: "{form.read().first_name}",
                                oninput: move |e| form.write().first_name = e.value(),
                            }
                        }
                        div { class: "form-group",
                            label { class: "form-label", r#for: "last_name", "Last Name *" }
                            input {
                                id: "last_name",
                                class: "form-input",
                                value: "{form.read().last_name}",
                                oninput: move |e| form.write().last_name = e.value(),
                            }
                        }
                    }
                    div { class: "form-group",
                        label { class: "form-label", r#for: "phone", "Phone" }
                        input {
                            id: "phone",
                            class: "form-input",
                            r#type: "tel",
                            value: "{form.read().phone}",
                            oninput: move |e| form.write().phone = e.value(),
                        }
                    }
                    div { class: "form-group",
                        label { class: "form-label", r#for: "password", "Password *" }
                        input {
                            id: "password",
                            class: "form-input",
                            r#type: "password",
                            autocomplete: "new-password",
                            value: "{form.read().password}",
                            oninput: move |e| form.write().password = e.value(),
                        }
                    }
                    div { class: "form-group",
                        label { class: "form-label", r#for: "password_confirm", "Confirm Password *" }
                        input {
                            id: "password_confirm",
                            class: "form-input",
                            r#type: "password",
                            autocomplete: "new-password",
                            value: "{form.read().password_confirm}",
                            oninput: move |e| form.write().password_confirm = e.value(),
                        }
                    }
                    button {
                        r#type: "submit",
                        class: "btn btn-primary login-btn",
                        disabled: submitting(),
                        if submitting() { "Creating account..." } else { "Create Account" }
                    }
                }
                p { class: "login-footer",
                    "Already have an account? "
                    Link { to: Route::Login { error: None, notice: None }, "Sign in" }
                }
            }
        }
    }
}
