use dioxus::prelude::*;
use types::LoginNotice;

/// Turn a query code into its message. Codes we don't know fall back to
/// `unknown`, never to the raw query text.
fn banner_text(code: Option<String>, unknown: Option<LoginNotice>) -> Option<&'static str> {
    let code = code.filter(|c| !c.trim().is_empty())?;
    LoginNotice::from_code(code.trim())
        .or(unknown)
        .map(LoginNotice::message)
}

#[component]
pub fn Login(error: Option<String>, notice: Option<String>) -> Element {
    let error = banner_text(error, Some(LoginNotice::LoginFailed));
    let notice = banner_text(notice, None);

    rsx! {
        div { class: "login-page",
            div { class: "login-card",
                div { class: "login-header",
                    h1 { class: "login-title", "Talent Verify" }
                    p { class: "login-subtitle", "Sign in to your account" }
                }
                if let Some(notice) = notice {
                    div { class: "banner banner-success", "{notice}" }
                }
                if let Some(error) = error {
                    div { class: "banner banner-error", "{error}" }
                }
                form {
                    action: "/auth/login",
                    method: "post",
                    div { class: "form-group",
                        label { class: "form-label", r#for: "username", "Username" }
                        input {
                            id: "username",
                            name: "username",
                            class: "form-input",
                            r#type: "text",
                            autocomplete: "username",
                            required: true,
                            autofocus: true,
                        }
                    }
                    div { class: "form-group",
                        label { class: "form-label", r#for: "password", "Password" }
                        input {
                            id: "password",
                            name: "password",
                            class: "form-input",
                            r#type: "password",
                            autocomplete: "current-password",
                            required: true,
                        }
                    }
                    button {
                        r#type: "submit",
                        class: "btn btn-primary login-btn",
                        "Sign in"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_become_messages() {
        let failed = Some(LoginNotice::LoginFailed);
        assert_eq!(
            banner_text(Some("invalid_credentials".into()), failed),
            Some("Invalid username or password")
        );
        assert_eq!(
            banner_text(Some("invitation_accepted".into()), None),
            Some("Account created successfully! You can now sign in.")
        );
        assert_eq!(banner_text(Some(String::new()), failed), None);
        assert_eq!(banner_text(None, failed), None);
    }

    #[test]
    fn unknown_codes_never_echo_the_query() {
        let crafted = Some("Call 555-0100 to verify your account".to_string());
        assert_eq!(
            banner_text(crafted.clone(), Some(LoginNotice::LoginFailed)),
            Some("Login failed. Please try again.")
        );
        assert_eq!(banner_text(crafted, None), None);
    }
}
