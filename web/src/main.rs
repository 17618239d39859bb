use dioxus::prelude::*;
use types::{Action, Profile, Resource};

mod views;

use views::{
    AcceptInvitation, AuditPage, BulkUploadPage, CompaniesPage, Dashboard, EmployeesPage, Login,
    SearchPage, UsersPage,
};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/login?:error&:notice")]
    Login { error: Option<String>, notice: Option<String> },
    #[route("/accept-invitation/:token")]
    AcceptInvitation { token: String },
    #[redirect("/", || Route::Dashboard {})]
    #[layout(AuthenticatedLayout)]
        #[route("/dashboard")]
        Dashboard {},
        #[route("/companies")]
        Companies {},
        #[route("/employees")]
        Employees {},
        #[route("/search")]
        Search {},
        #[route("/bulk-upload")]
        BulkUpload {},
        #[route("/audit")]
        Audit {},
        #[route("/users")]
        Users {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

#[component]
fn Companies() -> Element {
    rsx! {
        Guarded { action: Action::Manage, resource: Resource::Company, CompaniesPage {} }
    }
}

#[component]
fn Employees() -> Element {
    rsx! {
        Guarded { action: Action::View, resource: Resource::Employee, EmployeesPage {} }
    }
}

#[component]
fn Search() -> Element {
    rsx! {
        Guarded { action: Action::View, resource: Resource::Employee, SearchPage {} }
    }
}

#[component]
fn BulkUpload() -> Element {
    rsx! {
        Guarded { action: Action::View, resource: Resource::BulkJob, BulkUploadPage {} }
    }
}

#[component]
fn Audit() -> Element {
    rsx! {
        Guarded { action: Action::View, resource: Resource::AuditLog, AuditPage {} }
    }
}

#[component]
fn Users() -> Element {
    rsx! {
        Guarded { action: Action::Manage, resource: Resource::User, UsersPage {} }
    }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "login-page",
            div { class: "login-card",
                h1 { class: "login-title", "Page not found" }
                p { class: "text-muted", "Nothing lives at /{path}." }
                Link { to: Route::Dashboard {}, class: "btn btn-primary", "Back to the dashboard" }
            }
        }
    }
}

fn main() {
    #[cfg(feature = "server")]
    {
        server::init_tracing();
        dioxus::serve(|| async move {
            let routes = server::init().await?;

            Ok(dioxus::server::router(App).merge(routes))
        });
    }

    #[cfg(all(feature = "web", not(feature = "server")))]
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Title { "Talent Verify" }
        document::Link { rel: "icon", href: asset!("/assets/favicon.svg") }
        document::Link { rel: "stylesheet", href: asset!("/assets/main.css") }

        Router::<Route> {}
    }
}

#[component]
fn NavLink(to: Route, children: Element) -> Element {
    let current_route: Route = use_route();
    let is_active = std::mem::discriminant(&current_route) == std::mem::discriminant(&to);

    rsx! {
        Link {
            to,
            class: if is_active { "active" },
            {children}
        }
    }
}

/// Renders `children` only for users allowed `action` on `resource`.
#[component]
fn Guarded(action: Action, resource: Resource, children: Element) -> Element {
    let profile = use_context::<Profile>();

    if profile.can(action, resource) {
        return children;
    }

    rsx! {
        div { class: "card access-denied",
            h2 { class: "card-title", "Access denied" }
            p { class: "text-muted", "You don't have permission to view this page." }
            Link { to: Route::Dashboard {}, "Back to the dashboard" }
        }
    }
}

/// Structured error information for display
#[derive(Clone, Debug, Default)]
pub struct ErrorInfo {
    pub message: String,
    pub chain: Vec<String>,
    pub backtrace: Option<String>,
}

impl ErrorInfo {
    /// Parse a ServerFnError to extract structured error info
    pub fn from_server_error(err: &ServerFnError, fallback: &str) -> Self {
        let message = ui::error_message(err, fallback);
        match err {
            ServerFnError::ServerError {
                details: Some(details),
                ..
            } => {
                let chain = details
                    .get("chain")
                    .and_then(|c| c.as_array())
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect()
                    })
                    .unwrap_or_default();
                let backtrace = details
                    .get("backtrace")
                    .and_then(|b| b.as_str())
                    .map(String::from);
                Self {
                    message,
                    chain,
                    backtrace,
                }
            }
            other => Self {
                message,
                chain: vec![other.to_string()],
                backtrace: None,
            },
        }
    }
}

/// Page-level load failures - use `use_error()` to access
#[derive(Clone, Copy)]
pub struct ErrorState(Signal<Option<ErrorInfo>>);

impl ErrorState {
    /// Report a failed load. A 401 ends the session instead.
    pub fn set_server_error(&mut self, err: &ServerFnError, fallback: &str) {
        if ui::is_unauthorized(err) {
            ui::force_logout();
            return;
        }
        tracing::warn!(error = %err, "request failed");
        self.0.set(Some(ErrorInfo::from_server_error(err, fallback)));
    }

    pub fn clear(&mut self) {
        self.0.set(None);
    }
}

/// Get the global error state for setting/clearing errors
pub fn use_error() -> ErrorState {
    use_context::<ErrorState>()
}

/// Filter backtrace to only show lines from this workspace
fn filter_backtrace(backtrace: &str) -> String {
    const CRATES: [&str; 4] = ["server::", "api::", "types::", "web::"];

    backtrace
        .lines()
        .filter(|line| CRATES.iter().any(|krate| line.contains(krate)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[component]
fn ErrorBanner() -> Element {
    let mut error_state = use_context::<ErrorState>();
    let error = error_state.0.read();

    let Some(err) = error.as_ref() else {
        return rsx! {};
    };

    let has_chain = err.chain.len() > 1;
    let filtered_backtrace = err.backtrace.as_deref().map(filter_backtrace);
    let has_backtrace = filtered_backtrace
        .as_ref()
        .is_some_and(|bt| !bt.is_empty());

    rsx! {
        div { class: "error-banner",
            div { class: "error-banner-content",
                div { class: "error-banner-header",
                    span { class: "error-banner-message", "{err.message}" }
                    div { class: "error-banner-actions",
                        button {
                            class: "error-banner-close",
                            onclick: move |_| error_state.clear(),
                            "×"
                        }
                    }
                }
                if has_chain || has_backtrace {
                    details { class: "error-details",
                        summary { "Details" }
                        if has_chain {
                            ol { class: "error-chain-list",
                                for (i, msg) in err.chain.iter().enumerate() {
                                    li { key: "{i}", class: "error-chain-item", "{msg}" }
                                }
                            }
                        }
                        if let Some(backtrace) = filtered_backtrace.filter(|bt| !bt.is_empty()) {
                            pre { class: "error-backtrace-content", "{backtrace}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn AuthenticatedLayout() -> Element {
    let mut user = use_server_future(api::get_current_user)?;

    match &*user.read() {
        Some(Ok(Some(profile))) => rsx! {
            Shell { profile: profile.clone() }
        },
        Some(Ok(None)) => {
            navigator().push(Route::Login {
                error: None,
                notice: None,
            });
            rsx! {
                div { class: "loading", "Redirecting to login..." }
            }
        }
        Some(Err(e)) if ui::is_unauthorized(e) => {
            ui::force_logout();
            rsx! {
                div { class: "loading", "Redirecting to login..." }
            }
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "failed to load profile");
            let message = ui::error_message(e, "Failed to load your profile");
            rsx! {
                div { class: "loading",
                    div { class: "error-banner",
                        div { class: "error-banner-message", "{message}" }
                        div { class: "error-banner-actions",
                            button {
                                class: "btn btn-secondary btn-sm",
                                onclick: move |_| user.restart(),
                                "Retry"
                            }
                        }
                    }
                }
            }
        }
        None => rsx! {
            div { class: "loading", "Loading..." }
        },
    }
}

/// The signed-in frame: sidebar, banners and the routed page.
#[component]
fn Shell(profile: Profile) -> Element {
    use_context_provider(|| profile.clone());
    use_context_provider(|| ErrorState(Signal::new(None)));

    let role = profile.role();
    let initial = profile.initial();
    let name = profile.display_name();

    rsx! {
        div { class: "app-layout",
            aside { class: "sidebar",
                div { class: "sidebar-header",
                    span { class: "sidebar-logo", "Talent Verify" }
                }
                nav { class: "sidebar-nav",
                    NavLink { to: Route::Dashboard {}, "Dashboard" }
                    if profile.can(Action::Manage, Resource::Company) {
                        NavLink { to: Route::Companies {}, "Companies" }
                    }
                    NavLink { to: Route::Employees {}, "Employees" }
                    NavLink { to: Route::Search {}, "Advanced Search" }
                    NavLink { to: Route::BulkUpload {}, "Bulk Upload" }
                    if profile.can(Action::View, Resource::AuditLog) {
                        NavLink { to: Route::Audit {}, "Audit Logs" }
                    }
                    if profile.can(Action::Manage, Resource::User) {
                        NavLink { to: Route::Users {}, "Users" }
                    }
                }
                div { class: "sidebar-footer",
                    div { class: "sidebar-user",
                        div { class: "sidebar-avatar", "{initial}" }
                        div { class: "sidebar-user-info",
                            div { class: "sidebar-user-name", "{name}" }
                            div { class: "sidebar-user-role", "{role.label()}" }
                            if !profile.company_name.is_empty() {
                                div { class: "sidebar-user-company", "{profile.company_name}" }
                            }
                        }
                    }
                    a { href: "/auth/logout", rel: "external", class: "sidebar-logout", "Sign out" }
                }
            }
            main { class: "main-content",
                ErrorBanner {}
                Outlet::<Route> {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtrace_keeps_workspace_frames() {
        let backtrace = "\
   0: std::backtrace::Backtrace::create
   1: server::client::TalentClient::get
   2: tokio::runtime::task::raw::poll
   3: api::list_companies";
        assert_eq!(
            filter_backtrace(backtrace),
            "   1: server::client::TalentClient::get\n   3: api::list_companies"
        );
    }

    #[test]
    fn routes_render_to_their_paths() {
        assert_eq!(Route::Dashboard {}.to_string(), "/dashboard");
        assert_eq!(Route::BulkUpload {}.to_string(), "/bulk-upload");
        assert_eq!(
            Route::AcceptInvitation {
                token: "abc".into()
            }
            .to_string(),
            "/accept-invitation/abc"
        );
    }
}
