use crate::{Route, use_error};
use dioxus::prelude::*;
use types::employee::{EmployeeAnalytics, EmploymentType};
use types::{Action, Profile, Resource};

#[component]
pub fn Dashboard() -> Element {
    let profile = use_context::<Profile>();
    let mut error_state = use_error();
    let mut analytics = use_signal(|| None::<EmployeeAnalytics>);

    use_effect(move || {
        spawn(async move {
            match api::employee_analytics().await {
                Ok(a) => analytics.set(Some(a)),
                Err(e) => error_state.set_server_error(&e, "Failed to load employee analytics"),
            }
        });
    });

    let name = profile.display_name();

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Dashboard" }
                    p { class: "page-subtitle", "Welcome back, {name}." }
                }
            }

            div { class: "dashboard-grid",
                if profile.can(Action::Manage, Resource::Company) {
                    DashboardCard {
                        to: Route::Companies {},
                        title: "Companies",
                        description: "Register companies and keep their details current.",
                    }
                }
                DashboardCard {
                    to: Route::Employees {},
                    title: "Employees",
                    description: "Add employees, record new positions and review their history.",
                }
                DashboardCard {
                    to: Route::Search {},
                    title: "Advanced Search",
                    description: "Filter employees by company, role, tenure and more, then export.",
                }
                DashboardCard {
                    to: Route::BulkUpload {},
                    title: "Bulk Upload",
                    description: "Import companies or employees from CSV and Excel files.",
                }
                if profile.can(Action::View, Resource::AuditLog) {
                    DashboardCard {
                        to: Route::Audit {},
                        title: "Audit Logs",
                        description: "See who changed what, and follow up on security events.",
                    }
                }
                if profile.can(Action::Manage, Resource::User) {
                    DashboardCard {
                        to: Route::Users {},
                        title: "User Management",
                        description: "Create accounts and invite people to your company.",
                    }
                }
            }

            if let Some(analytics) = analytics() {
                AnalyticsSummary { analytics }
            }
        }
    }
}

#[component]
fn DashboardCard(to: Route, title: String, description: String) -> Element {
    rsx! {
        Link { to, class: "dashboard-card",
            h3 { class: "dashboard-card-title", "{title}" }
            p { class: "dashboard-card-desc", "{description}" }
        }
    }
}

#[component]
fn AnalyticsSummary(analytics: EmployeeAnalytics) -> Element {
    let inactive = analytics
        .total_employees
        .saturating_sub(analytics.active_employees);

    rsx! {
        div { class: "stats-grid",
            div { class: "stat-card",
                div { class: "stat-value", "{analytics.total_employees}" }
                div { class: "stat-label", "Total employees" }
            }
            div { class: "stat-card",
                div { class: "stat-value", "{analytics.active_employees}" }
                div { class: "stat-label", "Active" }
            }
            div { class: "stat-card",
                div { class: "stat-value", "{inactive}" }
                div { class: "stat-label", "Inactive" }
            }
        }

        div { class: "grid grid-cols-2",
            div { class: "card",
                div { class: "card-header",
                    h2 { class: "card-title", "By department" }
                }
                BreakdownList {
                    rows: analytics.by_department.iter().map(|(k, v)| (k.clone(), *v)).collect(),
                }
            }
            div { class: "card",
                div { class: "card-header",
                    h2 { class: "card-title", "By employment type" }
                }
                BreakdownList {
                    rows: analytics
                        .by_employment_type
                        .iter()
                        .map(|(k, v)| {
                            let label = EmploymentType::parse(k)
                                .map(|t| t.label().to_string())
                                .unwrap_or_else(|| k.clone());
                            (label, *v)
                        })
                        .collect(),
                }
            }
        }
    }
}

#[component]
fn BreakdownList(rows: Vec<(String, u64)>) -> Element {
    if rows.is_empty() {
        return rsx! {
            p { class: "text-muted card-body", "No data yet" }
        };
    }

    rsx! {
        ul { class: "breakdown-list",
            for (label, count) in rows {
                li { key: "{label}", class: "breakdown-item",
                    span { "{label}" }
                    span { class: "breakdown-count", "{count}" }
                }
            }
        }
    }
}
