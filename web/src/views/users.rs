use crate::use_error;
use dioxus::prelude::*;
use jiff::Timestamp;
use types::user::{Invitation, NewInvitation, NewUser, User};
use types::{Action, Page, Profile, Resource};
use ui::{
    CompanySelect, EmptyRow, FlashBanner, LoadingRow, Modal, Pagination, StatusChip, format_timestamp,
    opt_display,
};

use super::companies::TextField;

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    Users,
    Invitations,
}

#[derive(Clone, Copy, PartialEq)]
enum Dialog {
    CreateUser,
    Invite,
}

#[component]
pub fn UsersPage() -> Element {
    let profile = use_context::<Profile>();
    let mut error_state = use_error();
    let mut flash = ui::use_flash();
    let mut latest = ui::use_latest_request();

    let mut page = use_signal(|| 1u32);
    let mut users = use_signal(Page::<User>::default);
    let mut invitations = use_signal(Vec::<Invitation>::new);
    let mut loading = use_signal(|| true);
    let mut reload = use_signal(|| 0u32);
    let mut tab = use_signal(|| Tab::Users);
    let mut dialog = use_signal(|| None::<Dialog>);
    let mut toggling = use_signal(|| None::<i64>);

    let can_invite = profile.can(Action::Create, Resource::Invitation);

    use_effect(move || {
        let page = page();
        reload();
        spawn(async move {
            let ticket = latest.issue();
            loading.set(true);
            let listed = api::list_users(page).await;
            let pending = if can_invite {
                Some(api::pending_invitations().await)
            } else {
                None
            };
            if !latest.is_current(ticket) {
                return;
            }
            match listed {
                Ok(listed) => users.set(listed),
                Err(e) => error_state.set_server_error(&e, "Failed to load users"),
            }
            match pending {
                Some(Ok(pending)) => invitations.set(pending.results),
                Some(Err(e)) => error_state.set_server_error(&e, "Failed to load invitations"),
                None => {}
            }
            loading.set(false);
        });
    });

    let mut set_active = move |(user, active): (User, bool)| {
        spawn(async move {
            toggling.set(Some(user.id));
            match api::set_user_active(user.id, active).await {
                Ok(()) => {
                    let verb = if active { "activated" } else { "deactivated" };
                    flash.success(format!("{} was {verb}", user.full_name()));
                    reload += 1;
                }
                Err(e) => flash.server_error(&e, "Failed to update user status"),
            }
            toggling.set(None);
        });
    };

    let can_create = profile.can(Action::Create, Resource::User);
    let can_update = profile.can(Action::Update, Resource::User);
    let choose_company = profile.can(Action::Update, Resource::CompanyAssignment);
    let grant_admin = profile.can(Action::Update, Resource::AdminFlag);
    let own_id = profile.user.id;
    let now = Timestamp::now();
    let user_count = users.read().count;
    let invitation_count = invitations.read().len();

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "User Management" }
                    p { class: "page-subtitle", "Accounts that can sign in to Talent Verify." }
                }
                div { class: "page-header-actions",
                    if can_invite {
                        button {
                            class: "btn btn-secondary",
                            onclick: move |_| dialog.set(Some(Dialog::Invite)),
                            "Invite User"
                        }
                    }
                    if can_create {
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| dialog.set(Some(Dialog::CreateUser)),
                            "Create User"
                        }
                    }
                }
            }

            FlashBanner { flash }

            div { class: "tabs",
                button {
                    class: if tab() == Tab::Users { "tab active" } else { "tab" },
                    onclick: move |_| tab.set(Tab::Users),
                    "Active Users ({user_count})"
                }
                if can_invite {
                    button {
                        class: if tab() == Tab::Invitations { "tab active" } else { "tab" },
                        onclick: move |_| tab.set(Tab::Invitations),
                        "Pending Invitations ({invitation_count})"
                    }
                }
            }

            div { class: "card",
                div { class: "table-container",
                    if tab() == Tab::Users {
                        table {
                            thead {
                                tr {
                                    th { "Name" }
                                    th { "Email" }
                                    th { "Role" }
                                    th { "Company" }
                                    th { "Status" }
                                    th { "Last Login" }
                                    th { "" }
                                }
                            }
                            tbody {
                                if loading() {
                                    LoadingRow { colspan: 7usize }
                                } else if users.read().is_empty() {
                                    EmptyRow { colspan: 7usize, noun: "users" }
                                } else {
                                    for user in users.read().results.iter().cloned() {
                                        tr { key: "{user.id}",
                                            td {
                                                "{user.full_name()}"
                                                if user.id == own_id {
                                                    span { class: "text-muted text-sm", " (you)" }
                                                }
                                            }
                                            td { "{opt_display(&user.email)}" }
                                            td { "{user.role_label()}" }
                                            td { "{opt_display(&user.company_name)}" }
                                            td {
                                                if user.is_active {
                                                    StatusChip { label: "Active", tone: "success" }
                                                } else {
                                                    StatusChip { label: "Inactive", tone: "neutral" }
                                                }
                                            }
                                            td {
                                                if user.last_login.is_some() {
                                                    "{format_timestamp(user.last_login)}"
                                                } else {
                                                    "Never"
                                                }
                                            }
                                            td { class: "row-actions",
                                                if can_update && user.id != own_id {
                                                    button {
                                                        class: if user.is_active { "btn btn-link btn-link-danger" } else { "btn btn-link" },
                                                        disabled: toggling() == Some(user.id),
                                                        onclick: {
                                                            let user = user.clone();
                                                            move |_| set_active((user.clone(), !user.is_active))
                                                        },
                                                        if user.is_active { "Deactivate" } else { "Activate" }
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    } else {
                        table {
                            thead {
                                tr {
                                    th { "Email" }
                                    th { "Company" }
                                    th { "Role" }
                                    th { "Invited By" }
                                    th { "Expires" }
                                    th { "Status" }
                                }
                            }
                            tbody {
                                if loading() {
                                    LoadingRow { colspan: 6usize }
                                } else if invitations.read().is_empty() {
                                    EmptyRow { colspan: 6usize, noun: "pending invitations" }
                                } else {
                                    for invitation in invitations.read().iter().cloned() {
                                        {
                                            let status = invitation.status(now);
                                            rsx! {
                                                tr { key: "{invitation.id}",
                                                    td { "{invitation.email}" }
                                                    td { "{opt_display(&invitation.company_name)}" }
                                                    td { "{invitation.role_label()}" }
                                                    td { "{opt_display(&invitation.invited_by_name)}" }
                                                    td { "{format_timestamp(invitation.expires_at)}" }
                                                    td { StatusChip { label: status.label(), tone: status.tone() } }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                if tab() == Tab::Users {
                    Pagination {
                        page: page(),
                        has_next: users.read().next.is_some(),
                        on_change: move |next| page.set(next),
                    }
                }
            }

            {match dialog() {
                Some(Dialog::CreateUser) => rsx! {
                    CreateUserModal {
                        choose_company,
                        grant_admin,
                        on_close: move |_| dialog.set(None),
                        on_created: move |email: String| {
                            dialog.set(None);
                            flash.success(format!("User {email} created successfully"));
                            reload += 1;
                        },
                    }
                },
                Some(Dialog::Invite) => rsx! {
                    InviteModal {
                        choose_company,
                        grant_admin,
                        on_close: move |_| dialog.set(None),
                        on_invited: move |email: String| {
                            dialog.set(None);
                            tab.set(Tab::Invitations);
                            flash.success(format!("Invitation sent to {email}"));
                            reload += 1;
                        },
                    }
                },
                None => rsx! {},
            }}
        }
    }
}

#[component]
fn CompanyAndRole(
    choose_company: bool,
    grant_admin: bool,
    company: Option<i64>,
    is_admin: bool,
    on_company: EventHandler<Option<i64>>,
    on_admin: EventHandler<bool>,
) -> Element {
    rsx! {
        if choose_company {
            div { class: "form-group",
                label { class: "form-label", r#for: "company", "Company" }
                CompanySelect {
                    id: "company",
                    value: company,
                    placeholder: "Select a company",
                    on_change: move |c| on_company.call(c),
                }
            }
        }
        if grant_admin {
            label { class: "checkbox-label",
                input {
                    r#type: "checkbox",
                    checked: is_admin,
                    onchange: move |e| on_admin.call(e.checked()),
                }
                span { "Company administrator" }
            }
        }
    }
}

#[component]
fn CreateUserModal(
    choose_company: bool,
    grant_admin: bool,
    on_close: EventHandler<()>,
    on_created: EventHandler<String>,
) -> Element {
    let mut form = use_signal(NewUser::default);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let submit = move |_: MouseEvent| {
        let user = form.read().clone();
        if let Err(message) = user.validate() {
            error.set(Some(message));
            return;
        }
        spawn(async move {
            busy.set(true);
            error.set(None);
            let email = user.email.clone();
            match api::create_user(user).await {
                Ok(()) => on_created.call(email),
                Err(e) if ui::is_unauthorized(&e) => ui::force_logout(),
                Err(e) => error.set(Some(ui::error_message(&e, "Failed to create user"))),
            }
            busy.set(false);
        });
    };

    rsx! {
        Modal {
            title: "Create User",
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
                    disabled: busy(),
                    onclick: submit,
                    if busy() { "Creating..." } else { "Create User" }
                }
            },
            if let Some(message) = error() {
                div { class: "banner banner-error", "{message}" }
            }
            TextField { id: "email", label: "Email *", input_type: "email",
                value: form.read().email.clone(),
                on_input: move |v| form.write().email = v }
            div { class: "form-row",
                TextField { id: "first_name", label: "First Name *",
                    value: form.read().first_name.clone(),
                    on_input: move |v| form.write().first_name = v }
                TextField { id: "last_name", label: "Last Name *",
                    value: form.read().last_name.clone(),
                    on_input: move |v| form.write().last_name = v }
            }
            TextField { id: "phone", label: "Phone", input_type: "tel",
                value: form.read().phone.clone(),
                on_input: move |v| form.write().phone = v }
            div { class: "form-row",
                TextField { id: "password", label: "Password *", input_type: "password",
                    value: form.read().password.clone(),
                    on_input: move |v| form.write().password = v }
                TextField { id: "password_confirm", label: "Confirm Password *", input_type: "password",
                    value: form.read().password_confirm.clone(),
                    on_input: move |v| form.write().password_confirm = v }
            }
            CompanyAndRole {
                choose_company,
                grant_admin,
                company: form.read().company_id,
                is_admin: form.read().is_company_admin,
                on_company: move |c| form.write().company_id = c,
                on_admin: move |a| form.write().is_company_admin = a,
            }
        }
    }
}

#[component]
fn InviteModal(
    choose_company: bool,
    grant_admin: bool,
    on_close: EventHandler<()>,
    on_invited: EventHandler<String>,
) -> Element {
    let mut form = use_signal(NewInvitation::default);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let submit = move |_: MouseEvent| {
        let invitation = form.read().clone();
        if let Err(message) = invitation.validate() {
            error.set(Some(message));
            return;
        }
        spawn(async move {
            busy.set(true);
            error.set(None);
            let email = invitation.email.clone();
            match api::invite_user(invitation).await {
                Ok(()) => on_invited.call(email),
                Err(e) if ui::is_unauthorized(&e) => ui::force_logout(),
                Err(e) => error.set(Some(ui::error_message(&e, "Failed to send invitation"))),
            }
            busy.set(false);
        });
    };

    rsx! {
        Modal {
            title: "Invite User",
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
                    disabled: busy(),
                    onclick: submit,
                    if busy() { "Sending..." } else { "Send Invitation" }
                }
            },
            if let Some(message) = error() {
                div { class: "banner banner-error", "{message}" }
            }
            p { class: "text-muted",
                "The invitee receives an email with a link to set up their account."
            }
            TextField { id: "invite_email", label: "Email *", input_type: "email",
                value: form.read().email.clone(),
                on_input: move |v| form.write().email = v }
            CompanyAndRole {
                choose_company,
                grant_admin,
                company: form.read().company,
                is_admin: form.read().is_company_admin,
                on_company: move |c| form.write().company = c,
                on_admin: move |a| form.write().is_company_admin = a,
            }
        }
    }
}
