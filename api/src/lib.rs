use dioxus::prelude::*;
use types::{
    Page, Profile,
    audit::{
        AuditAnalytics, AuditFilters, AuditLog, SecurityDashboard, SecurityEvent, SecurityFilters,
    },
    bulk::{BulkJob, NewUpload},
    company::{Company, CompanyQuery, NewCompany},
    employee::{
        Employee, EmployeeAnalytics, EmployeeFilters, EmployeeHistory, NewEmployee, NewPosition,
        Position,
    },
    user::{AcceptInvitation, Invitation, NewInvitation, NewUser, User},
};
use uuid::Uuid;

#[post("/api/current-user")]
pub async fn get_current_user() -> ServerFnResult<Option<Profile>> {
    Ok(server::current_profile().await?)
}

// Companies

#[post("/api/companies")]
pub async fn list_companies(query: CompanyQuery) -> ServerFnResult<Page<Company>> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::Company)?;
    Ok(backend.call(backend.companies().list(&query)).await?)
}

#[post("/api/companies/create")]
pub async fn create_company(company: NewCompany) -> ServerFnResult<Company> {
    use types::{Action, Error, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Create, Resource::Company)?;

    let missing = company.missing_fields();
    if !missing.is_empty() {
        return Err(Error::bad_request(format!("Please fill in: {}", missing.join(", "))).into());
    }

    let created = backend.call(backend.companies().create(&company)).await?;
    tracing::info!(company = created.id, "created company");
    Ok(created)
}

#[post("/api/companies/update")]
pub async fn update_company(id: i64, company: NewCompany) -> ServerFnResult<Company> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Update, Resource::Company)?;
    Ok(backend.call(backend.companies().update(id, &company)).await?)
}

#[post("/api/companies/delete")]
pub async fn delete_company(id: i64) -> ServerFnResult<()> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Delete, Resource::Company)?;
    backend.call(backend.companies().delete(id)).await?;
    tracing::info!(company = id, "deleted company");
    Ok(())
}

// Employees

#[post("/api/employees")]
pub async fn list_employees(filters: EmployeeFilters) -> ServerFnResult<Page<Employee>> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::Employee)?;
    Ok(backend.call(backend.employees().list(&filters)).await?)
}

#[post("/api/employees/create")]
pub async fn create_employee(employee: NewEmployee) -> ServerFnResult<Employee> {
    use types::{Action, Error, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Create, Resource::Employee)?;

    let missing = employee.missing_fields();
    if !missing.is_empty() {
        return Err(Error::bad_request(format!("Please fill in: {}", missing.join(", "))).into());
    }

    Ok(backend.call(backend.employees().create(&employee)).await?)
}

#[post("/api/employees/update")]
pub async fn update_employee(id: i64, employee: NewEmployee) -> ServerFnResult<Employee> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Update, Resource::Employee)?;
    Ok(backend.call(backend.employees().update(id, &employee)).await?)
}

#[post("/api/employees/delete")]
pub async fn delete_employee(id: i64) -> ServerFnResult<()> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Delete, Resource::Employee)?;
    Ok(backend.call(backend.employees().delete(id)).await?)
}

#[post("/api/employees/history")]
pub async fn employee_history(id: i64) -> ServerFnResult<EmployeeHistory> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::Employee)?;
    Ok(backend.call(backend.employees().history(id)).await?)
}

/// The backend closes the employee's current position when this one starts.
#[post("/api/employees/add-position")]
pub async fn add_position(id: i64, position: NewPosition) -> ServerFnResult<Position> {
    use types::{Action, Error, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Update, Resource::Employee)?;

    let missing = position.missing_fields();
    if !missing.is_empty() {
        return Err(Error::bad_request(format!("Please fill in: {}", missing.join(", "))).into());
    }
    if !position.salary_is_valid() {
        return Err(Error::bad_request("Salary must be a number").into());
    }

    Ok(backend
        .call(backend.employees().add_position(id, &position))
        .await?)
}

#[post("/api/employees/analytics")]
pub async fn employee_analytics() -> ServerFnResult<EmployeeAnalytics> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::Employee)?;
    Ok(backend.call(backend.employees().analytics()).await?)
}

// Bulk uploads

#[post("/api/bulk-jobs")]
pub async fn list_bulk_jobs() -> ServerFnResult<Page<BulkJob>> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::BulkJob)?;
    Ok(backend.call(backend.bulk_uploads().list()).await?)
}

#[post("/api/bulk-jobs/upload")]
pub async fn upload_file(upload: NewUpload) -> ServerFnResult<BulkJob> {
    use types::{Error, bulk::check_file_name};

    let backend = server::Backend::current().await?;
    if !backend.profile().can_import(upload.operation_type) {
        return Err(Error::Api {
            status: 403,
            message: Some(format!(
                "You cannot run {} uploads.",
                upload.operation_type.label()
            )),
        }
        .into());
    }
    check_file_name(&upload.file.name).map_err(Error::bad_request)?;

    let job = backend.call(backend.bulk_uploads().create(&upload)).await?;
    tracing::info!(
        job = %job.id,
        operation = upload.operation_type.as_str(),
        file = %upload.file.name,
        "started bulk upload"
    );
    Ok(job)
}

#[post("/api/bulk-jobs/retry")]
pub async fn retry_bulk_job(id: Uuid) -> ServerFnResult<BulkJob> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Import, Resource::BulkJob)?;
    Ok(backend.call(backend.bulk_uploads().retry(id)).await?)
}

// Audit

#[post("/api/audit-logs")]
pub async fn list_audit_logs(filters: AuditFilters) -> ServerFnResult<Page<AuditLog>> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::AuditLog)?;
    Ok(backend.call(backend.audit_logs().list(&filters)).await?)
}

#[post("/api/audit-logs/analytics")]
pub async fn audit_analytics(days: u32) -> ServerFnResult<AuditAnalytics> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::AuditLog)?;
    Ok(backend.call(backend.audit_logs().analytics(days)).await?)
}

#[post("/api/audit-logs/recent")]
pub async fn recent_activity() -> ServerFnResult<Vec<AuditLog>> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::AuditLog)?;
    Ok(backend.call(backend.audit_logs().recent_activity()).await?)
}

#[post("/api/security-events")]
pub async fn list_security_events(filters: SecurityFilters) -> ServerFnResult<Page<SecurityEvent>> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::SecurityEvent)?;
    Ok(backend.call(backend.security_events().list(&filters)).await?)
}

#[post("/api/security-events/resolve")]
pub async fn resolve_security_event(id: i64, notes: String) -> ServerFnResult<()> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Resolve, Resource::SecurityEvent)?;
    backend
        .call(backend.security_events().resolve(id, &notes))
        .await?;
    tracing::info!(event = id, "resolved security event");
    Ok(())
}

#[post("/api/security-events/dashboard")]
pub async fn security_dashboard() -> ServerFnResult<SecurityDashboard> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::SecurityEvent)?;
    Ok(backend.call(backend.security_events().dashboard()).await?)
}

// Users

#[post("/api/users")]
pub async fn list_users(page: u32) -> ServerFnResult<Page<User>> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::User)?;
    Ok(backend.call(backend.users().list(page)).await?)
}

/// Users created by a company admin always join that admin's company as
/// plain users.
#[post("/api/users/create")]
pub async fn create_user(mut user: NewUser) -> ServerFnResult<()> {
    use types::{Action, Error, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Create, Resource::User)?;
    user.validate().map_err(Error::bad_request)?;

    let profile = backend.profile();
    if !profile.can(Action::Update, Resource::CompanyAssignment) {
        user.company_id = profile.company;
    }
    if !profile.can(Action::Update, Resource::AdminFlag) {
        user.is_company_admin = false;
    }

    backend.call(backend.users().create(&user)).await?;
    tracing::info!(email = %user.email, "created user");
    Ok(())
}

#[post("/api/users/invite")]
pub async fn invite_user(mut invitation: NewInvitation) -> ServerFnResult<()> {
    use types::{Action, Error, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Create, Resource::Invitation)?;
    invitation.validate().map_err(Error::bad_request)?;

    let profile = backend.profile();
    if !profile.can(Action::Update, Resource::CompanyAssignment) {
        invitation.company = profile.company;
    }
    if !profile.can(Action::Update, Resource::AdminFlag) {
        invitation.is_company_admin = false;
    }

    backend.call(backend.users().invite_user(&invitation)).await?;
    tracing::info!(email = %invitation.email, "sent invitation");
    Ok(())
}

#[post("/api/users/invitations")]
pub async fn pending_invitations() -> ServerFnResult<Page<Invitation>> {
    use types::{Action, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::View, Resource::Invitation)?;
    Ok(backend.call(backend.users().pending_invitations()).await?)
}

#[post("/api/users/activate")]
pub async fn set_user_active(id: i64, active: bool) -> ServerFnResult<()> {
    use types::{Action, Error, Resource};

    let backend = server::Backend::current().await?;
    backend.require(Action::Update, Resource::User)?;
    if backend.profile().user.id == id {
        return Err(Error::bad_request("You cannot change your own account status.").into());
    }

    let users = backend.users();
    if active {
        backend.call(users.activate(id)).await?;
    } else {
        backend.call(users.deactivate(id)).await?;
    }
    tracing::info!(user = id, active, "changed account status");
    Ok(())
}

/// Public: the invitation token is the credential.
#[post("/api/accept-invitation")]
pub async fn accept_invitation(form: AcceptInvitation) -> ServerFnResult<()> {
    use types::Error;

    form.validate().map_err(Error::bad_request)?;
    server::public_client()
        .users()
        .accept_invitation(&form)
        .await?;
    Ok(())
}
