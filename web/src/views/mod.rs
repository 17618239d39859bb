mod components;

mod login;
pub use login::Login;

mod accept_invitation;
pub use accept_invitation::AcceptInvitation;

mod dashboard;
pub use dashboard::Dashboard;

mod companies;
pub use companies::CompaniesPage;

mod employees;
pub use employees::EmployeesPage;

mod search;
pub use search::SearchPage;

mod bulk_upload;
pub use bulk_upload::BulkUploadPage;

mod audit;
mod security;
pub use audit::AuditPage;

mod users;
pub use users::UsersPage;
