//! One facade per backend resource family. Each method is a single request.

mod audit;
mod auth;
mod bulk_upload;
mod companies;
mod employees;
mod users;

pub use audit::{AuditLogs, SecurityEvents};
pub use auth::Auth;
pub use bulk_upload::BulkUploads;
pub use companies::Companies;
pub use employees::Employees;
pub use users::Users;

use crate::client::TalentClient;

impl TalentClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth(self)
    }

    pub fn companies(&self) -> Companies<'_> {
        Companies(self)
    }

    pub fn employees(&self) -> Employees<'_> {
        Employees(self)
    }

    pub fn bulk_uploads(&self) -> BulkUploads<'_> {
        BulkUploads(self)
    }

    pub fn audit_logs(&self) -> AuditLogs<'_> {
        AuditLogs(self)
    }

    pub fn security_events(&self) -> SecurityEvents<'_> {
        SecurityEvents(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode, header},
        response::IntoResponse,
        routing::{get, post},
    };
    use serde_json::{Value, json};
    use types::bulk::{JobStatus, NewUpload, OperationType, UploadFile};
    use uuid::Uuid;

    use super::*;

    const JOB_ID: &str = "0192f0c4-6f3e-7a7b-8c9d-112233445566";

    fn job(status: &str) -> Value {
        json!({
            "id": JOB_ID,
            "operation_type": "employee_import",
            "status": status,
            "file_name": "staff.csv",
            "total_records": 2,
            "progress_percentage": "100.00",
        })
    }

    async fn stub_backend() -> TalentClient {
        let app = Router::new()
            .route(
                "/api/bulk-upload/",
                post(|headers: HeaderMap, body: String| async move {
                    let multipart = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .is_some_and(|v| v.starts_with("multipart/form-data"));
                    if multipart
                        && body.contains("name=\"operation_type\"")
                        && body.contains("employee_import")
                        && body.contains("filename=\"staff.csv\"")
                        && body.contains("name,email")
                        && body.contains("name=\"company\"")
                    {
                        (StatusCode::CREATED, Json(job("pending"))).into_response()
                    } else {
                        (StatusCode::BAD_REQUEST, Json(json!({"error": "bad upload"}))).into_response()
                    }
                }),
            )
            .route(
                &format!("/api/bulk-upload/{JOB_ID}/"),
                get(|| async { Json(job("completed")) }),
            )
            .route(
                &format!("/api/bulk-upload/{JOB_ID}/retry/"),
                post(|| async { Json(job("processing")) }),
            )
            .route(
                "/api/bulk-upload/download_template/",
                get(|| async {
                    (
                        [(header::CONTENT_TYPE, "text/csv")],
                        "name,employee_id\r\n",
                    )
                }),
            )
            .route(
                "/api/companies/4/",
                get(|| async { Json(json!({"id": 4, "name": "Acme", "departments": [{"id": 1, "name": "HR"}]})) }),
            )
            .route(
                "/api/users/",
                get(|Query(query): Query<HashMap<String, String>>| async move {
                    let page = query.get("page").cloned().unwrap_or_default();
                    let next = (page == "1").then(|| "http://backend/api/users/?page=2");
                    Json(json!({
                        "count": 2,
                        "next": next,
                        "previous": null,
                        "results": [{"id": page.parse::<i64>().unwrap_or(0), "email": "ann@acme.test"}],
                    }))
                }),
            )
            .route(
                "/api/users/9/activate_user/",
                post(|| async { Json(json!({"message": "User activated"})) }),
            )
            .route(
                "/api/users/9/deactivate_user/",
                post(|| async {
                    (StatusCode::FORBIDDEN, Json(json!({"error": "You cannot deactivate yourself"})))
                }),
            )
            .route(
                "/api/auth/permissions/",
                get(|| async { Json(json!({"can_manage_companies": true})) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        TalentClient::new(format!("http://{addr}/api/").parse().unwrap())
            .authenticated("token".to_string().into())
    }

    #[tokio::test]
    async fn upload_is_sent_as_multipart() {
        let client = stub_backend().await;
        let upload = NewUpload {
            operation_type: OperationType::EmployeeImport,
            company: Some(3),
            file: UploadFile::new("staff.csv", b"name,email\r\nAnn,ann@acme.test\r\n"),
        };

        let job = client.bulk_uploads().create(&upload).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.file_name, "staff.csv");
    }

    #[tokio::test]
    async fn jobs_can_be_fetched_and_retried() {
        let client = stub_backend().await;
        let id: Uuid = JOB_ID.parse().unwrap();

        let job = client.bulk_uploads().get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress(), 100.0);

        let job = client.bulk_uploads().retry(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn template_falls_back_to_a_file_name() {
        let client = stub_backend().await;
        let download = client
            .bulk_uploads()
            .download_template(OperationType::CompanyImport)
            .await
            .unwrap();

        assert_eq!(download.file_name.as_deref(), Some("company_import_template.csv"));
        assert_eq!(download.bytes, b"name,employee_id\r\n");
    }

    #[tokio::test]
    async fn company_detail_includes_departments() {
        let company = stub_backend().await.companies().get(4).await.unwrap();
        assert_eq!(company.name, "Acme");
        assert_eq!(company.departments[0].name, "HR");
    }

    #[tokio::test]
    async fn activation_goes_through_user_actions() {
        let client = stub_backend().await;
        client.users().activate(9).await.unwrap();

        let error = client.users().deactivate(9).await.unwrap_err();
        assert_eq!(error.status(), 403);
        assert_eq!(error.backend_message(), Some("You cannot deactivate yourself"));
    }

    #[tokio::test]
    async fn users_are_listed_page_by_page() {
        let client = stub_backend().await;

        let first = client.users().list(1).await.unwrap();
        assert_eq!(first.results[0].id, 1);
        assert!(first.next.is_some());

        let second = client.users().list(2).await.unwrap();
        assert_eq!(second.results[0].id, 2);
        assert!(second.next.is_none());

        let clamped = client.users().list(0).await.unwrap();
        assert_eq!(clamped.results[0].id, 1);
    }

    #[tokio::test]
    async fn permissions_are_passed_through() {
        let permissions = stub_backend().await.auth().permissions().await.unwrap();
        assert_eq!(permissions["can_manage_companies"], true);
    }
}
